use super::chain::Chain;
use super::IdCounter;
use crate::model::chain_parent::ChainParent;
use crate::model::error::{ModelError, Result};
use crate::model::form::FormSpec;
use crate::model::spec::{ConditionalComponentSpec, ConditionalLayout, ElseConditionalComponentSpec};
use std::sync::Arc;

/// A condition chain and a result chain, rendered as an IF block.
///
/// The component has no text of its own, so it takes an internal id but
/// never a display id.
#[derive(Debug, Clone)]
pub struct ConditionalComponent {
    spec: Arc<ConditionalComponentSpec>,
    internal_id: u32,
    form: usize,
    condition: Chain,
    result: Chain,
}

impl ConditionalComponent {
    pub fn new(spec: Arc<ConditionalComponentSpec>) -> Self {
        let condition = Chain::new(Arc::clone(spec.condition()));
        let result = Chain::new(Arc::clone(spec.result()));
        Self::from_chains(spec, condition, result)
    }

    pub(crate) fn from_chains(
        spec: Arc<ConditionalComponentSpec>,
        condition: Chain,
        result: Chain,
    ) -> Self {
        Self {
            spec,
            internal_id: 0,
            form: 0,
            condition,
            result,
        }
    }

    pub fn spec(&self) -> &Arc<ConditionalComponentSpec> {
        &self.spec
    }

    pub fn internal_id(&self) -> u32 {
        self.internal_id
    }

    pub fn form(&self) -> &FormSpec {
        &self.spec.forms()[self.form]
    }

    pub fn set_form(&mut self, name: &str) -> Result<()> {
        self.form = self
            .spec
            .form_index(name)
            .ok_or_else(|| ModelError::UnknownForm {
                component: self.internal_id,
                form: name.to_string(),
            })?;
        Ok(())
    }

    pub fn layout(&self) -> ConditionalLayout {
        // Form names are checked when the spec loads.
        ConditionalLayout::from_form_name(self.form().name()).unwrap_or(ConditionalLayout::If)
    }

    pub fn condition(&self) -> &Chain {
        &self.condition
    }

    pub fn result(&self) -> &Chain {
        &self.result
    }

    /// Chains in the order they are rendered and numbered
    pub fn chains(&self) -> [&Chain; 2] {
        match self.layout() {
            ConditionalLayout::If => [&self.result, &self.condition],
            ConditionalLayout::IfThen => [&self.condition, &self.result],
        }
    }

    pub(crate) fn chains_in_order_mut(&mut self) -> [&mut Chain; 2] {
        match self.layout() {
            ConditionalLayout::If => [&mut self.result, &mut self.condition],
            ConditionalLayout::IfThen => [&mut self.condition, &mut self.result],
        }
    }

    pub fn to_cola(&self) -> String {
        match self.layout() {
            ConditionalLayout::If => format!(
                "{}\nIF\n{}",
                self.result.to_cola(),
                self.condition.to_cola()
            ),
            ConditionalLayout::IfThen => format!(
                "IF\n{}\nTHEN\n{}",
                self.condition.to_cola(),
                self.result.to_cola()
            ),
        }
    }

    pub(crate) fn reset_ids(&mut self, ids: &mut IdCounter) {
        self.internal_id = ids.next_internal();
        for chain in self.chains_in_order_mut() {
            chain.reset_ids(ids);
        }
    }
}

impl ChainParent for ConditionalComponent {
    fn allows_chain_deletion(&self) -> bool {
        false
    }

    fn chains_mut(&mut self) -> Vec<&mut Chain> {
        vec![&mut self.condition, &mut self.result]
    }
}

/// A conditional with an ELSE chain rendered after it
#[derive(Debug, Clone)]
pub struct ElseConditionalComponent {
    spec: Arc<ElseConditionalComponentSpec>,
    conditional: ConditionalComponent,
    else_chain: Chain,
}

impl ElseConditionalComponent {
    pub fn new(spec: Arc<ElseConditionalComponentSpec>) -> Self {
        let conditional = ConditionalComponent::new(Arc::clone(spec.conditional()));
        let else_chain = Chain::new(Arc::clone(spec.else_spec()));
        Self {
            spec,
            conditional,
            else_chain,
        }
    }

    pub(crate) fn from_parts(
        spec: Arc<ElseConditionalComponentSpec>,
        conditional: ConditionalComponent,
        else_chain: Chain,
    ) -> Self {
        Self {
            spec,
            conditional,
            else_chain,
        }
    }

    pub fn spec(&self) -> &Arc<ElseConditionalComponentSpec> {
        &self.spec
    }

    pub fn conditional(&self) -> &ConditionalComponent {
        &self.conditional
    }

    pub(crate) fn conditional_mut(&mut self) -> &mut ConditionalComponent {
        &mut self.conditional
    }

    pub fn internal_id(&self) -> u32 {
        self.conditional.internal_id()
    }

    pub fn else_chain(&self) -> &Chain {
        &self.else_chain
    }

    pub(crate) fn else_chain_mut(&mut self) -> &mut Chain {
        &mut self.else_chain
    }

    pub fn to_cola(&self) -> String {
        format!(
            "{}\nELSE\n{}",
            self.conditional.to_cola(),
            self.else_chain.to_cola()
        )
    }

    pub(crate) fn reset_ids(&mut self, ids: &mut IdCounter) {
        self.conditional.reset_ids(ids);
        self.else_chain.reset_ids(ids);
    }
}

impl ChainParent for ElseConditionalComponent {
    fn allows_chain_deletion(&self) -> bool {
        false
    }

    fn chains_mut(&mut self) -> Vec<&mut Chain> {
        let mut chains = self.conditional.chains_mut();
        chains.push(&mut self.else_chain);
        chains
    }
}
