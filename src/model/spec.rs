//! Component specifications
//!
//! Immutable blueprints built once from a specification file. Specs are
//! shared behind `Arc`; component instances built from them never share
//! attribute state.

use super::attribute::ComponentAttribute;
use super::error::{ModelError, Result};
use super::form::{FormSpec, SimpleFormSpec};
use super::terminal::Terminal;
use crate::grammar::Grammar;
use std::collections::HashMap;
use std::sync::Arc;

/// Collection location marking specs that only appear inside other components
pub const NO_COLLECTION: &str = "none";

pub const FORM_IF: &str = "if";
pub const FORM_IF_THEN: &str = "if then";

#[derive(Debug)]
pub struct SimpleComponentSpec {
    name: String,
    collection: String,
    attributes: Vec<ComponentAttribute>,
    forms: Vec<SimpleFormSpec>,
}

impl SimpleComponentSpec {
    pub fn new(
        name: impl Into<String>,
        collection: impl Into<String>,
        attributes: Vec<ComponentAttribute>,
        forms: Vec<SimpleFormSpec>,
    ) -> Result<Self> {
        let spec = Self {
            name: name.into(),
            collection: collection.into(),
            attributes,
            forms,
        };
        if spec.forms.is_empty() {
            return Err(ModelError::config(format!(
                "component '{}' defines no forms",
                spec.name
            )));
        }
        for (i, attribute) in spec.attributes.iter().enumerate() {
            if spec.attributes[..i].iter().any(|a| a.name() == attribute.name()) {
                return Err(ModelError::config(format!(
                    "component '{}' defines attribute '{}' twice",
                    spec.name,
                    attribute.name()
                )));
            }
        }
        for form in &spec.forms {
            if let Some(missing) = form
                .expected_attributes()
                .iter()
                .find(|name| spec.attribute(name).is_none())
            {
                return Err(ModelError::config(format!(
                    "form '{}' of component '{}' uses unknown attribute '{}'",
                    form.name(),
                    spec.name,
                    missing
                )));
            }
        }
        Ok(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Template attributes, holding terminal defaults
    pub fn attributes(&self) -> &[ComponentAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&ComponentAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Independent copies of every template attribute
    pub fn create_attributes(&self) -> Vec<ComponentAttribute> {
        self.attributes.iter().map(ComponentAttribute::create_blank).collect()
    }

    pub fn forms(&self) -> &[SimpleFormSpec] {
        &self.forms
    }

    pub fn form_index(&self, name: &str) -> Option<usize> {
        self.forms.iter().position(|f| f.name() == name)
    }
}

#[derive(Debug)]
pub struct ChainComponentSpec {
    component: Arc<SimpleComponentSpec>,
    linking_attribute: String,
}

impl ChainComponentSpec {
    pub fn new(component: SimpleComponentSpec, linking_attribute: impl Into<String>) -> Result<Self> {
        let linking_attribute = linking_attribute.into();
        if component.attribute(&linking_attribute).is_none() {
            return Err(ModelError::config(format!(
                "linking attribute '{}' is not an attribute of component '{}'",
                linking_attribute,
                component.name()
            )));
        }
        Ok(Self {
            component: Arc::new(component),
            linking_attribute,
        })
    }

    pub fn name(&self) -> &str {
        self.component.name()
    }

    /// Spec of a single node in the chain
    pub fn node_spec(&self) -> &Arc<SimpleComponentSpec> {
        &self.component
    }

    pub fn linking_attribute(&self) -> &str {
        &self.linking_attribute
    }
}

/// Order in which a conditional lays out its chains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalLayout {
    /// Result first, then `IF` and the condition
    If,
    /// `IF` condition `THEN` result
    IfThen,
}

impl ConditionalLayout {
    pub fn from_form_name(name: &str) -> Option<Self> {
        match name {
            FORM_IF => Some(Self::If),
            FORM_IF_THEN => Some(Self::IfThen),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ConditionalComponentSpec {
    name: String,
    collection: String,
    forms: Vec<FormSpec>,
    condition: Arc<ChainComponentSpec>,
    result: Arc<ChainComponentSpec>,
}

impl ConditionalComponentSpec {
    pub fn new(
        name: impl Into<String>,
        collection: impl Into<String>,
        forms: Vec<FormSpec>,
        condition: Arc<ChainComponentSpec>,
        result: Arc<ChainComponentSpec>,
    ) -> Result<Self> {
        let name = name.into();
        if forms.is_empty() {
            return Err(ModelError::config(format!(
                "component '{}' defines no forms",
                name
            )));
        }
        if let Some(form) = forms
            .iter()
            .find(|f| ConditionalLayout::from_form_name(f.name()).is_none())
        {
            return Err(ModelError::config(format!(
                "conditional component '{}' has form '{}'; expected '{}' or '{}'",
                name,
                form.name(),
                FORM_IF,
                FORM_IF_THEN
            )));
        }
        Ok(Self {
            name,
            collection: collection.into(),
            forms,
            condition,
            result,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn forms(&self) -> &[FormSpec] {
        &self.forms
    }

    pub fn form_index(&self, name: &str) -> Option<usize> {
        self.forms.iter().position(|f| f.name() == name)
    }

    pub fn condition(&self) -> &Arc<ChainComponentSpec> {
        &self.condition
    }

    pub fn result(&self) -> &Arc<ChainComponentSpec> {
        &self.result
    }
}

#[derive(Debug)]
pub struct ElseConditionalComponentSpec {
    conditional: Arc<ConditionalComponentSpec>,
    else_spec: Arc<ChainComponentSpec>,
}

impl ElseConditionalComponentSpec {
    pub fn new(conditional: ConditionalComponentSpec, else_spec: Arc<ChainComponentSpec>) -> Self {
        Self {
            conditional: Arc::new(conditional),
            else_spec,
        }
    }

    pub fn name(&self) -> &str {
        self.conditional.name()
    }

    pub fn conditional(&self) -> &Arc<ConditionalComponentSpec> {
        &self.conditional
    }

    pub fn else_spec(&self) -> &Arc<ChainComponentSpec> {
        &self.else_spec
    }
}

/// Any component spec, as stored in the registry
#[derive(Debug, Clone)]
pub enum ComponentSpec {
    Simple(Arc<SimpleComponentSpec>),
    Chain(Arc<ChainComponentSpec>),
    Conditional(Arc<ConditionalComponentSpec>),
    ElseConditional(Arc<ElseConditionalComponentSpec>),
}

impl ComponentSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Simple(spec) => spec.name(),
            Self::Chain(spec) => spec.name(),
            Self::Conditional(spec) => spec.name(),
            Self::ElseConditional(spec) => spec.name(),
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            Self::Simple(spec) => spec.collection(),
            Self::Chain(spec) => spec.node_spec().collection(),
            Self::Conditional(spec) => spec.collection(),
            Self::ElseConditional(spec) => spec.conditional().collection(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Chain(_) => "chain",
            Self::Conditional(_) => "conditional",
            Self::ElseConditional(_) => "else-conditional",
        }
    }

    pub fn form_names(&self) -> Vec<&str> {
        match self {
            Self::Simple(spec) => spec.forms().iter().map(|f| f.name()).collect(),
            Self::Chain(spec) => spec.node_spec().forms().iter().map(|f| f.name()).collect(),
            Self::Conditional(spec) => spec.forms().iter().map(|f| f.name()).collect(),
            Self::ElseConditional(spec) => {
                spec.conditional().forms().iter().map(|f| f.name()).collect()
            }
        }
    }

    /// Whether the spec can be added to a contract directly
    pub fn is_addable(&self) -> bool {
        self.collection() != NO_COLLECTION
    }
}

/// Everything loaded from one specification file
#[derive(Debug)]
pub struct SpecRegistry {
    grammar: Arc<Grammar>,
    collections: Vec<String>,
    terminals: Vec<Arc<Terminal>>,
    components: Vec<ComponentSpec>,
    index: HashMap<String, usize>,
}

impl SpecRegistry {
    pub fn new(grammar: Arc<Grammar>, collections: Vec<String>) -> Result<Self> {
        for (i, name) in collections.iter().enumerate() {
            if collections[..i].contains(name) {
                return Err(ModelError::config(format!("collection '{}' declared twice", name)));
            }
        }
        Ok(Self {
            grammar,
            collections,
            terminals: Vec::new(),
            components: Vec::new(),
            index: HashMap::new(),
        })
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    pub fn add_terminal(&mut self, terminal: Terminal) -> Result<Arc<Terminal>> {
        if self.terminal(terminal.name()).is_some() {
            return Err(ModelError::config(format!(
                "terminal '{}' declared twice",
                terminal.name()
            )));
        }
        let terminal = Arc::new(terminal);
        self.terminals.push(Arc::clone(&terminal));
        Ok(terminal)
    }

    pub fn terminal(&self, name: &str) -> Option<&Arc<Terminal>> {
        self.terminals.iter().find(|t| t.name() == name)
    }

    pub fn terminals(&self) -> &[Arc<Terminal>] {
        &self.terminals
    }

    /// Register a component spec. Its collection must exist unless it is
    /// marked as not addable.
    pub fn add_component(&mut self, spec: ComponentSpec) -> Result<()> {
        if self.index.contains_key(spec.name()) {
            return Err(ModelError::config(format!(
                "component '{}' declared twice",
                spec.name()
            )));
        }
        if spec.is_addable() && !self.collections.iter().any(|c| c == spec.collection()) {
            return Err(ModelError::UnknownCollection(spec.collection().to_string()));
        }
        self.index.insert(spec.name().to_string(), self.components.len());
        self.components.push(spec);
        Ok(())
    }

    pub fn component_spec(&self, name: &str) -> Option<&ComponentSpec> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    /// Chain spec by name, for use as a conditional sub-spec
    pub fn chain_spec(&self, name: &str) -> Result<Arc<ChainComponentSpec>> {
        match self.component_spec(name) {
            Some(ComponentSpec::Chain(spec)) => Ok(Arc::clone(spec)),
            Some(other) => Err(ModelError::config(format!(
                "'{}' is a {} component; conditionals need chain components",
                name,
                other.kind_name()
            ))),
            None => Err(ModelError::config(format!("unknown component '{}'", name))),
        }
    }

    pub fn component_specs(&self) -> &[ComponentSpec] {
        &self.components
    }

    /// Specs a user can add to a contract, in declaration order
    pub fn addable_component_names(&self) -> Vec<&str> {
        self.components
            .iter()
            .filter(|spec| spec.is_addable())
            .map(ComponentSpec::name)
            .collect()
    }
}
