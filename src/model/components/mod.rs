//! Runtime component instances
//!
//! A contract entry is one of four kinds. Simple components and chain nodes
//! carry attributes and render a line each; conditionals only arrange the
//! chains they own.

mod chain;
mod conditional;
mod simple;

pub use chain::{Chain, ChainDeletion};
pub use conditional::{ConditionalComponent, ElseConditionalComponent};
pub use simple::SimpleComponent;

use super::spec::ComponentSpec;
use std::sync::Arc;

/// Running counters for a renumbering pass
#[derive(Debug, Default)]
pub struct IdCounter {
    display: u32,
    internal: u32,
}

impl IdCounter {
    /// Ids for a component that renders a line
    pub fn next_node(&mut self) -> (u32, u32) {
        let ids = (self.display, self.internal);
        self.display += 1;
        self.internal += 1;
        ids
    }

    /// Internal id for a component without its own line
    pub fn next_internal(&mut self) -> u32 {
        let id = self.internal;
        self.internal += 1;
        id
    }

    /// Number of display ids handed out so far
    pub fn displayed(&self) -> u32 {
        self.display
    }
}

/// A top-level contract entry
#[derive(Debug, Clone)]
pub enum Component {
    Simple(SimpleComponent),
    Chain(Chain),
    Conditional(ConditionalComponent),
    ElseConditional(ElseConditionalComponent),
}

/// Borrowed view of any component found by internal id
#[derive(Debug, Clone, Copy)]
pub enum ComponentRef<'a> {
    Simple(&'a SimpleComponent),
    ChainNode {
        node: &'a SimpleComponent,
        chain: &'a Chain,
    },
    Conditional(&'a ConditionalComponent),
    ElseConditional(&'a ElseConditionalComponent),
}

impl<'a> ComponentRef<'a> {
    pub fn internal_id(&self) -> u32 {
        match self {
            Self::Simple(node) | Self::ChainNode { node, .. } => node.internal_id(),
            Self::Conditional(c) => c.internal_id(),
            Self::ElseConditional(c) => c.internal_id(),
        }
    }

    /// The attribute-carrying component, if this is one
    pub fn as_leaf(&self) -> Option<&'a SimpleComponent> {
        match self {
            Self::Simple(node) | Self::ChainNode { node, .. } => Some(*node),
            Self::Conditional(_) | Self::ElseConditional(_) => None,
        }
    }
}

/// Mutable handle on a component found by internal id
pub(crate) enum ComponentMut<'a> {
    Leaf(&'a mut SimpleComponent),
    Conditional(&'a mut ConditionalComponent),
}

impl Component {
    /// Blank instance of `spec`
    pub fn new(spec: &ComponentSpec) -> Self {
        match spec {
            ComponentSpec::Simple(spec) => Self::Simple(SimpleComponent::new(Arc::clone(spec))),
            ComponentSpec::Chain(spec) => Self::Chain(Chain::new(Arc::clone(spec))),
            ComponentSpec::Conditional(spec) => {
                Self::Conditional(ConditionalComponent::new(Arc::clone(spec)))
            }
            ComponentSpec::ElseConditional(spec) => {
                Self::ElseConditional(ElseConditionalComponent::new(Arc::clone(spec)))
            }
        }
    }

    pub fn spec_name(&self) -> &str {
        match self {
            Self::Simple(c) => c.spec().name(),
            Self::Chain(c) => c.spec().name(),
            Self::Conditional(c) => c.spec().name(),
            Self::ElseConditional(c) => c.spec().name(),
        }
    }

    /// Internal id of the entry itself: the component, the chain head, or
    /// the conditional container
    pub fn internal_id(&self) -> Option<u32> {
        match self {
            Self::Simple(c) => Some(c.internal_id()),
            Self::Chain(c) => c.head().map(SimpleComponent::internal_id),
            Self::Conditional(c) => Some(c.internal_id()),
            Self::ElseConditional(c) => Some(c.internal_id()),
        }
    }

    /// Chains owned directly by this entry, in render order
    pub fn chains(&self) -> Vec<&Chain> {
        match self {
            Self::Simple(_) => Vec::new(),
            Self::Chain(chain) => vec![chain],
            Self::Conditional(c) => c.chains().to_vec(),
            Self::ElseConditional(c) => {
                let mut chains = c.conditional().chains().to_vec();
                chains.push(c.else_chain());
                chains
            }
        }
    }

    /// Every line-rendering component, in document order
    pub fn leaves(&self) -> Vec<&SimpleComponent> {
        match self {
            Self::Simple(c) => vec![c],
            _ => self.chains().into_iter().flat_map(Chain::iter).collect(),
        }
    }

    pub fn find(&self, id: u32) -> Option<ComponentRef<'_>> {
        match self {
            Self::Simple(c) if c.internal_id() == id => Some(ComponentRef::Simple(c)),
            Self::Conditional(c) if c.internal_id() == id => Some(ComponentRef::Conditional(c)),
            Self::ElseConditional(c) if c.internal_id() == id => {
                Some(ComponentRef::ElseConditional(c))
            }
            _ => self.chains().into_iter().find_map(|chain| {
                chain
                    .get(id)
                    .map(|node| ComponentRef::ChainNode { node, chain })
            }),
        }
    }

    pub(crate) fn find_mut(&mut self, id: u32) -> Option<ComponentMut<'_>> {
        match self {
            Self::Simple(c) => (c.internal_id() == id).then_some(ComponentMut::Leaf(c)),
            Self::Chain(chain) => chain.get_mut(id).map(ComponentMut::Leaf),
            Self::Conditional(c) => find_in_conditional(c, id),
            Self::ElseConditional(c) => {
                if c.internal_id() == id {
                    return Some(ComponentMut::Conditional(c.conditional_mut()));
                }
                if c.else_chain().contains(id) {
                    return c.else_chain_mut().get_mut(id).map(ComponentMut::Leaf);
                }
                find_in_conditional(c.conditional_mut(), id)
            }
        }
    }

    /// The chain holding node `id`, wherever it is nested
    pub(crate) fn chain_containing_mut(&mut self, id: u32) -> Option<&mut Chain> {
        match self {
            Self::Simple(_) => None,
            Self::Chain(chain) => chain.contains(id).then_some(chain),
            Self::Conditional(c) => c
                .chains_in_order_mut()
                .into_iter()
                .find(|chain| chain.contains(id)),
            Self::ElseConditional(c) => {
                if c.else_chain().contains(id) {
                    return Some(c.else_chain_mut());
                }
                c.conditional_mut()
                    .chains_in_order_mut()
                    .into_iter()
                    .find(|chain| chain.contains(id))
            }
        }
    }

    pub fn to_cola(&self) -> String {
        match self {
            Self::Simple(c) => c.display_text(),
            Self::Chain(c) => c.to_cola(),
            Self::Conditional(c) => c.to_cola(),
            Self::ElseConditional(c) => c.to_cola(),
        }
    }

    pub(crate) fn reset_ids(&mut self, ids: &mut IdCounter) {
        match self {
            Self::Simple(c) => c.reset_id(ids),
            Self::Chain(c) => c.reset_ids(ids),
            Self::Conditional(c) => c.reset_ids(ids),
            Self::ElseConditional(c) => c.reset_ids(ids),
        }
    }
}

fn find_in_conditional(c: &mut ConditionalComponent, id: u32) -> Option<ComponentMut<'_>> {
    if c.internal_id() == id {
        return Some(ComponentMut::Conditional(c));
    }
    c.chains_in_order_mut()
        .into_iter()
        .find_map(|chain| chain.get_mut(id))
        .map(ComponentMut::Leaf)
}
