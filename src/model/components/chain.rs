//! Chains of same-spec components joined by a linking word
//!
//! Nodes live in a per-chain arena and link to each other by slot index.
//! The chain itself owns the head index, so replacing the head after a
//! deletion never needs a callback into whoever holds the chain.

use super::{IdCounter, SimpleComponent};
use crate::model::spec::ChainComponentSpec;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct ChainNode {
    component: SimpleComponent,
    next: Option<usize>,
}

/// What deleting one node did to its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainDeletion {
    /// An interior or tail node was unlinked
    Spliced,
    /// The head was removed and its successor is the new head
    NewHead,
    /// The node is the only one left and the chain may not be emptied
    Refused,
    /// The only node was removed; the owner must drop the chain
    Emptied,
}

#[derive(Debug, Clone)]
pub struct Chain {
    spec: Arc<ChainComponentSpec>,
    nodes: Vec<Option<ChainNode>>,
    head: Option<usize>,
}

impl Chain {
    /// A chain holding one blank node
    pub fn new(spec: Arc<ChainComponentSpec>) -> Self {
        let node = SimpleComponent::new(Arc::clone(spec.node_spec()));
        Self::from_components(spec, vec![node])
    }

    /// A chain of the given nodes, in order
    pub(crate) fn from_components(
        spec: Arc<ChainComponentSpec>,
        components: Vec<SimpleComponent>,
    ) -> Self {
        let count = components.len();
        let nodes = components
            .into_iter()
            .enumerate()
            .map(|(i, component)| {
                Some(ChainNode {
                    component,
                    next: (i + 1 < count).then_some(i + 1),
                })
            })
            .collect();
        Self {
            spec,
            nodes,
            head: (count > 0).then_some(0),
        }
    }

    pub fn spec(&self) -> &Arc<ChainComponentSpec> {
        &self.spec
    }

    pub fn head(&self) -> Option<&SimpleComponent> {
        self.head.map(|slot| &self.node(slot).component)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.slots().count()
    }

    /// Nodes in link order
    pub fn iter(&self) -> impl Iterator<Item = &SimpleComponent> + '_ {
        self.slots().map(move |slot| &self.node(slot).component)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.find_slot(id).is_some()
    }

    pub fn get(&self, id: u32) -> Option<&SimpleComponent> {
        self.find_slot(id).map(|slot| &self.node(slot).component)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut SimpleComponent> {
        let slot = self.find_slot(id)?;
        self.nodes[slot].as_mut().map(|node| &mut node.component)
    }

    /// Insert a blank node directly after the node with internal id `id`.
    ///
    /// Returns false when no node has that id.
    pub fn add_next(&mut self, id: u32) -> bool {
        let Some(slot) = self.find_slot(id) else {
            return false;
        };
        let old_next = self.node(slot).next;
        let component = SimpleComponent::new(Arc::clone(self.spec.node_spec()));
        let new_slot = self.allocate(ChainNode {
            component,
            next: old_next,
        });
        if let Some(node) = self.nodes[slot].as_mut() {
            node.next = Some(new_slot);
        }
        true
    }

    /// Unlink the node with internal id `id`, if this chain holds it.
    ///
    /// A lone node is only removed when `allow_empty` is set.
    pub fn remove(&mut self, id: u32, allow_empty: bool) -> Option<ChainDeletion> {
        let mut prev: Option<usize> = None;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let next = self.node(slot).next;
            if self.node(slot).component.internal_id() != id {
                prev = Some(slot);
                cursor = next;
                continue;
            }

            let outcome = match (prev, next) {
                (Some(prev), _) => {
                    if let Some(node) = self.nodes[prev].as_mut() {
                        node.next = next;
                    }
                    ChainDeletion::Spliced
                }
                (None, Some(_)) => {
                    self.head = next;
                    ChainDeletion::NewHead
                }
                (None, None) if !allow_empty => return Some(ChainDeletion::Refused),
                (None, None) => {
                    self.head = None;
                    ChainDeletion::Emptied
                }
            };
            self.nodes[slot] = None;
            return Some(outcome);
        }
        None
    }

    /// One line per node; every node but the last ends with its linking word
    pub fn to_cola(&self) -> String {
        let linking = self.spec.linking_attribute();
        self.slots()
            .map(|slot| {
                let node = self.node(slot);
                let text = node.component.display_text();
                match (node.next, node.component.attribute(linking)) {
                    (Some(_), Some(attribute)) => {
                        format!("{} {}", text, attribute.effective_value())
                    }
                    _ => text,
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn reset_ids(&mut self, ids: &mut IdCounter) {
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let Some(node) = self.nodes[slot].as_mut() else {
                break;
            };
            node.component.reset_id(ids);
            cursor = node.next;
        }
    }

    fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&slot| self.node(slot).next)
    }

    fn find_slot(&self, id: u32) -> Option<usize> {
        self.slots()
            .find(|&slot| self.node(slot).component.internal_id() == id)
    }

    // Linked slots are always occupied; a vacant slot here is a broken link.
    fn node(&self, slot: usize) -> &ChainNode {
        match &self.nodes[slot] {
            Some(node) => node,
            None => unreachable!("chain link points at vacant slot {}", slot),
        }
    }

    fn allocate(&mut self, node: ChainNode) -> usize {
        match self.nodes.iter().position(Option::is_none) {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }
}
