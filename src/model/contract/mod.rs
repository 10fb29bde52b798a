//! The contract: aggregate root of the document model
//!
//! Owns the collections, routes every edit to the right component and
//! renumbers the whole tree after each structural change, so callers never
//! observe stale display ids.

use super::attribute::{AttributeValue, ComponentAttribute};
use super::chain_parent::{ChainDeletion, ChainParent};
use super::collection::ComponentCollection;
use super::components::{Chain, Component, ComponentMut, ComponentRef, IdCounter, SimpleComponent};
use super::error::{ModelError, Result};
use super::spec::{ComponentSpec, SpecRegistry};

#[cfg(test)]
mod tests;

/// Separator between top-level entries in CoLa text
pub const ENTRY_SEPARATOR: &str = "\nC-AND\n";

/// An attribute whose current value its terminal rejects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAttribute {
    pub component: u32,
    pub display_id: u32,
    pub attribute: String,
    pub value: String,
    pub explanation: String,
}

#[derive(Debug, Clone)]
pub struct Contract {
    collections: Vec<ComponentCollection>,
}

impl Contract {
    /// Empty contract with the given collections, in render order
    pub fn new<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collections: collections
                .into_iter()
                .map(ComponentCollection::new)
                .collect(),
        }
    }

    /// Empty contract with the collections a registry declares
    pub fn from_registry(registry: &SpecRegistry) -> Self {
        Self::new(registry.collections().iter().cloned())
    }

    pub fn collections(&self) -> &[ComponentCollection] {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&ComponentCollection> {
        self.collections.iter().find(|c| c.name() == name)
    }

    pub(crate) fn collection_mut(&mut self, name: &str) -> Result<&mut ComponentCollection> {
        self.collections
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| ModelError::UnknownCollection(name.to_string()))
    }

    /// Every top-level entry, collection by collection
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.collections.iter().flat_map(|c| c.components())
    }

    /// Every line-rendering component in document order
    pub fn leaves(&self) -> Vec<&SimpleComponent> {
        self.components().flat_map(Component::leaves).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.iter().all(ComponentCollection::is_empty)
    }

    /// Append a blank instance of `spec` to its collection.
    ///
    /// Returns the internal id of the new entry.
    pub fn add_component(&mut self, spec: &ComponentSpec) -> Result<u32> {
        let collection = self.collection_mut(spec.collection())?;
        collection.push(Component::new(spec));
        let index = collection.len() - 1;
        let collection_name = collection.name().to_string();
        self.reset_ids();

        let id = self
            .collection(&collection_name)
            .and_then(|c| c.components().get(index))
            .and_then(Component::internal_id)
            .ok_or(ModelError::UnknownCollection(collection_name))?;
        tracing::debug!("Added {} component {}", spec.name(), id);
        Ok(id)
    }

    /// Remove the top-level entry whose own id is `id`: a simple component,
    /// the head of a top-level chain, or a conditional.
    pub fn delete_component(&mut self, id: u32) -> Result<()> {
        let removed = self
            .collections
            .iter_mut()
            .find_map(|collection| collection.remove(id))
            .ok_or(ModelError::UnknownComponentId(id))?;
        tracing::debug!("Deleted {} component {}", removed.spec_name(), id);
        self.reset_ids();
        Ok(())
    }

    /// Set attributes on a simple component or chain node.
    ///
    /// Conditionals carry no attributes, so any key is unknown for them.
    pub fn update_component<I, K>(&mut self, id: u32, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, AttributeValue)>,
        K: Into<String>,
    {
        match self.find_mut(id)? {
            ComponentMut::Leaf(component) => component.update(values),
            ComponentMut::Conditional(_) => match values.into_iter().next() {
                Some((name, _)) => Err(ModelError::UnknownAttribute {
                    component: id,
                    attribute: name.into(),
                }),
                None => Ok(()),
            },
        }
    }

    /// Switch any component to another of its forms.
    ///
    /// A conditional's form decides the order of its chains, so this
    /// renumbers.
    pub fn set_component_form(&mut self, id: u32, form: &str) -> Result<()> {
        match self.find_mut(id)? {
            ComponentMut::Leaf(component) => component.set_form(form)?,
            ComponentMut::Conditional(component) => component.set_form(form)?,
        }
        self.reset_ids();
        Ok(())
    }

    /// Attributes shown by the component's current form, in form order
    pub fn visible_attributes(&self, id: u32) -> Result<Vec<&ComponentAttribute>> {
        let component = self
            .component(id)
            .ok_or(ModelError::UnknownComponentId(id))?;
        Ok(component
            .as_leaf()
            .map(SimpleComponent::visible_attributes)
            .unwrap_or_default())
    }

    /// Insert a blank node after chain node `id`, at any nesting depth
    pub fn extend_chain_component(&mut self, id: u32) -> Result<()> {
        let chain = self
            .chain_containing_mut(id)
            .ok_or(ModelError::UnknownComponentId(id))?;
        chain.add_next(id);
        tracing::debug!("Extended {} chain after node {}", chain.spec().name(), id);
        self.reset_ids();
        Ok(())
    }

    /// Delete chain node `id`, at any nesting depth.
    ///
    /// Top-level chains disappear with their last node; chains inside
    /// conditionals keep it.
    pub fn delete_chain_component(&mut self, id: u32) -> Result<ChainDeletion> {
        let outcome = match ChainParent::delete_chain_component(self, id) {
            Err(ModelError::UnknownComponentId(_)) => self.delete_nested_chain_component(id)?,
            other => other?,
        };
        if outcome == ChainDeletion::Emptied {
            for collection in &mut self.collections {
                collection.remove_empty_chains();
            }
        }
        tracing::debug!("Deleted chain node {}: {:?}", id, outcome);
        self.reset_ids();
        Ok(outcome)
    }

    fn delete_nested_chain_component(&mut self, id: u32) -> Result<ChainDeletion> {
        for collection in &mut self.collections {
            for component in collection.components_mut() {
                let outcome = match component {
                    Component::Conditional(c) => c.delete_chain_component(id),
                    Component::ElseConditional(c) => c.delete_chain_component(id),
                    Component::Simple(_) | Component::Chain(_) => continue,
                };
                match outcome {
                    Err(ModelError::UnknownComponentId(_)) => continue,
                    other => return other,
                }
            }
        }
        Err(ModelError::UnknownComponentId(id))
    }

    /// Look up any component by internal id
    pub fn component(&self, id: u32) -> Option<ComponentRef<'_>> {
        self.components().find_map(|c| c.find(id))
    }

    /// Every attribute whose current value fails validation
    pub fn validate(&self) -> Vec<InvalidAttribute> {
        self.leaves()
            .into_iter()
            .flat_map(|component| {
                component
                    .visible_attributes()
                    .into_iter()
                    .filter(|attribute| !attribute.validate())
                    .map(move |attribute| InvalidAttribute {
                        component: component.internal_id(),
                        display_id: component.display_id(),
                        attribute: attribute.name().to_string(),
                        value: attribute.effective_value(),
                        explanation: attribute.terminal().explanation(),
                    })
            })
            .collect()
    }

    /// Remove every component, keeping the collections
    pub fn clear(&mut self) {
        for collection in &mut self.collections {
            collection.clear();
        }
        tracing::debug!("Cleared contract");
    }

    /// Renumber the whole tree in document order.
    ///
    /// Display ids go to line-rendering components only; internal ids go to
    /// every component, conditionals included.
    pub fn reset_ids(&mut self) {
        let mut ids = IdCounter::default();
        for collection in &mut self.collections {
            for component in collection.components_mut() {
                component.reset_ids(&mut ids);
            }
        }
    }

    /// Canonical text of the whole contract
    pub fn to_cola(&self) -> String {
        self.components()
            .map(Component::to_cola)
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }

    fn find_mut(&mut self, id: u32) -> Result<ComponentMut<'_>> {
        self.collections
            .iter_mut()
            .flat_map(|c| c.components_mut().iter_mut())
            .find_map(|c| c.find_mut(id))
            .ok_or(ModelError::UnknownComponentId(id))
    }

    fn chain_containing_mut(&mut self, id: u32) -> Option<&mut Chain> {
        self.collections
            .iter_mut()
            .flat_map(|c| c.components_mut().iter_mut())
            .find_map(|c| c.chain_containing_mut(id))
    }
}

impl ChainParent for Contract {
    fn allows_chain_deletion(&self) -> bool {
        true
    }

    fn chains_mut(&mut self) -> Vec<&mut Chain> {
        self.collections
            .iter_mut()
            .flat_map(|c| c.components_mut().iter_mut())
            .filter_map(|c| match c {
                Component::Chain(chain) => Some(chain),
                _ => None,
            })
            .collect()
    }
}
