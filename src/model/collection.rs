use super::components::Component;

/// A named, ordered group of top-level components
#[derive(Debug, Clone)]
pub struct ComponentCollection {
    name: String,
    components: Vec<Component>,
}

impl ComponentCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub(crate) fn components_mut(&mut self) -> &mut Vec<Component> {
        &mut self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub(crate) fn push(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Remove the entry whose own internal id is `id`
    pub(crate) fn remove(&mut self, id: u32) -> Option<Component> {
        let index = self
            .components
            .iter()
            .position(|c| c.internal_id() == Some(id))?;
        Some(self.components.remove(index))
    }

    /// Drop top-level chains whose last node was deleted
    pub(crate) fn remove_empty_chains(&mut self) -> usize {
        let before = self.components.len();
        self.components
            .retain(|c| !matches!(c, Component::Chain(chain) if chain.is_empty()));
        before - self.components.len()
    }

    pub(crate) fn clear(&mut self) {
        self.components.clear();
    }
}
