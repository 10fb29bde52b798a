use super::IdCounter;
use crate::model::attribute::{AttributeValue, ComponentAttribute};
use crate::model::error::{ModelError, Result};
use crate::model::form::SimpleFormSpec;
use crate::model::spec::SimpleComponentSpec;
use std::sync::Arc;

/// A component that renders one line from its attributes.
///
/// Chain nodes are simple components too; the chain adds the link.
#[derive(Debug, Clone)]
pub struct SimpleComponent {
    spec: Arc<SimpleComponentSpec>,
    internal_id: u32,
    display_id: u32,
    form: usize,
    attributes: Vec<ComponentAttribute>,
}

impl SimpleComponent {
    /// Blank instance in the spec's first form
    pub fn new(spec: Arc<SimpleComponentSpec>) -> Self {
        let attributes = spec.create_attributes();
        Self {
            spec,
            internal_id: 0,
            display_id: 0,
            form: 0,
            attributes,
        }
    }

    pub fn spec(&self) -> &Arc<SimpleComponentSpec> {
        &self.spec
    }

    pub fn internal_id(&self) -> u32 {
        self.internal_id
    }

    pub fn display_id(&self) -> u32 {
        self.display_id
    }

    pub fn form(&self) -> &SimpleFormSpec {
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

    pub fn attributes(&self) -> &[ComponentAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&ComponentAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Attributes shown by the current form, in form order
    pub fn visible_attributes(&self) -> Vec<&ComponentAttribute> {
        self.form()
            .expected_attributes()
            .iter()
            .filter_map(|name| self.attribute(name))
            .collect()
    }

    /// Set several attributes at once.
    ///
    /// Every name is checked before anything is written, so an unknown name
    /// leaves the component untouched.
    pub fn update<I, K>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, AttributeValue)>,
        K: Into<String>,
    {
        let mut resolved = Vec::new();
        for (name, value) in values {
            let name = name.into();
            let index = self
                .attributes
                .iter()
                .position(|a| a.name() == name)
                .ok_or_else(|| ModelError::UnknownAttribute {
                    component: self.internal_id,
                    attribute: name.clone(),
                })?;
            resolved.push((index, value));
        }
        for (index, value) in resolved {
            self.attributes[index].set_value(value);
        }
        Ok(())
    }

    /// Rendered text without the display id
    pub fn formatted_text(&self) -> String {
        let form = self.form();
        let values: Vec<String> = form
            .expected_attributes()
            .iter()
            .map(|name| {
                self.attribute(name)
                    .map(ComponentAttribute::effective_value)
                    .unwrap_or_default()
            })
            .collect();
        form.format().render(&values)
    }

    pub fn display_text(&self) -> String {
        format!("[{}] {}", self.display_id, self.formatted_text())
    }

    pub(crate) fn reset_id(&mut self, ids: &mut IdCounter) {
        let (display_id, internal_id) = ids.next_node();
        self.display_id = display_id;
        self.internal_id = internal_id;
    }
}
