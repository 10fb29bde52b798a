//! Specification loading
//!
//! A specification file (JSON) declares the grammar, the contract's
//! collections, the terminal types and every component spec. Loading is
//! all-or-nothing: any inconsistency is an `InvalidConfiguration` error and
//! nothing is registered.
//!
//! Load order is fixed because later sections refer to earlier ones:
//! terminals, then chain, simple, conditional and else-conditional
//! components.

mod file;

use crate::grammar::Grammar;
use crate::model::attribute::ComponentAttribute;
use crate::model::error::{ModelError, Result};
use crate::model::form::{FormSpec, SimpleFormSpec};
use crate::model::spec::{
    ChainComponentSpec, ComponentSpec, ConditionalComponentSpec, ElseConditionalComponentSpec,
    SimpleComponentSpec, SpecRegistry,
};
use crate::model::terminal::Terminal;
use file::{AlocFile, FileConditionalComponent, FileSimpleComponent};
use std::path::Path;
use std::sync::Arc;

/// Load a specification file and the grammar it points at
pub fn load(path: &Path) -> Result<SpecRegistry> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ModelError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let file: AlocFile = serde_json::from_str(&contents)
        .map_err(|e| ModelError::config(format!("{}: {}", path.display(), e)))?;

    let grammar_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&file.contract.grammar_path);
    let grammar_source = std::fs::read_to_string(&grammar_path).map_err(|e| {
        ModelError::config(format!(
            "cannot read grammar {}: {}",
            grammar_path.display(),
            e
        ))
    })?;
    let grammar = Grammar::new(&grammar_source)
        .map_err(|e| ModelError::config(format!("{}: {}", grammar_path.display(), e)))?;

    let registry = build(file, Arc::new(grammar)).inspect_err(|e| {
        tracing::warn!("Rejected specification {}: {}", path.display(), e);
    })?;
    tracing::info!(
        "Loaded specification {}: {} terminals, {} components",
        path.display(),
        registry.terminals().len(),
        registry.component_specs().len()
    );
    Ok(registry)
}

/// Build a registry from specification JSON and an already loaded grammar.
///
/// The file's `grammar_path` is ignored.
pub fn from_json(json: &str, grammar: Arc<Grammar>) -> Result<SpecRegistry> {
    let file: AlocFile = serde_json::from_str(json).map_err(|e| ModelError::config(e.to_string()))?;
    build(file, grammar)
}

fn build(file: AlocFile, grammar: Arc<Grammar>) -> Result<SpecRegistry> {
    let mut registry = SpecRegistry::new(Arc::clone(&grammar), file.contract.collections)?;

    // Terminals first: component attributes refer to them by name
    let terminals = file.terminal_types;
    for t in terminals.text {
        let terminal = Terminal::text(t.name, t.default, t.parse_root, t.explanation, Arc::clone(&grammar))?;
        registry.add_terminal(terminal)?;
    }
    for t in terminals.multi_choice {
        let terminal = Terminal::multi_choice(t.name, t.default, t.choices, t.allow_empty)?;
        registry.add_terminal(terminal)?;
    }
    for t in terminals.hybrid {
        let terminal = Terminal::hybrid(
            t.name,
            t.default_option,
            t.default_text,
            t.parse_root,
            t.explanation,
            t.choices,
            Arc::clone(&grammar),
        )?;
        registry.add_terminal(terminal)?;
    }

    // Chains before conditionals, which use them as sub-specs
    for component in file.chain_components {
        let linking = component.linking_attribute.clone().ok_or_else(|| {
            ModelError::config(format!(
                "chain component '{}' has no linking_attribute",
                component.component_name
            ))
        })?;
        let spec = simple_spec(&registry, component)?;
        let chain = ChainComponentSpec::new(spec, linking)?;
        registry.add_component(ComponentSpec::Chain(Arc::new(chain)))?;
    }

    for component in file.simple_components {
        let spec = simple_spec(&registry, component)?;
        registry.add_component(ComponentSpec::Simple(Arc::new(spec)))?;
    }

    for component in file.conditional_components {
        let spec = conditional_spec(&registry, component)?;
        registry.add_component(ComponentSpec::Conditional(Arc::new(spec)))?;
    }

    for component in file.else_conditional_components {
        let else_spec = registry.chain_spec(&component.else_spec)?;
        let conditional = conditional_spec(&registry, component.conditional)?;
        let spec = ElseConditionalComponentSpec::new(conditional, else_spec);
        registry.add_component(ComponentSpec::ElseConditional(Arc::new(spec)))?;
    }

    Ok(registry)
}

fn simple_spec(registry: &SpecRegistry, component: FileSimpleComponent) -> Result<SimpleComponentSpec> {
    let attributes = component
        .attributes
        .into_iter()
        .map(|a| {
            let terminal = registry.terminal(&a.terminal).ok_or_else(|| {
                ModelError::config(format!(
                    "attribute '{}' of component '{}' has unknown type '{}'",
                    a.name, component.component_name, a.terminal
                ))
            })?;
            let attribute = ComponentAttribute::new(a.name, Arc::clone(terminal), a.prefix);
            attribute.check_default()?;
            Ok(attribute)
        })
        .collect::<Result<Vec<_>>>()?;

    let forms = component
        .form_specs
        .into_iter()
        .map(|f| {
            let form = FormSpec::new(f.form.form_name, f.form.display_name, f.form.colour);
            SimpleFormSpec::new(form, &f.format_string, f.attributes)
        })
        .collect::<Result<Vec<_>>>()?;

    SimpleComponentSpec::new(
        component.component_name,
        component.collection_location,
        attributes,
        forms,
    )
}

fn conditional_spec(
    registry: &SpecRegistry,
    component: FileConditionalComponent,
) -> Result<ConditionalComponentSpec> {
    let condition = registry.chain_spec(&component.condition)?;
    let result = registry.chain_spec(&component.result)?;
    let forms = component
        .form_specs
        .into_iter()
        .map(|f| FormSpec::new(f.form_name, f.display_name, f.colour))
        .collect();
    ConditionalComponentSpec::new(
        component.component_name,
        component.collection_location,
        forms,
        condition,
        result,
    )
}
