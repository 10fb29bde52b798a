//! Contract snapshots
//!
//! A snapshot records what a contract is made of by name: spec, form and
//! attribute values for every node, with chain order preserved. Ids are not
//! stored; restoring renumbers. Snapshots are restored against a loaded
//! [`SpecRegistry`] and fail if they name anything it lacks.

use super::attribute::AttributeValue;
use super::components::{
    Chain, Component, ConditionalComponent, ElseConditionalComponent, SimpleComponent,
};
use super::contract::Contract;
use super::error::{ModelError, Result};
use super::spec::{ChainComponentSpec, ComponentSpec, SimpleComponentSpec, SpecRegistry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub collections: Vec<CollectionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub name: String,
    pub components: Vec<ComponentSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentSnapshot {
    Simple {
        spec: String,
        node: NodeSnapshot,
    },
    Chain {
        spec: String,
        nodes: Vec<NodeSnapshot>,
    },
    Conditional {
        spec: String,
        form: String,
        condition: Vec<NodeSnapshot>,
        result: Vec<NodeSnapshot>,
    },
    ElseConditional {
        spec: String,
        form: String,
        condition: Vec<NodeSnapshot>,
        result: Vec<NodeSnapshot>,
        #[serde(rename = "else")]
        else_chain: Vec<NodeSnapshot>,
    },
}

/// One attribute-carrying component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub form: String,
    pub values: BTreeMap<String, AttributeValue>,
}

impl NodeSnapshot {
    fn capture(component: &SimpleComponent) -> Self {
        Self {
            form: component.form().name().to_string(),
            values: component
                .attributes()
                .iter()
                .map(|a| (a.name().to_string(), a.value().clone()))
                .collect(),
        }
    }

    fn restore(&self, spec: &Arc<SimpleComponentSpec>) -> Result<SimpleComponent> {
        let mut component = SimpleComponent::new(Arc::clone(spec));
        component.set_form(&self.form).map_err(|_| {
            ModelError::snapshot(format!(
                "component '{}' has no form '{}'",
                spec.name(),
                self.form
            ))
        })?;
        component
            .update(self.values.iter().map(|(k, v)| (k.clone(), v.clone())))
            .map_err(|e| ModelError::snapshot(format!("component '{}': {}", spec.name(), e)))?;
        Ok(component)
    }
}

fn capture_chain(chain: &Chain) -> Vec<NodeSnapshot> {
    chain.iter().map(NodeSnapshot::capture).collect()
}

fn restore_chain(spec: &Arc<ChainComponentSpec>, nodes: &[NodeSnapshot]) -> Result<Chain> {
    if nodes.is_empty() {
        return Err(ModelError::snapshot(format!(
            "chain '{}' has no nodes",
            spec.name()
        )));
    }
    let components = nodes
        .iter()
        .map(|node| node.restore(spec.node_spec()))
        .collect::<Result<Vec<_>>>()?;
    Ok(Chain::from_components(Arc::clone(spec), components))
}

impl ComponentSnapshot {
    fn capture(component: &Component) -> Self {
        match component {
            Component::Simple(c) => Self::Simple {
                spec: c.spec().name().to_string(),
                node: NodeSnapshot::capture(c),
            },
            Component::Chain(c) => Self::Chain {
                spec: c.spec().name().to_string(),
                nodes: capture_chain(c),
            },
            Component::Conditional(c) => Self::Conditional {
                spec: c.spec().name().to_string(),
                form: c.form().name().to_string(),
                condition: capture_chain(c.condition()),
                result: capture_chain(c.result()),
            },
            Component::ElseConditional(c) => Self::ElseConditional {
                spec: c.spec().name().to_string(),
                form: c.conditional().form().name().to_string(),
                condition: capture_chain(c.conditional().condition()),
                result: capture_chain(c.conditional().result()),
                else_chain: capture_chain(c.else_chain()),
            },
        }
    }

    fn spec_name(&self) -> &str {
        match self {
            Self::Simple { spec, .. }
            | Self::Chain { spec, .. }
            | Self::Conditional { spec, .. }
            | Self::ElseConditional { spec, .. } => spec,
        }
    }

    fn restore(&self, registry: &SpecRegistry) -> Result<Component> {
        let name = self.spec_name();
        let spec = registry
            .component_spec(name)
            .ok_or_else(|| ModelError::snapshot(format!("unknown component '{}'", name)))?;

        match (self, spec) {
            (Self::Simple { node, .. }, ComponentSpec::Simple(spec)) => {
                Ok(Component::Simple(node.restore(spec)?))
            }
            (Self::Chain { nodes, .. }, ComponentSpec::Chain(spec)) => {
                Ok(Component::Chain(restore_chain(spec, nodes)?))
            }
            (
                Self::Conditional {
                    form,
                    condition,
                    result,
                    ..
                },
                ComponentSpec::Conditional(spec),
            ) => {
                let mut component = ConditionalComponent::from_chains(
                    Arc::clone(spec),
                    restore_chain(spec.condition(), condition)?,
                    restore_chain(spec.result(), result)?,
                );
                set_conditional_form(&mut component, form)?;
                Ok(Component::Conditional(component))
            }
            (
                Self::ElseConditional {
                    form,
                    condition,
                    result,
                    else_chain,
                    ..
                },
                ComponentSpec::ElseConditional(spec),
            ) => {
                let conditional_spec = spec.conditional();
                let mut conditional = ConditionalComponent::from_chains(
                    Arc::clone(conditional_spec),
                    restore_chain(conditional_spec.condition(), condition)?,
                    restore_chain(conditional_spec.result(), result)?,
                );
                set_conditional_form(&mut conditional, form)?;
                let else_chain = restore_chain(spec.else_spec(), else_chain)?;
                Ok(Component::ElseConditional(ElseConditionalComponent::from_parts(
                    Arc::clone(spec),
                    conditional,
                    else_chain,
                )))
            }
            (_, spec) => Err(ModelError::snapshot(format!(
                "'{}' is a {} component in the loaded specification",
                name,
                spec.kind_name()
            ))),
        }
    }
}

fn set_conditional_form(component: &mut ConditionalComponent, form: &str) -> Result<()> {
    component.set_form(form).map_err(|_| {
        ModelError::snapshot(format!(
            "component '{}' has no form '{}'",
            component.spec().name(),
            form
        ))
    })
}

impl Contract {
    pub fn snapshot(&self) -> ContractSnapshot {
        ContractSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            collections: self
                .collections()
                .iter()
                .map(|collection| CollectionSnapshot {
                    name: collection.name().to_string(),
                    components: collection
                        .components()
                        .iter()
                        .map(ComponentSnapshot::capture)
                        .collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a contract from a snapshot.
    ///
    /// The contract gets the registry's collections; every snapshot
    /// collection must be one of them.
    pub fn restore(snapshot: &ContractSnapshot, registry: &SpecRegistry) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ModelError::snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut contract = Contract::from_registry(registry);
        for saved in &snapshot.collections {
            let collection = contract
                .collection_mut(&saved.name)
                .map_err(|_| ModelError::snapshot(format!("unknown collection '{}'", saved.name)))?;
            for component in &saved.components {
                let restored = component.restore(registry)?;
                let expected = registry
                    .component_spec(restored.spec_name())
                    .map(ComponentSpec::collection);
                if expected != Some(saved.name.as_str()) {
                    return Err(ModelError::snapshot(format!(
                        "component '{}' does not belong in collection '{}'",
                        restored.spec_name(),
                        saved.name
                    )));
                }
                collection.push(restored);
            }
        }
        contract.reset_ids();
        tracing::debug!(
            "Restored contract snapshot from {} ({} lines)",
            snapshot.saved_at,
            contract.leaves().len()
        );
        Ok(contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{cola_registry, definition_registry, spec};

    fn sample(registry: &SpecRegistry) -> Contract {
        let mut contract = Contract::from_registry(registry);
        contract.add_component(&spec(registry, "definition")).unwrap();
        contract.extend_chain_component(0).unwrap();
        contract
            .update_component(1, [("Name", AttributeValue::text("BABA"))])
            .unwrap();
        contract
            .add_component(&spec(registry, "else_conditional_statement"))
            .unwrap();
        contract.set_component_form(2, "if then").unwrap();
        contract
            .update_component(3, [("Date", AttributeValue::custom("1 March 2024"))])
            .unwrap();
        contract.add_component(&spec(registry, "note")).unwrap();
        contract
    }

    #[test]
    fn test_restore_reproduces_contract() {
        let registry = cola_registry();
        let contract = sample(&registry);
        let restored = Contract::restore(&contract.snapshot(), &registry).unwrap();
        assert_eq!(restored.to_cola(), contract.to_cola());
        assert!(restored.to_cola().contains("on the 1 March 2024"));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let registry = cola_registry();
        let contract = sample(&registry);
        let json = serde_json::to_value(contract.snapshot()).unwrap();

        assert_eq!(json["version"], 1);
        let definitions = &json["collections"][0];
        assert_eq!(definitions["name"], "definitions");
        assert_eq!(definitions["components"][0]["kind"], "chain");
        assert_eq!(definitions["components"][0]["nodes"][1]["values"]["Name"], "BABA");

        let statements = &json["collections"][1]["components"];
        assert_eq!(statements[0]["kind"], "else_conditional");
        assert_eq!(statements[0]["form"], "if then");
        assert_eq!(statements[0]["else"].as_array().unwrap().len(), 1);
        assert_eq!(statements[1]["kind"], "simple");
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let registry = cola_registry();
        let snapshot = sample(&registry).snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: ContractSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_unknown_spec_is_rejected() {
        let cola = cola_registry();
        let snapshot = sample(&cola).snapshot();
        let err = Contract::restore(&snapshot, &definition_registry()).unwrap_err();
        assert_eq!(
            err,
            ModelError::Snapshot("unknown component 'else_conditional_statement'".to_string())
        );
    }

    #[test]
    fn test_bad_form_and_attribute_are_rejected() {
        let registry = cola_registry();
        let mut snapshot = sample(&registry).snapshot();
        if let ComponentSnapshot::Chain { nodes, .. } = &mut snapshot.collections[0].components[0] {
            nodes[0].form = "riddle".to_string();
        }
        let err = Contract::restore(&snapshot, &registry).unwrap_err();
        assert!(err.to_string().contains("no form 'riddle'"));

        let mut snapshot = sample(&registry).snapshot();
        if let ComponentSnapshot::Chain { nodes, .. } = &mut snapshot.collections[0].components[0] {
            nodes[0].values.insert("Colour".to_string(), AttributeValue::text("RED"));
        }
        let err = Contract::restore(&snapshot, &registry).unwrap_err();
        assert!(matches!(err, ModelError::Snapshot(ref msg) if msg.contains("'Colour'")));
    }

    #[test]
    fn test_kind_mismatch_and_empty_chain() {
        let registry = cola_registry();
        let mut snapshot = sample(&registry).snapshot();
        snapshot.collections[1].components[1] = ComponentSnapshot::Chain {
            spec: "note".to_string(),
            nodes: Vec::new(),
        };
        let err = Contract::restore(&snapshot, &registry).unwrap_err();
        assert!(err.to_string().contains("'note' is a simple component"));

        let mut snapshot = sample(&registry).snapshot();
        if let ComponentSnapshot::Chain { nodes, .. } = &mut snapshot.collections[0].components[0] {
            nodes.clear();
        }
        let err = Contract::restore(&snapshot, &registry).unwrap_err();
        assert!(err.to_string().contains("has no nodes"));
    }

    #[test]
    fn test_component_in_wrong_collection() {
        let registry = cola_registry();
        let mut snapshot = sample(&registry).snapshot();
        let definition = snapshot.collections[0].components.remove(0);
        snapshot.collections[1].components.push(definition);

        let err = Contract::restore(&snapshot, &registry).unwrap_err();
        assert_eq!(
            err,
            ModelError::Snapshot(
                "component 'definition' does not belong in collection 'statements'".to_string()
            )
        );
    }

    #[test]
    fn test_unsupported_version() {
        let registry = cola_registry();
        let mut snapshot = sample(&registry).snapshot();
        snapshot.version = 99;
        assert!(Contract::restore(&snapshot, &registry).is_err());
    }
}
