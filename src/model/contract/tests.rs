//! Contract editing and rendering tests

use super::*;
use crate::model::test_support::{cola_registry, definition_registry, spec};

fn text(value: &str) -> AttributeValue {
    AttributeValue::text(value)
}

fn display_ids(contract: &Contract) -> Vec<u32> {
    contract.leaves().iter().map(|c| c.display_id()).collect()
}

fn assert_renumbered(contract: &Contract) {
    let ids = display_ids(contract);
    let expected: Vec<u32> = (0..ids.len() as u32).collect();
    assert_eq!(ids, expected);
}

/// Contract over the definition-only fixture with `count` blank definitions
fn definitions(count: usize) -> Contract {
    let registry = definition_registry();
    let definition = spec(&registry, "definition");
    let mut contract = Contract::from_registry(&registry);
    for _ in 0..count {
        contract.add_component(&definition).unwrap();
    }
    contract
}

const CONDITION: &str = "it is the case that SUBJECT paid GBP 0 on ADATE";
const STATEMENT: &str = "it is the case that SUBJECT shall pay GBP 0 on ADATE";

// ─────────────────────────────────────────────────────────────────────────────
// Worked scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_blank_definition() {
    let contract = definitions(1);
    assert_eq!(contract.to_cola(), "[0] SUBJECT IS SUBJECT");
}

#[test]
fn test_add_then_delete() {
    let mut contract = definitions(1);
    contract.delete_component(0).unwrap();
    assert_eq!(contract.to_cola(), "");
    assert!(contract.is_empty());
}

#[test]
fn test_update_definition() {
    let mut contract = definitions(1);
    contract
        .update_component(0, [("Name", text("BABA")), ("Definition", text("YOU"))])
        .unwrap();
    assert_eq!(contract.to_cola(), "[0] BABA IS YOU");
}

#[test]
fn test_delete_four_definitions_from_the_front() {
    let mut contract = definitions(4);
    for (id, name) in ["ALPHA", "BETA", "GAMMA", "DELTA"].iter().enumerate() {
        contract
            .update_component(id as u32, [("Name", text(name))])
            .unwrap();
    }
    assert_eq!(
        contract.to_cola(),
        "[0] ALPHA IS SUBJECT\nC-AND\n[1] BETA IS SUBJECT\nC-AND\n[2] GAMMA IS SUBJECT\nC-AND\n[3] DELTA IS SUBJECT"
    );

    contract.delete_component(0).unwrap();
    assert_eq!(
        contract.to_cola(),
        "[0] BETA IS SUBJECT\nC-AND\n[1] GAMMA IS SUBJECT\nC-AND\n[2] DELTA IS SUBJECT"
    );
    for _ in 0..3 {
        contract.delete_component(0).unwrap();
        assert_renumbered(&contract);
    }
    assert_eq!(contract.to_cola(), "");
}

#[test]
fn test_extend_then_delete_chain_nodes() {
    let mut contract = definitions(1);
    contract.extend_chain_component(0).unwrap();
    contract
        .update_component(1, [("Definition", text("ALSO SUBJECT"))])
        .unwrap();
    assert_eq!(
        contract.to_cola(),
        "[0] SUBJECT IS SUBJECT AND\n[1] SUBJECT IS ALSO SUBJECT"
    );

    assert_eq!(
        contract.delete_chain_component(0).unwrap(),
        ChainDeletion::NewHead
    );
    assert_eq!(contract.to_cola(), "[0] SUBJECT IS ALSO SUBJECT");

    assert_eq!(
        contract.delete_chain_component(0).unwrap(),
        ChainDeletion::Emptied
    );
    assert_eq!(contract.to_cola(), "");
    assert!(contract.collection("definitions").unwrap().is_empty());
}

#[test]
fn test_blank_conditional_definition() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract
        .add_component(&spec(&registry, "conditional_definition"))
        .unwrap();
    assert_eq!(
        contract.to_cola(),
        format!("[0] SUBJECT IS SUBJECT\nIF\n[1] {}", CONDITION)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Structural properties
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_renumbering_after_mixed_edits() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract.add_component(&spec(&registry, "statement")).unwrap();
    contract
        .add_component(&spec(&registry, "conditional_definition"))
        .unwrap();
    contract.add_component(&spec(&registry, "definition")).unwrap();
    contract
        .add_component(&spec(&registry, "else_conditional_statement"))
        .unwrap();
    assert_renumbered(&contract);

    // Extend every chain node once, front to back
    let ids: Vec<u32> = contract.leaves().iter().map(|c| c.internal_id()).collect();
    for id in ids.into_iter().rev() {
        contract.extend_chain_component(id).unwrap();
        assert_renumbered(&contract);
    }

    loop {
        let Some(id) = contract.leaves().get(1).map(|c| c.internal_id()) else {
            break;
        };
        let before = contract.leaves().len();
        let outcome = contract.delete_chain_component(id).unwrap();
        assert_renumbered(&contract);
        if outcome == ChainDeletion::Refused {
            break;
        }
        assert!(contract.leaves().len() < before);
    }
}

#[test]
fn test_internal_ids_unique_and_cover_conditionals() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract
        .add_component(&spec(&registry, "conditional_definition"))
        .unwrap();
    contract.add_component(&spec(&registry, "definition")).unwrap();

    // conditional 0, result node 1, condition node 2, definition 3
    assert!(matches!(contract.component(0), Some(ComponentRef::Conditional(_))));
    assert!(matches!(contract.component(1), Some(ComponentRef::ChainNode { .. })));
    assert!(matches!(contract.component(2), Some(ComponentRef::ChainNode { .. })));
    assert_eq!(contract.component(3).map(|c| c.internal_id()), Some(3));
    assert!(contract.component(4).is_none());
}

#[test]
fn test_blank_instances_are_isolated() {
    let mut contract = definitions(2);
    contract
        .update_component(0, [("Name", text("BABA"))])
        .unwrap();
    assert_eq!(
        contract.to_cola(),
        "[0] BABA IS SUBJECT\nC-AND\n[1] SUBJECT IS SUBJECT"
    );
}

#[test]
fn test_extend_inserts_after_node() {
    let mut contract = definitions(1);
    contract.extend_chain_component(0).unwrap();
    contract.extend_chain_component(1).unwrap();
    for (id, name) in ["A", "B", "C"].iter().enumerate() {
        contract
            .update_component(id as u32, [("Name", text(name))])
            .unwrap();
    }

    contract.extend_chain_component(1).unwrap();
    assert_eq!(
        contract.to_cola(),
        "[0] A IS SUBJECT AND\n[1] B IS SUBJECT AND\n[2] SUBJECT IS SUBJECT AND\n[3] C IS SUBJECT"
    );

    contract.delete_chain_component(2).unwrap();
    assert_eq!(
        contract.to_cola(),
        "[0] A IS SUBJECT AND\n[1] B IS SUBJECT AND\n[2] C IS SUBJECT"
    );
}

#[test]
fn test_linking_word_follows_attribute() {
    let mut contract = definitions(1);
    contract.extend_chain_component(0).unwrap();
    contract
        .update_component(0, [("Conjunction", text("OR"))])
        .unwrap();
    assert_eq!(
        contract.to_cola(),
        "[0] SUBJECT IS SUBJECT OR\n[1] SUBJECT IS SUBJECT"
    );
}

#[test]
fn test_conditional_chains_never_empty() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract
        .add_component(&spec(&registry, "conditional_definition"))
        .unwrap();
    let before = contract.to_cola();

    for id in [1, 2] {
        assert_eq!(
            contract.delete_chain_component(id).unwrap(),
            ChainDeletion::Refused
        );
    }
    assert_eq!(contract.to_cola(), before);
}

#[test]
fn test_nested_chain_edits() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract
        .add_component(&spec(&registry, "conditional_definition"))
        .unwrap();

    // Condition node is internal id 2
    contract.extend_chain_component(2).unwrap();
    contract
        .update_component(3, [("Verb Status", text("delivered"))])
        .unwrap();
    assert_eq!(
        contract.to_cola(),
        format!(
            "[0] SUBJECT IS SUBJECT\nIF\n[1] {} AND\n[2] it is the case that SUBJECT delivered GBP 0 on ADATE",
            CONDITION
        )
    );

    assert_eq!(
        contract.delete_chain_component(2).unwrap(),
        ChainDeletion::NewHead
    );
    assert_eq!(
        contract.to_cola(),
        "[0] SUBJECT IS SUBJECT\nIF\n[1] it is the case that SUBJECT delivered GBP 0 on ADATE"
    );
}

#[test]
fn test_form_order_precedence() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract
        .add_component(&spec(&registry, "conditional_definition"))
        .unwrap();

    let Some(ComponentRef::Conditional(conditional)) = contract.component(0) else {
        panic!("expected a conditional");
    };
    let result = conditional.result().head().unwrap().display_id();
    let condition = conditional.condition().head().unwrap().display_id();
    assert!(result < condition);

    contract.set_component_form(0, "if then").unwrap();
    assert_eq!(
        contract.to_cola(),
        format!("IF\n[0] {}\nTHEN\n[1] SUBJECT IS SUBJECT", CONDITION)
    );
    let Some(ComponentRef::Conditional(conditional)) = contract.component(0) else {
        panic!("expected a conditional");
    };
    let result = conditional.result().head().unwrap().display_id();
    let condition = conditional.condition().head().unwrap().display_id();
    assert!(condition < result);
}

#[test]
fn test_else_conditional_renders_else_last() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract
        .add_component(&spec(&registry, "else_conditional_statement"))
        .unwrap();
    assert_eq!(
        contract.to_cola(),
        format!("[0] {}\nIF\n[1] {}\nELSE\n[2] {}", STATEMENT, CONDITION, STATEMENT)
    );

    contract.set_component_form(0, "if then").unwrap();
    assert_eq!(
        contract.to_cola(),
        format!(
            "IF\n[0] {}\nTHEN\n[1] {}\nELSE\n[2] {}",
            CONDITION, STATEMENT, STATEMENT
        )
    );

    // Else node is internal id 3 and still cannot be emptied
    assert_eq!(
        contract.delete_chain_component(3).unwrap(),
        ChainDeletion::Refused
    );
}

#[test]
fn test_collections_render_in_declared_order() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract.add_component(&spec(&registry, "statement")).unwrap();
    contract.add_component(&spec(&registry, "definition")).unwrap();
    assert_eq!(
        contract.to_cola(),
        format!("[0] SUBJECT IS SUBJECT\nC-AND\n[1] {}", STATEMENT)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_ids() {
    let mut contract = definitions(1);
    assert_eq!(
        contract.delete_component(5),
        Err(ModelError::UnknownComponentId(5))
    );
    assert_eq!(
        contract.update_component(5, [("Name", text("BABA"))]),
        Err(ModelError::UnknownComponentId(5))
    );
    assert_eq!(
        contract.delete_chain_component(5),
        Err(ModelError::UnknownComponentId(5))
    );
    assert_eq!(
        contract.extend_chain_component(5),
        Err(ModelError::UnknownComponentId(5))
    );
    assert_eq!(
        contract.set_component_form(5, "definition"),
        Err(ModelError::UnknownComponentId(5))
    );
}

#[test]
fn test_delete_component_only_takes_entry_ids() {
    let mut contract = definitions(1);
    contract.extend_chain_component(0).unwrap();
    assert_eq!(
        contract.delete_component(1),
        Err(ModelError::UnknownComponentId(1))
    );
    // The head id removes the whole chain
    contract.delete_component(0).unwrap();
    assert_eq!(contract.to_cola(), "");
}

#[test]
fn test_unknown_attribute_leaves_component_unchanged() {
    let mut contract = definitions(1);
    let err = contract
        .update_component(0, [("Name", text("BABA")), ("Colour", text("RED"))])
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::UnknownAttribute {
            component: 0,
            attribute: "Colour".to_string(),
        }
    );
    assert_eq!(contract.to_cola(), "[0] SUBJECT IS SUBJECT");
}

#[test]
fn test_conditionals_carry_no_attributes() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract
        .add_component(&spec(&registry, "conditional_definition"))
        .unwrap();
    let err = contract
        .update_component(0, [("Name", text("BABA"))])
        .unwrap_err();
    assert!(matches!(err, ModelError::UnknownAttribute { component: 0, .. }));
    assert!(contract.visible_attributes(0).unwrap().is_empty());
}

#[test]
fn test_unknown_form() {
    let mut contract = definitions(1);
    let err = contract.set_component_form(0, "if").unwrap_err();
    assert_eq!(
        err,
        ModelError::UnknownForm {
            component: 0,
            form: "if".to_string(),
        }
    );
}

#[test]
fn test_unaddable_spec_has_no_collection() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    let err = contract
        .add_component(&spec(&registry, "condition"))
        .unwrap_err();
    assert_eq!(err, ModelError::UnknownCollection("none".to_string()));
    assert!(contract.is_empty());
}

#[test]
fn test_contract_without_matching_collection() {
    let registry = definition_registry();
    let mut contract = Contract::new(["annexes"]);
    let err = contract
        .add_component(&spec(&registry, "definition"))
        .unwrap_err();
    assert_eq!(err, ModelError::UnknownCollection("definitions".to_string()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Forms, values and validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_leaf_lookup_outlives_component_ref() {
    let contract = definitions(2);
    let leaves: Vec<&SimpleComponent> = [0, 1]
        .into_iter()
        .filter_map(|id| contract.component(id).and_then(|found| found.as_leaf()))
        .collect();
    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[1].display_text(), "[1] SUBJECT IS SUBJECT");
    assert_eq!(contract.visible_attributes(1).unwrap().len(), 2);
}

#[test]
fn test_form_switch_and_visible_attributes() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract.add_component(&spec(&registry, "statement")).unwrap();

    contract.set_component_form(0, "short").unwrap();
    assert_eq!(contract.to_cola(), "[0] SUBJECT shall pay GBP 0");
    let names: Vec<&str> = contract
        .visible_attributes(0)
        .unwrap()
        .iter()
        .map(|a| a.name())
        .collect();
    assert_eq!(names, vec!["Subject", "Modal Verb", "Verb", "Object"]);

    contract.set_component_form(0, "prohibition").unwrap();
    assert_eq!(
        contract.to_cola(),
        "[0] it is the case that SUBJECT shall NOT pay GBP 0 on ADATE"
    );
}

#[test]
fn test_hybrid_date_values() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract.add_component(&spec(&registry, "statement")).unwrap();

    contract
        .update_component(0, [("Date", AttributeValue::custom("1 March 2024"))])
        .unwrap();
    assert!(contract.to_cola().ends_with("GBP 0 on the 1 March 2024"));

    contract
        .update_component(0, [("Date", text("before ADATE"))])
        .unwrap();
    assert!(contract.to_cola().ends_with("GBP 0 before ADATE"));
    assert!(contract.validate().is_empty());
}

#[test]
fn test_empty_choice_renders_nothing() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract.add_component(&spec(&registry, "note")).unwrap();
    assert_eq!(contract.to_cola(), "[0] SUBJECT IS  BOUND");

    contract
        .update_component(0, [("Negation", text("not"))])
        .unwrap();
    assert_eq!(contract.to_cola(), "[0] SUBJECT IS not BOUND");
}

#[test]
fn test_validate_reports_invalid_values() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    contract.add_component(&spec(&registry, "statement")).unwrap();
    contract.add_component(&spec(&registry, "definition")).unwrap();
    assert!(contract.validate().is_empty());

    // Statement is internal id 1, after the definition
    contract
        .update_component(
            1,
            [
                ("Object", text("lots of money")),
                ("Date", AttributeValue::custom("31 Smarch 2024")),
            ],
        )
        .unwrap();
    let invalid = contract.validate();
    let attributes: Vec<&str> = invalid.iter().map(|i| i.attribute.as_str()).collect();
    assert_eq!(attributes, vec!["Object", "Date"]);
    assert_eq!(invalid[0].component, 1);
    assert_eq!(invalid[0].display_id, 1);
    assert_eq!(invalid[0].value, "lots of money");
    assert!(invalid[0].explanation.starts_with("An object is"));
    assert_eq!(invalid[1].value, "on the 31 Smarch 2024");
}

#[test]
fn test_clear_keeps_collections() {
    let mut contract = definitions(3);
    contract.clear();
    assert_eq!(contract.to_cola(), "");
    assert_eq!(contract.collections().len(), 2);

    let registry = definition_registry();
    let id = contract
        .add_component(&spec(&registry, "definition"))
        .unwrap();
    assert_eq!(id, 0);
}

#[test]
fn test_add_component_returns_entry_id() {
    let registry = cola_registry();
    let mut contract = Contract::from_registry(&registry);
    assert_eq!(
        contract
            .add_component(&spec(&registry, "conditional_definition"))
            .unwrap(),
        0
    );
    // Conditional 0 owns nodes 1 and 2
    assert_eq!(
        contract.add_component(&spec(&registry, "definition")).unwrap(),
        3
    );
}
