// Demo mode - builds a small sample contract from the loaded specification
//
// Exercises the editing operations end to end (add, extend, form change,
// update) so a new specification can be smoke-tested without writing a
// document by hand. Component names match the bundled specs/cola.json.

use anyhow::{bail, Context, Result};
use cola_builder::model::{AttributeValue, ComponentRef, Document, SpecRegistry};
use std::sync::Arc;

/// Build the sample contract in an unsaved document
pub fn build(registry: Arc<SpecRegistry>) -> Result<Document> {
    let mut document = Document::new(registry);

    // Two defined parties in one definition chain
    let seller = document.add_component("definition")?;
    document.contract_mut().update_component(
        seller,
        [
            ("Name", AttributeValue::text("SELLER")),
            ("Definition", AttributeValue::text("the ACME TRADING COMPANY")),
        ],
    )?;
    document.contract_mut().extend_chain_component(seller)?;
    let buyer = next_node(&document, seller)?;
    document.contract_mut().update_component(
        buyer,
        [
            ("Name", AttributeValue::text("BUYER")),
            ("Definition", AttributeValue::text("the PURCHASER")),
        ],
    )?;

    // Delivery obliges payment
    let conditional = document.add_component("conditional_statement")?;
    document
        .contract_mut()
        .set_component_form(conditional, "if then")?;
    let (condition, result) = conditional_heads(&document, conditional)?;
    document.contract_mut().update_component(
        condition,
        [
            ("Subject", AttributeValue::text("SELLER")),
            ("Verb Status", AttributeValue::text("delivered")),
            ("Object", AttributeValue::text("the GOODS")),
            ("Date", AttributeValue::custom("1 March 2024")),
        ],
    )?;
    document.contract_mut().update_component(
        result,
        [
            ("Subject", AttributeValue::text("BUYER")),
            ("Object", AttributeValue::text("GBP 1200")),
            ("Date", AttributeValue::custom("31 March 2024")),
        ],
    )?;

    let note = document.add_component("note")?;
    document
        .contract_mut()
        .update_component(note, [("Subject", AttributeValue::text("the GUARANTOR"))])?;

    tracing::info!(
        "Built demo contract with {} lines",
        document.contract().leaves().len()
    );
    Ok(document)
}

fn next_node(document: &Document, id: u32) -> Result<u32> {
    match document.contract().component(id) {
        Some(ComponentRef::ChainNode { chain, .. }) => chain
            .iter()
            .map(|node| node.internal_id())
            .skip_while(|&node| node != id)
            .nth(1)
            .with_context(|| format!("Component {} has no successor", id)),
        _ => bail!("Component {} is not a chain node", id),
    }
}

fn conditional_heads(document: &Document, id: u32) -> Result<(u32, u32)> {
    let Some(ComponentRef::Conditional(conditional)) = document.contract().component(id) else {
        bail!("Component {} is not a conditional", id);
    };
    let condition = conditional
        .condition()
        .head()
        .context("Condition chain is empty")?;
    let result = conditional.result().head().context("Result chain is empty")?;
    Ok((condition.internal_id(), result.internal_id()))
}
