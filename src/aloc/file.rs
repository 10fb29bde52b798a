//! Raw specification file structure (deserialization layer)
//!
//! Mirrors the JSON layout one to one. Nothing here is validated; the
//! loader in the parent module turns these into model types and rejects
//! anything inconsistent.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub(crate) struct AlocFile {
    pub contract: ContractSection,

    #[serde(default)]
    pub terminal_types: TerminalTypes,

    #[serde(default)]
    pub chain_components: Vec<FileSimpleComponent>,

    #[serde(default)]
    pub simple_components: Vec<FileSimpleComponent>,

    #[serde(default)]
    pub conditional_components: Vec<FileConditionalComponent>,

    #[serde(default)]
    pub else_conditional_components: Vec<FileElseConditionalComponent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContractSection {
    /// Relative to the specification file's directory
    pub grammar_path: PathBuf,
    pub collections: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Terminals
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TerminalTypes {
    #[serde(default)]
    pub text: Vec<FileTextTerminal>,

    #[serde(default, rename = "multi-choice")]
    pub multi_choice: Vec<FileMultiChoiceTerminal>,

    #[serde(default)]
    pub hybrid: Vec<FileHybridTerminal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileTextTerminal {
    pub name: String,
    pub default: String,
    pub parse_root: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileMultiChoiceTerminal {
    pub name: String,
    pub default: String,
    pub choices: Vec<String>,
    #[serde(default)]
    pub allow_empty: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileHybridTerminal {
    pub name: String,
    pub default_option: String,
    pub default_text: String,
    pub parse_root: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub choices: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct FileAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub terminal: String,
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileForm {
    pub form_name: String,
    pub display_name: String,
    pub colour: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileSimpleForm {
    #[serde(flatten)]
    pub form: FileForm,
    pub format_string: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Simple and chain components share a layout; chains add a linking attribute
#[derive(Debug, Deserialize)]
pub(crate) struct FileSimpleComponent {
    pub component_name: String,
    pub collection_location: String,
    #[serde(default)]
    pub attributes: Vec<FileAttribute>,
    #[serde(default)]
    pub form_specs: Vec<FileSimpleForm>,
    pub linking_attribute: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileConditionalComponent {
    pub component_name: String,
    pub collection_location: String,
    #[serde(default)]
    pub form_specs: Vec<FileForm>,
    pub condition: String,
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileElseConditionalComponent {
    #[serde(flatten)]
    pub conditional: FileConditionalComponent,
    #[serde(rename = "else")]
    pub else_spec: String,
}
