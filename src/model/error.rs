//! Error types for the document model
//!
//! Every failure here is a local precondition violation surfaced to the
//! caller synchronously. Grammar validation failures are not errors: they
//! are reported as `false` by `Terminal::validate`.

use thiserror::Error;

/// Result type alias for document model operations
pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// No component with this internal id exists where it was looked for
    #[error("no component with internal id {0}")]
    UnknownComponentId(u32),

    /// An update named an attribute the component does not carry
    #[error("component {component} has no attribute named '{attribute}'")]
    UnknownAttribute { component: u32, attribute: String },

    /// A form change named a form the component does not offer
    #[error("component {component} has no form named '{form}'")]
    UnknownForm { component: u32, form: String },

    /// A spec names a collection the contract does not have
    #[error("contract has no collection named '{0}'")]
    UnknownCollection(String),

    /// The specification or grammar file is malformed or inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A saved snapshot could not be decoded against the loaded specs
    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}

impl ModelError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub(crate) fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot(message.into())
    }
}
