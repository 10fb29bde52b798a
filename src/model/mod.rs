//! Contract document model
//!
//! Specs (loaded once, immutable) describe what components look like;
//! components (built from specs, mutable) make up a [`Contract`]. The
//! contract renders to CoLa text with [`Contract::to_cola`].

pub mod attribute;
pub mod chain_parent;
pub mod collection;
pub mod components;
pub mod contract;
pub mod document;
pub mod error;
pub mod form;
pub mod snapshot;
pub mod spec;
pub mod terminal;

#[cfg(test)]
pub(crate) mod test_support;

pub use attribute::{AttributeValue, ComponentAttribute};
pub use chain_parent::{ChainDeletion, ChainParent};
pub use collection::ComponentCollection;
pub use components::{
    Chain, Component, ComponentRef, ConditionalComponent, ElseConditionalComponent,
    SimpleComponent,
};
pub use contract::{Contract, InvalidAttribute, ENTRY_SEPARATOR};
pub use document::Document;
pub use error::{ModelError, Result};
pub use form::{FormSpec, FormatString, SimpleFormSpec};
pub use snapshot::ContractSnapshot;
pub use spec::{
    ChainComponentSpec, ComponentSpec, ConditionalComponentSpec, ConditionalLayout,
    ElseConditionalComponentSpec, SimpleComponentSpec, SpecRegistry,
};
pub use terminal::{HybridTerminal, MultiChoiceTerminal, Terminal, TerminalKind};
