//! Contract builder for the CoLa contract language
//!
//! - [`grammar`] validates terminal text against a context-free grammar
//! - [`aloc`] loads a component specification file into a [`model::SpecRegistry`]
//! - [`model`] holds the editable contract and renders it to CoLa text

pub mod aloc;
pub mod grammar;
pub mod model;
