//! Fixtures shared by unit tests

use super::spec::{ComponentSpec, SpecRegistry};
use std::path::{Path, PathBuf};

pub(crate) fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("specs").join(name)
}

/// One chain component, "definition", in the "definitions" collection
pub(crate) fn definition_registry() -> SpecRegistry {
    crate::aloc::load(&fixture_path("definition_only.json")).unwrap()
}

/// Definitions, statements, notes and the conditional variants
pub(crate) fn cola_registry() -> SpecRegistry {
    crate::aloc::load(&fixture_path("cola.json")).unwrap()
}

pub(crate) fn spec(registry: &SpecRegistry, name: &str) -> ComponentSpec {
    registry
        .component_spec(name)
        .cloned()
        .unwrap_or_else(|| panic!("fixture has no component '{}'", name))
}
