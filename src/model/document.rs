//! Working document: a contract plus where it lives on disk
//!
//! The contract itself knows nothing about files. A document owns one
//! contract and the registry it was built from, and moves snapshots to and
//! from JSON files.

use super::contract::Contract;
use super::snapshot::ContractSnapshot;
use super::spec::SpecRegistry;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
pub struct Document {
    registry: Arc<SpecRegistry>,
    contract: Contract,
    path: Option<PathBuf>,
}

impl Document {
    /// Unsaved document with an empty contract
    pub fn new(registry: Arc<SpecRegistry>) -> Self {
        let contract = Contract::from_registry(&registry);
        Self {
            registry,
            contract,
            path: None,
        }
    }

    /// Load a document saved with [`Document::save`]
    pub fn open(registry: Arc<SpecRegistry>, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        let snapshot: ContractSnapshot = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse document {}", path.display()))?;
        let contract = Contract::restore(&snapshot, &registry)
            .with_context(|| format!("Failed to restore document {}", path.display()))?;
        tracing::info!("Opened document {}", path.display());
        Ok(Self {
            registry,
            contract,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open `path` if it exists, otherwise start an empty document bound to it
    pub fn open_or_new(registry: Arc<SpecRegistry>, path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::open(registry, path);
        }
        let mut document = Self::new(registry);
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn registry(&self) -> &SpecRegistry {
        &self.registry
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn contract_mut(&mut self) -> &mut Contract {
        &mut self.contract
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Add a blank component by spec name
    pub fn add_component(&mut self, name: &str) -> Result<u32> {
        let Some(spec) = self.registry.component_spec(name) else {
            bail!(
                "Unknown component '{}'. Available: {}",
                name,
                self.registry.addable_component_names().join(", ")
            );
        };
        Ok(self.contract.add_component(spec)?)
    }

    /// Discard every component
    pub fn new_contract(&mut self) {
        self.contract.clear();
    }

    /// Write to the document's own path
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            bail!("Document has no path; use save_as");
        };
        self.write(path)
    }

    /// Write to `path` and remember it for later saves
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.write(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.contract.snapshot())
            .context("Failed to serialize contract")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write document {}", path.display()))?;
        tracing::debug!("Saved document {}", path.display());
        Ok(())
    }
}
