// CLI module - command-line argument parsing and handlers
//
// Editing commands load the component specification, open the working
// document, apply one operation and save the document again. Read-only
// commands (components, parse, check, render, demo) never write.

use crate::config::{Config, VERSION};
use crate::demo;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cola_builder::model::{AttributeValue, ChainDeletion, Document, SpecRegistry};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Build and render CoLa contracts from a component specification
#[derive(Parser)]
#[command(name = "cola")]
#[command(version = VERSION)]
#[command(about = "Build and render CoLa contracts", long_about = None)]
pub struct Cli {
    /// Working document (overrides snapshot_path from the config)
    #[arg(long, global = true)]
    pub document: Option<PathBuf>,

    /// Component specification (overrides spec_path from the config)
    #[arg(long, global = true)]
    pub spec: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// List the components that can be added
    Components,

    /// Check text against a grammar rule
    Parse { rule: String, text: String },

    /// Check text against a terminal
    Check { terminal: String, text: String },

    /// Start an empty contract in the working document
    New,

    /// Add a blank component
    Add { component: String },

    /// Insert a blank node after chain node ID
    Extend { id: u32 },

    /// Delete the top-level entry ID
    Delete { id: u32 },

    /// Delete chain node ID, splicing its chain
    Remove { id: u32 },

    /// Set attribute values: KEY=VALUE, or KEY=OPTION::TEXT for hybrids
    Update {
        id: u32,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Switch component ID to another form
    Form { id: u32, form: String },

    /// Print the contract as CoLa text
    Render,

    /// Print a sample contract built from the specification
    Demo,
}

impl Cli {
    /// Whether the command needs neither the spec nor logging
    pub fn is_config_command(&self) -> bool {
        matches!(self.command, Commands::Config { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config subcommand
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_config(command: &Commands) -> Result<()> {
    let Commands::Config { show, reset, path } = *command else {
        bail!("Not a config command");
    };

    if path {
        handle_config_path()
    } else if show {
        handle_config_show()
    } else if reset {
        handle_config_reset()
    } else {
        println!("Usage: cola config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Contract commands
// ─────────────────────────────────────────────────────────────────────────────

/// Run any command other than `config`
pub fn run(cli: Cli, config: &Config) -> Result<ExitCode> {
    let spec_path = cli.spec.unwrap_or_else(|| config.spec_path.clone());
    let document_path = cli
        .document
        .unwrap_or_else(|| config.snapshot_path.clone());

    let registry = cola_builder::aloc::load(&spec_path)
        .with_context(|| format!("Failed to load specification {}", spec_path.display()))?;
    let registry = Arc::new(registry);

    match cli.command {
        Commands::Config { .. } => bail!("config is handled before the specification loads"),
        Commands::Components => {
            list_components(&registry);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Parse { rule, text } => {
            let grammar = registry.grammar();
            if !grammar.has_rule(&rule) {
                let rules: Vec<&str> = grammar.rule_names().collect();
                bail!("Unknown rule '{}'. Available: {}", rule, rules.join(", "));
            }
            Ok(verdict(grammar.parse(&rule, &text), None))
        }
        Commands::Check { terminal, text } => {
            let terminal = registry
                .terminal(&terminal)
                .with_context(|| format!("Unknown terminal '{}'", terminal))?;
            let explanation = terminal.explanation();
            Ok(verdict(terminal.validate(&text), Some(&explanation)))
        }
        Commands::Render => {
            let document = Document::open_or_new(registry, &document_path)?;
            for invalid in document.contract().validate() {
                eprintln!(
                    "warning: [{}] {} = '{}': {}",
                    invalid.display_id, invalid.attribute, invalid.value, invalid.explanation
                );
            }
            println!("{}", document.contract().to_cola());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Demo => {
            let document = demo::build(registry)?;
            println!("{}", document.contract().to_cola());
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let mut document = Document::open_or_new(registry, &document_path)?;
            edit(&mut document, command)?;
            document.save()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Apply one editing command to the document
fn edit(document: &mut Document, command: Commands) -> Result<()> {
    match command {
        Commands::New => {
            document.new_contract();
            println!("Started a new contract");
        }
        Commands::Add { component } => {
            let id = document.add_component(&component)?;
            println!("Added {} as {}", component, id);
        }
        Commands::Extend { id } => {
            document.contract_mut().extend_chain_component(id)?;
            println!("Extended chain after {}", id);
        }
        Commands::Delete { id } => {
            document.contract_mut().delete_component(id)?;
            println!("Deleted {}", id);
        }
        Commands::Remove { id } => {
            let message = match document.contract_mut().delete_chain_component(id)? {
                ChainDeletion::Spliced => "removed from its chain",
                ChainDeletion::NewHead => "removed; its successor now heads the chain",
                ChainDeletion::Emptied => "removed along with its chain",
                ChainDeletion::Refused => "kept; a conditional's chain needs at least one line",
            };
            println!("{} {}", id, message);
        }
        Commands::Update { id, values } => {
            let values = values
                .iter()
                .map(|v| parse_assignment(v))
                .collect::<Result<Vec<_>>>()?;
            document.contract_mut().update_component(id, values)?;
            println!("Updated {}", id);
        }
        Commands::Form { id, form } => {
            document.contract_mut().set_component_form(id, &form)?;
            println!("{} is now a '{}'", id, form);
        }
        Commands::Config { .. }
        | Commands::Components
        | Commands::Parse { .. }
        | Commands::Check { .. }
        | Commands::Render
        | Commands::Demo => bail!("Not an editing command"),
    }
    Ok(())
}

fn list_components(registry: &SpecRegistry) {
    for spec in registry.component_specs().iter().filter(|s| s.is_addable()) {
        println!(
            "{} ({}, {}): {}",
            spec.name(),
            spec.kind_name(),
            spec.collection(),
            spec.form_names().join(", ")
        );
    }
}

fn verdict(valid: bool, explanation: Option<&str>) -> ExitCode {
    if valid {
        println!("valid");
        return ExitCode::SUCCESS;
    }
    println!("invalid");
    if let Some(explanation) = explanation.filter(|e| !e.is_empty()) {
        println!("{}", explanation);
    }
    ExitCode::FAILURE
}

/// Split `KEY=VALUE`; a value of the form `OPTION::TEXT` is a hybrid value
fn parse_assignment(input: &str) -> Result<(String, AttributeValue)> {
    let Some((key, value)) = input.split_once('=') else {
        bail!("Expected KEY=VALUE, got '{}'", input);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Missing attribute name in '{}'", input);
    }
    let value = match value.split_once("::") {
        Some((option, text)) => AttributeValue::hybrid(option, text),
        None => AttributeValue::text(value),
    };
    Ok((key.to_string(), value))
}
