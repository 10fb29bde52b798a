//! Terminal types
//!
//! A terminal is the value type behind an attribute: free text checked
//! against a grammar rule, a fixed set of choices, or a hybrid that offers
//! choices plus a custom text escape hatch. Terminals are built once when a
//! specification loads and shared read-only by every attribute that uses them.

use super::attribute::AttributeValue;
use super::error::{ModelError, Result};
use crate::grammar::Grammar;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Terminal {
    name: String,
    kind: TerminalKind,
}

#[derive(Debug, Clone)]
pub enum TerminalKind {
    Text(TextTerminal),
    MultiChoice(MultiChoiceTerminal),
    Hybrid(HybridTerminal),
}

/// Free text validated by a grammar rule
#[derive(Debug, Clone)]
pub struct TextTerminal {
    default: String,
    parse_root: String,
    explanation: String,
    grammar: Arc<Grammar>,
}

#[derive(Debug, Clone)]
pub struct MultiChoiceTerminal {
    default: String,
    choices: Vec<String>,
    allow_empty: bool,
}

/// A choice list where `CUSTOM` switches to grammar-checked free text
#[derive(Debug, Clone)]
pub struct HybridTerminal {
    default_option: String,
    default_text: String,
    parse_root: String,
    explanation: String,
    choices: Vec<String>,
    grammar: Arc<Grammar>,
}

impl HybridTerminal {
    pub const CUSTOM_OPTION: &'static str = "CUSTOM";

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn default_text(&self) -> &str {
        &self.default_text
    }
}

impl MultiChoiceTerminal {
    /// Selecting this renders the attribute as nothing
    pub const EMPTY_OPTION: &'static str = "EMPTY";

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }
}

impl Terminal {
    pub fn text(
        name: impl Into<String>,
        default: impl Into<String>,
        parse_root: impl Into<String>,
        explanation: impl Into<String>,
        grammar: Arc<Grammar>,
    ) -> Result<Self> {
        let terminal = Self {
            name: name.into(),
            kind: TerminalKind::Text(TextTerminal {
                default: default.into(),
                parse_root: parse_root.into(),
                explanation: explanation.into(),
                grammar,
            }),
        };
        terminal.check_parse_root()?;
        terminal.check_default()?;
        Ok(terminal)
    }

    pub fn multi_choice(
        name: impl Into<String>,
        default: impl Into<String>,
        choices: Vec<String>,
        allow_empty: bool,
    ) -> Result<Self> {
        let name = name.into();
        if choices.is_empty() {
            return Err(ModelError::config(format!(
                "multi-choice terminal '{}' has no choices",
                name
            )));
        }
        let terminal = Self {
            name,
            kind: TerminalKind::MultiChoice(MultiChoiceTerminal {
                default: default.into(),
                choices,
                allow_empty,
            }),
        };
        terminal.check_default()?;
        Ok(terminal)
    }

    pub fn hybrid(
        name: impl Into<String>,
        default_option: impl Into<String>,
        default_text: impl Into<String>,
        parse_root: impl Into<String>,
        explanation: impl Into<String>,
        mut choices: Vec<String>,
        grammar: Arc<Grammar>,
    ) -> Result<Self> {
        if !choices.iter().any(|c| c == HybridTerminal::CUSTOM_OPTION) {
            choices.push(HybridTerminal::CUSTOM_OPTION.to_string());
        }
        let terminal = Self {
            name: name.into(),
            kind: TerminalKind::Hybrid(HybridTerminal {
                default_option: default_option.into(),
                default_text: default_text.into(),
                parse_root: parse_root.into(),
                explanation: explanation.into(),
                choices,
                grammar,
            }),
        };
        terminal.check_parse_root()?;
        terminal.check_default()?;
        Ok(terminal)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TerminalKind {
        &self.kind
    }

    /// Category name as written in specification files
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TerminalKind::Text(_) => "text",
            TerminalKind::MultiChoice(_) => "multi-choice",
            TerminalKind::Hybrid(_) => "hybrid",
        }
    }

    pub fn choices(&self) -> &[String] {
        match &self.kind {
            TerminalKind::Text(_) => &[],
            TerminalKind::MultiChoice(t) => &t.choices,
            TerminalKind::Hybrid(t) => &t.choices,
        }
    }

    pub fn default_value(&self) -> AttributeValue {
        match &self.kind {
            TerminalKind::Text(t) => AttributeValue::Text(t.default.clone()),
            TerminalKind::MultiChoice(t) => AttributeValue::Text(t.default.clone()),
            TerminalKind::Hybrid(t) => AttributeValue::Hybrid {
                option: t.default_option.clone(),
                custom: t.default_text.clone(),
            },
        }
    }

    /// Whether `text` is an acceptable value for this terminal.
    ///
    /// Hybrid terminals accept any of their options outright, `CUSTOM`
    /// included, and otherwise fall back to the grammar rule.
    pub fn validate(&self, text: &str) -> bool {
        match &self.kind {
            TerminalKind::Text(t) => t.grammar.parse(&t.parse_root, text),
            TerminalKind::MultiChoice(t) => {
                t.choices.iter().any(|c| c == text)
                    || (t.allow_empty && text == MultiChoiceTerminal::EMPTY_OPTION)
            }
            TerminalKind::Hybrid(t) => {
                t.choices.iter().any(|c| c == text) || t.grammar.parse(&t.parse_root, text)
            }
        }
    }

    /// Message shown when a value fails [`Terminal::validate`]
    pub fn explanation(&self) -> String {
        match &self.kind {
            TerminalKind::Text(t) => t.explanation.clone(),
            TerminalKind::Hybrid(t) => t.explanation.clone(),
            TerminalKind::MultiChoice(t) => {
                format!("{} must be one of: {}", self.name, t.choices.join(", "))
            }
        }
    }

    fn check_parse_root(&self) -> Result<()> {
        let (grammar, rule) = match &self.kind {
            TerminalKind::Text(t) => (&t.grammar, &t.parse_root),
            TerminalKind::Hybrid(t) => (&t.grammar, &t.parse_root),
            TerminalKind::MultiChoice(_) => return Ok(()),
        };
        if grammar.has_rule(rule) {
            Ok(())
        } else {
            Err(ModelError::config(format!(
                "terminal '{}' uses undefined grammar rule '{}'",
                self.name, rule
            )))
        }
    }

    fn check_default(&self) -> Result<()> {
        let (default, what) = match &self.kind {
            TerminalKind::Text(t) => (t.default.as_str(), "default"),
            TerminalKind::MultiChoice(t) => (t.default.as_str(), "default"),
            TerminalKind::Hybrid(t) => {
                if !t.choices.contains(&t.default_option) {
                    return Err(ModelError::config(format!(
                        "default option '{}' of terminal '{}' is not one of its choices",
                        t.default_option, self.name
                    )));
                }
                // Default text is checked per attribute, after its prefix
                return Ok(());
            }
        };
        if self.validate(default) {
            Ok(())
        } else {
            Err(ModelError::config(format!(
                "{} '{}' of terminal '{}' does not validate",
                what, default, self.name
            )))
        }
    }
}
