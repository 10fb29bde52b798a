//! Component attributes and their values

use super::error::{ModelError, Result};
use super::terminal::{HybridTerminal, MultiChoiceTerminal, Terminal, TerminalKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Current value of an attribute.
///
/// Hybrid attributes remember both the selected option and the custom text,
/// so switching back to `CUSTOM` restores what was typed before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Hybrid { option: String, custom: String },
}

impl AttributeValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn hybrid(option: impl Into<String>, custom: impl Into<String>) -> Self {
        Self::Hybrid {
            option: option.into(),
            custom: custom.into(),
        }
    }

    /// A custom hybrid value
    pub fn custom(text: impl Into<String>) -> Self {
        Self::hybrid(HybridTerminal::CUSTOM_OPTION, text)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A named slot on a component, bound to a shared terminal.
///
/// Specs hold template attributes; every component instance receives its
/// own copies through [`ComponentAttribute::create_blank`].
#[derive(Debug, Clone)]
pub struct ComponentAttribute {
    name: String,
    terminal: Arc<Terminal>,
    prefix: Option<String>,
    value: AttributeValue,
}

impl ComponentAttribute {
    pub fn new(name: impl Into<String>, terminal: Arc<Terminal>, prefix: Option<String>) -> Self {
        let value = terminal.default_value();
        Self {
            name: name.into(),
            terminal,
            prefix,
            value,
        }
    }

    /// Fresh attribute on the same terminal, reset to the terminal default
    pub fn create_blank(&self) -> Self {
        Self::new(self.name.clone(), Arc::clone(&self.terminal), self.prefix.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Store a value, coerced to the shape this attribute's terminal uses.
    ///
    /// Plain text on a hybrid attribute selects the matching option, or
    /// becomes custom text when no option matches. A hybrid value on a
    /// non-hybrid attribute collapses to the text it would render as.
    pub fn set_value(&mut self, value: AttributeValue) {
        self.value = match (self.terminal.kind(), value) {
            (TerminalKind::Hybrid(hybrid), AttributeValue::Text(text)) => {
                let custom = match &self.value {
                    AttributeValue::Hybrid { custom, .. } => custom.clone(),
                    AttributeValue::Text(_) => hybrid.default_text().to_string(),
                };
                if hybrid.choices().contains(&text) {
                    AttributeValue::Hybrid {
                        option: text,
                        custom,
                    }
                } else {
                    AttributeValue::custom(text)
                }
            }
            (TerminalKind::Hybrid(_), value @ AttributeValue::Hybrid { .. }) => value,
            (_, AttributeValue::Hybrid { option, custom }) => {
                if option == HybridTerminal::CUSTOM_OPTION {
                    AttributeValue::Text(custom)
                } else {
                    AttributeValue::Text(option)
                }
            }
            (_, value) => value,
        };
    }

    /// The text this attribute contributes to a rendered component
    pub fn effective_value(&self) -> String {
        match &self.value {
            AttributeValue::Text(text) => {
                if text == MultiChoiceTerminal::EMPTY_OPTION
                    && matches!(self.terminal.kind(), TerminalKind::MultiChoice(t) if t.allows_empty())
                {
                    String::new()
                } else {
                    text.clone()
                }
            }
            AttributeValue::Hybrid { option, custom } => {
                if option != HybridTerminal::CUSTOM_OPTION {
                    return option.clone();
                }
                match &self.prefix {
                    Some(prefix) => format!("{} {}", prefix, custom),
                    None => custom.clone(),
                }
            }
        }
    }

    /// Reject a hybrid terminal whose default text would render invalid on
    /// this attribute
    pub fn check_default(&self) -> Result<()> {
        let TerminalKind::Hybrid(hybrid) = self.terminal.kind() else {
            return Ok(());
        };
        let mut custom = self.create_blank();
        custom.set_value(AttributeValue::custom(hybrid.default_text()));
        if custom.validate() {
            Ok(())
        } else {
            Err(ModelError::config(format!(
                "default text '{}' of terminal '{}' does not validate as attribute '{}'",
                custom.effective_value(),
                self.terminal.name(),
                self.name
            )))
        }
    }

    /// Whether the current value is acceptable to the terminal
    pub fn validate(&self) -> bool {
        match &self.value {
            AttributeValue::Text(text) => self.terminal.validate(text),
            AttributeValue::Hybrid { option, .. } if option != HybridTerminal::CUSTOM_OPTION => {
                self.terminal.validate(option)
            }
            AttributeValue::Hybrid { .. } => self.terminal.validate(&self.effective_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn grammar() -> Arc<Grammar> {
        let source = "subject: WORD+\nWORD: /[A-Z]+/\ndate: \"on\" \"the\" DAY MONTH\nDAY: /[0-9]{1,2}/\nMONTH: \"January\" | \"March\"";
        Arc::new(Grammar::new(source).unwrap())
    }

    fn subject() -> ComponentAttribute {
        let terminal = Terminal::text("subject", "SUBJECT", "subject", "", grammar()).unwrap();
        ComponentAttribute::new("Name", Arc::new(terminal), None)
    }

    fn date() -> ComponentAttribute {
        let terminal = Terminal::hybrid(
            "date",
            "on ADATE",
            "3 March",
            "date",
            "",
            vec!["on ADATE".to_string(), "by ADATE".to_string()],
            grammar(),
        )
        .unwrap();
        ComponentAttribute::new("Date", Arc::new(terminal), Some("on the".to_string()))
    }

    #[test]
    fn test_create_blank_resets_and_isolates() {
        let mut original = subject();
        original.set_value("BABA".into());
        let mut blank = original.create_blank();
        assert_eq!(blank.value(), &AttributeValue::text("SUBJECT"));

        blank.set_value("KEKE".into());
        assert_eq!(original.effective_value(), "BABA");
        assert_eq!(blank.effective_value(), "KEKE");
    }

    #[test]
    fn test_hybrid_effective_value() {
        let mut attr = date();
        assert_eq!(attr.effective_value(), "on ADATE");

        attr.set_value(AttributeValue::custom("12 January"));
        assert_eq!(attr.effective_value(), "on the 12 January");
        assert!(attr.validate());

        attr.set_value("by ADATE".into());
        assert_eq!(attr.effective_value(), "by ADATE");
        // The custom text survives switching back to an option
        assert_eq!(attr.value(), &AttributeValue::hybrid("by ADATE", "12 January"));
    }

    #[test]
    fn test_default_text_checked_after_prefix() {
        // The grammar requires "on the", which only the prefix supplies
        assert!(date().check_default().is_ok());

        let bare = ComponentAttribute::new("Date", Arc::clone(&date().terminal), None);
        let err = bare.check_default().unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("'3 March'"), "{}", err);
        assert!(subject().check_default().is_ok());
    }

    #[test]
    fn test_plain_text_on_hybrid_becomes_custom() {
        let mut attr = date();
        attr.set_value("30 February".into());
        assert_eq!(attr.value(), &AttributeValue::custom("30 February"));
        assert!(!attr.validate());
    }

    #[test]
    fn test_hybrid_value_on_text_attribute_collapses() {
        let mut attr = subject();
        attr.set_value(AttributeValue::custom("SELLER"));
        assert_eq!(attr.value(), &AttributeValue::text("SELLER"));
    }

    #[test]
    fn test_empty_multi_choice_renders_nothing() {
        let terminal =
            Terminal::multi_choice("negation", "EMPTY", vec!["not".to_string()], true).unwrap();
        let mut attr = ComponentAttribute::new("Negation", Arc::new(terminal), None);
        assert_eq!(attr.effective_value(), "");
        attr.set_value("not".into());
        assert_eq!(attr.effective_value(), "not");
    }

    #[test]
    fn test_value_serializes_untagged() {
        let text = serde_json::to_string(&AttributeValue::text("AND")).unwrap();
        assert_eq!(text, "\"AND\"");
        let hybrid: AttributeValue =
            serde_json::from_str(r#"{"option":"CUSTOM","custom":"1 March"}"#).unwrap();
        assert_eq!(hybrid, AttributeValue::custom("1 March"));
    }
}
