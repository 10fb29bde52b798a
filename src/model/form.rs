//! Forms: the named shapes a component can take

use super::error::{ModelError, Result};

pub const DEFAULT_COLOUR: &str = "grey";

/// Name, label and colour of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    name: String,
    display_name: String,
    colour: String,
}

impl FormSpec {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        colour: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            colour: colour.unwrap_or_else(|| DEFAULT_COLOUR.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn colour(&self) -> &str {
        &self.colour
    }
}

/// A form of a simple or chain component: which attributes it shows and
/// how they are laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleFormSpec {
    form: FormSpec,
    format: FormatString,
    attributes: Vec<String>,
}

impl SimpleFormSpec {
    pub fn new(form: FormSpec, format_string: &str, attributes: Vec<String>) -> Result<Self> {
        let format = FormatString::parse(format_string).map_err(|e| {
            ModelError::config(format!("form '{}': {}", form.name(), e))
        })?;
        if format.slot_count() != attributes.len() {
            return Err(ModelError::config(format!(
                "form '{}' has {} placeholders for {} attributes",
                form.name(),
                format.slot_count(),
                attributes.len()
            )));
        }
        Ok(Self {
            form,
            format,
            attributes,
        })
    }

    pub fn form(&self) -> &FormSpec {
        &self.form
    }

    pub fn name(&self) -> &str {
        self.form.name()
    }

    pub fn format(&self) -> &FormatString {
        &self.format
    }

    /// Attribute names in placeholder order
    pub fn expected_attributes(&self) -> &[String] {
        &self.attributes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot,
}

/// A format string with `{}` placeholders, parsed once at load time.
///
/// `{{` and `}}` stand for literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatString {
    segments: Vec<Segment>,
}

impl FormatString {
    pub fn parse(source: &str) -> std::result::Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match (c, chars.peek()) {
                ('{', Some('{')) | ('}', Some('}')) => {
                    chars.next();
                    literal.push(c);
                }
                ('{', Some('}')) => {
                    chars.next();
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot);
                }
                ('{', _) | ('}', _) => {
                    return Err(format!("unmatched '{}' in format string \"{}\"", c, source));
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    pub fn slot_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Slot))
            .count()
    }

    /// Fill the slots in order. Missing values render as nothing.
    pub fn render<S: AsRef<str>>(&self, values: &[S]) -> String {
        let mut out = String::new();
        let mut values = values.iter();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot => {
                    if let Some(value) = values.next() {
                        out.push_str(value.as_ref());
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_string_render() {
        let format = FormatString::parse("{} IS {}").unwrap();
        assert_eq!(format.slot_count(), 2);
        assert_eq!(format.render(&["BABA", "YOU"]), "BABA IS YOU");
    }

    #[test]
    fn test_format_string_escapes() {
        let format = FormatString::parse("{{{}}} costs {}").unwrap();
        assert_eq!(format.slot_count(), 2);
        assert_eq!(format.render(&["fee", "GBP 5"]), "{fee} costs GBP 5");
    }

    #[test]
    fn test_format_string_unmatched_brace() {
        assert!(FormatString::parse("{} IS {").is_err());
        assert!(FormatString::parse("} IS {}").is_err());
        assert!(FormatString::parse("{0} IS {}").is_err());
    }

    #[test]
    fn test_simple_form_checks_placeholder_count() {
        let form = FormSpec::new("definition", "Definition", None);
        assert_eq!(form.colour(), DEFAULT_COLOUR);

        let err = SimpleFormSpec::new(form.clone(), "{} IS {}", vec!["Name".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("2 placeholders for 1 attributes"));

        let ok = SimpleFormSpec::new(
            form,
            "{} IS {}",
            vec!["Name".to_string(), "Definition".to_string()],
        )
        .unwrap();
        assert_eq!(ok.expected_attributes().len(), 2);
    }
}
