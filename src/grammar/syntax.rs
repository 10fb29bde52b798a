//! Recursive-descent parser turning grammar tokens into rule definitions
//!
//! ```text
//! grammar     := { definition | NEWLINE }
//! definition  := [ "?" | "!" ] NAME ":" alternation
//! alternation := sequence { [ NEWLINE+ ] "|" sequence }
//! sequence    := { item }
//! item        := atom [ "?" | "*" | "+" ]
//! atom        := NAME | LITERAL | PATTERN | "(" alternation ")" | "[" alternation "]"
//! ```
//!
//! Inside parentheses and brackets newlines are insignificant.

use super::lexer::{Spanned, Token};
use super::GrammarError;

/// Unresolved expression: references are still names
#[derive(Debug, Clone, PartialEq)]
pub(super) enum RawExpr {
    Literal { text: String, case_insensitive: bool },
    Pattern { source: String, flags: String },
    Reference(String),
    Sequence(Vec<RawExpr>),
    Choice(Vec<RawExpr>),
    Optional(Box<RawExpr>),
    Repeat { expr: Box<RawExpr>, min: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct RawRule {
    pub name: String,
    pub expr: RawExpr,
}

pub(super) fn parse_rules(
    tokens: &[Spanned<Token<'_>>],
    source_len: usize,
) -> Result<Vec<RawRule>, GrammarError> {
    let mut parser = RuleParser {
        tokens,
        pos: 0,
        source_len,
    };
    parser.grammar()
}

struct RuleParser<'t, 'src> {
    tokens: &'t [Spanned<Token<'src>>],
    pos: usize,
    source_len: usize,
}

impl<'t, 'src> RuleParser<'t, 'src> {
    fn grammar(&mut self) -> Result<Vec<RawRule>, GrammarError> {
        let mut rules = Vec::new();
        while let Some(token) = self.peek() {
            if *token == Token::Newline {
                self.pos += 1;
                continue;
            }
            rules.push(self.definition()?);
        }
        Ok(rules)
    }

    fn definition(&mut self) -> Result<RawRule, GrammarError> {
        // Lark's inline (`?rule`) and keep-all (`!rule`) markers affect the
        // parse tree shape only, not what the rule accepts.
        if matches!(self.peek(), Some(Token::Question | Token::Bang)) {
            self.pos += 1;
        }
        let name = match self.next() {
            Some(Token::Name(name)) => name.to_string(),
            _ => return Err(self.error("expected a rule name")),
        };
        self.expect(
            Token::Colon,
            format!("expected ':' after rule name '{}'", name),
        )?;
        let expr = self.alternation(false)?;
        match self.peek() {
            None | Some(Token::Newline) => Ok(RawRule { name, expr }),
            Some(_) => Err(self.error(format!("unexpected token in rule '{}'", name))),
        }
    }

    fn alternation(&mut self, nested: bool) -> Result<RawExpr, GrammarError> {
        let mut branches = vec![self.sequence(nested)?];
        loop {
            if nested {
                self.skip_newlines();
            } else if self.continues_on_next_line() {
                self.skip_newlines();
            }
            if self.peek() != Some(&Token::Pipe) {
                break;
            }
            self.pos += 1;
            branches.push(self.sequence(nested)?);
        }
        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            RawExpr::Choice(branches)
        })
    }

    fn sequence(&mut self, nested: bool) -> Result<RawExpr, GrammarError> {
        let mut items = Vec::new();
        loop {
            if nested {
                self.skip_newlines();
            }
            match self.peek() {
                None
                | Some(Token::Newline)
                | Some(Token::Pipe)
                | Some(Token::ParenClose)
                | Some(Token::BracketClose) => break,
                Some(_) => items.push(self.item()?),
            }
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            RawExpr::Sequence(items)
        })
    }

    fn item(&mut self) -> Result<RawExpr, GrammarError> {
        let atom = self.atom()?;
        let expr = match self.peek() {
            Some(Token::Question) => RawExpr::Optional(Box::new(atom)),
            Some(Token::Star) => RawExpr::Repeat {
                expr: Box::new(atom),
                min: 0,
            },
            Some(Token::Plus) => RawExpr::Repeat {
                expr: Box::new(atom),
                min: 1,
            },
            _ => return Ok(atom),
        };
        self.pos += 1;
        Ok(expr)
    }

    fn atom(&mut self) -> Result<RawExpr, GrammarError> {
        match self.next() {
            Some(Token::Name(name)) => Ok(RawExpr::Reference(name.to_string())),
            Some(Token::Literal(raw)) => Ok(literal(raw)),
            Some(Token::Pattern(raw)) => Ok(pattern(raw)),
            Some(Token::ParenOpen) => {
                let inner = self.alternation(true)?;
                self.expect(Token::ParenClose, "expected ')'")?;
                Ok(inner)
            }
            Some(Token::BracketOpen) => {
                let inner = self.alternation(true)?;
                self.expect(Token::BracketClose, "expected ']'")?;
                Ok(RawExpr::Optional(Box::new(inner)))
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error("expected a name, literal, pattern or group"))
            }
        }
    }

    /// A rule continues past a line break when the next non-empty line
    /// starts with `|`.
    fn continues_on_next_line(&self) -> bool {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .find(|spanned| spanned.token != Token::Newline)
            .is_some_and(|spanned| spanned.token == Token::Pipe)
    }

    fn skip_newlines(&mut self) {
        while self.peek() == Some(&Token::Newline) {
            self.pos += 1;
        }
    }

    fn expect(
        &mut self,
        token: Token<'src>,
        message: impl Into<String>,
    ) -> Result<(), GrammarError> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|spanned| &spanned.token)
    }

    fn next(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.pos).map(|spanned| spanned.token.clone());
        self.pos += 1;
        token
    }

    fn error(&self, message: impl Into<String>) -> GrammarError {
        let offset = self
            .tokens
            .get(self.pos)
            .map(|spanned| spanned.span.start)
            .unwrap_or(self.source_len);
        GrammarError::Syntax {
            offset,
            message: message.into(),
        }
    }
}

fn literal(raw: &str) -> RawExpr {
    let case_insensitive = raw.ends_with('i');
    let quoted = if case_insensitive {
        &raw[..raw.len() - 1]
    } else {
        raw
    };
    RawExpr::Literal {
        text: unescape(&quoted[1..quoted.len() - 1]),
        case_insensitive,
    }
}

fn pattern(raw: &str) -> RawExpr {
    // The lexer guarantees the shape `/body/flags`.
    let close = raw.rfind('/').unwrap_or(raw.len());
    RawExpr::Pattern {
        source: raw[1..close].replace("\\/", "/"),
        flags: raw[close + 1..].to_string(),
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::lexer::lex;
    use super::*;

    fn rules(source: &str) -> Vec<RawRule> {
        let tokens = lex(source).unwrap();
        parse_rules(&tokens, source.len()).unwrap()
    }

    fn reference(name: &str) -> RawExpr {
        RawExpr::Reference(name.to_string())
    }

    #[test]
    fn test_alternatives_continue_across_lines() {
        let parsed = rules("verb: \"pay\"\n    | \"deliver\"\n    | \"charge\"\nnext: verb");
        assert_eq!(parsed.len(), 2);
        match &parsed[0].expr {
            RawExpr::Choice(branches) => assert_eq!(branches.len(), 3),
            other => panic!("expected choice, got {:?}", other),
        }
        assert_eq!(parsed[1].expr, reference("verb"));
    }

    #[test]
    fn test_postfix_and_groups() {
        let parsed = rules("subject: (WORD \",\")* [\"the\"] WORD+");
        match &parsed[0].expr {
            RawExpr::Sequence(items) => {
                assert!(matches!(items[0], RawExpr::Repeat { min: 0, .. }));
                assert!(matches!(items[1], RawExpr::Optional(_)));
                assert!(matches!(items[2], RawExpr::Repeat { min: 1, .. }));
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_marker_and_escapes() {
        let parsed = rules("?quote: \"say \\\"hi\\\"\"i");
        assert_eq!(parsed[0].name, "quote");
        assert_eq!(
            parsed[0].expr,
            RawExpr::Literal {
                text: "say \"hi\"".to_string(),
                case_insensitive: true,
            }
        );
    }

    #[test]
    fn test_pattern_slash_escape() {
        let parsed = rules(r"DATE: /[0-9]+\/[0-9]+/");
        assert_eq!(
            parsed[0].expr,
            RawExpr::Pattern {
                source: "[0-9]+/[0-9]+".to_string(),
                flags: String::new(),
            }
        );
    }

    #[test]
    fn test_missing_colon_is_syntax_error() {
        let source = "subject WORD";
        let tokens = lex(source).unwrap();
        let err = parse_rules(&tokens, source.len()).unwrap_err();
        assert!(matches!(err, GrammarError::Syntax { offset: 8, .. }));
    }

    #[test]
    fn test_unclosed_group() {
        let source = "subject: (WORD";
        let tokens = lex(source).unwrap();
        assert!(parse_rules(&tokens, source.len()).is_err());
    }
}
