//! Grammar validator
//!
//! Loads a Lark-style context-free grammar and answers one question:
//! does `text` derive from rule `name`? Terminals of the document model
//! share a single `Grammar` and call [`Grammar::parse`] to validate input.
//!
//! Matching is scannerless. Whitespace is skipped before every literal and
//! pattern, and a match ending in a word character may not be directly
//! followed by another word character, so `"on"` never matches the front of
//! `"only"`. Every expression yields the full set of positions it can end
//! at, which makes ambiguous alternatives backtrack the way a CFG parser
//! would, and left-recursive rules are evaluated to a fixpoint.

mod lexer;
mod syntax;

use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use syntax::{RawExpr, RawRule};
use thiserror::Error;

pub use lexer::LexError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    #[error("failed to tokenize grammar: {0}")]
    Lex(#[from] LexError),

    #[error("grammar syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("rule '{0}' is defined more than once")]
    DuplicateRule(String),

    #[error("rule '{rule}' references undefined rule '{reference}'")]
    UndefinedRule { rule: String, reference: String },

    #[error("invalid pattern in rule '{rule}': {message}")]
    Pattern { rule: String, message: String },

    #[error("grammar defines no rules")]
    Empty,
}

/// Resolved expression: references are indices into `Grammar::rules`
#[derive(Debug, Clone)]
enum Expr {
    Literal { text: String, case_insensitive: bool },
    Pattern(Regex),
    Rule(usize),
    Sequence(Vec<Expr>),
    Choice(Vec<Expr>),
    Optional(Box<Expr>),
    Repeat { expr: Box<Expr>, min: usize },
}

#[derive(Debug, Clone)]
struct Rule {
    name: String,
    expr: Expr,
}

/// An immutable, loaded grammar
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl Grammar {
    /// Load a grammar from its source text
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        let tokens = lexer::lex(source)?;
        let raw_rules = syntax::parse_rules(&tokens, source.len())?;
        if raw_rules.is_empty() {
            return Err(GrammarError::Empty);
        }

        let mut index = HashMap::with_capacity(raw_rules.len());
        for (i, rule) in raw_rules.iter().enumerate() {
            if index.insert(rule.name.clone(), i).is_some() {
                return Err(GrammarError::DuplicateRule(rule.name.clone()));
            }
        }

        let rules = raw_rules
            .into_iter()
            .map(|RawRule { name, expr }| {
                let expr = resolve(&name, expr, &index)?;
                Ok(Rule { name, expr })
            })
            .collect::<Result<Vec<_>, GrammarError>>()?;

        tracing::debug!("Loaded grammar with {} rules", rules.len());
        Ok(Self { rules, index })
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Whether `text` is a complete derivation of rule `rule`.
    ///
    /// Unknown rule names are never valid. Leading and trailing whitespace
    /// is ignored.
    pub fn parse(&self, rule: &str, text: &str) -> bool {
        let Some(&start) = self.index.get(rule) else {
            return false;
        };
        let mut matcher = Matcher {
            grammar: self,
            text,
            memo: HashMap::new(),
            visited: HashSet::new(),
            grew: false,
        };
        matcher
            .run(start)
            .into_iter()
            .any(|end| text[end..].trim().is_empty())
    }
}

fn resolve(rule: &str, expr: RawExpr, index: &HashMap<String, usize>) -> Result<Expr, GrammarError> {
    let resolve_all = |items: Vec<RawExpr>| {
        items
            .into_iter()
            .map(|item| resolve(rule, item, index))
            .collect::<Result<Vec<_>, _>>()
    };

    Ok(match expr {
        RawExpr::Literal {
            text,
            case_insensitive,
        } => Expr::Literal {
            text,
            case_insensitive,
        },
        RawExpr::Pattern { source, flags } => {
            let anchored = if flags.is_empty() {
                format!("^(?:{})$", source)
            } else {
                format!("^(?{}:{})$", flags, source)
            };
            let regex = Regex::new(&anchored).map_err(|e| GrammarError::Pattern {
                rule: rule.to_string(),
                message: e.to_string(),
            })?;
            Expr::Pattern(regex)
        }
        RawExpr::Reference(name) => match index.get(&name) {
            Some(&i) => Expr::Rule(i),
            None => {
                return Err(GrammarError::UndefinedRule {
                    rule: rule.to_string(),
                    reference: name,
                })
            }
        },
        RawExpr::Sequence(items) => Expr::Sequence(resolve_all(items)?),
        RawExpr::Choice(items) => Expr::Choice(resolve_all(items)?),
        RawExpr::Optional(inner) => Expr::Optional(Box::new(resolve(rule, *inner, index)?)),
        RawExpr::Repeat { expr, min } => Expr::Repeat {
            expr: Box::new(resolve(rule, *expr, index)?),
            min,
        },
    })
}

type Positions = BTreeSet<usize>;

/// Per-call matching state.
///
/// `memo` holds the best known end positions for each (rule, position)
/// pair. A pass evaluates every pair at most once, reading the current
/// approximation on re-entry, and passes repeat until nothing grows. Sets
/// only ever grow, so this reaches the least fixpoint, which is also what
/// makes left-recursive rules work.
struct Matcher<'g, 't> {
    grammar: &'g Grammar,
    text: &'t str,
    memo: HashMap<(usize, usize), Positions>,
    visited: HashSet<(usize, usize)>,
    grew: bool,
}

impl Matcher<'_, '_> {
    fn run(&mut self, start: usize) -> Positions {
        loop {
            self.visited.clear();
            self.grew = false;
            let ends = self.rule(start, 0);
            if !self.grew {
                return ends;
            }
        }
    }

    fn rule(&mut self, rule: usize, pos: usize) -> Positions {
        let key = (rule, pos);
        if !self.visited.insert(key) {
            return self.memo.get(&key).cloned().unwrap_or_default();
        }
        let grammar = self.grammar;
        let ends = self.expr(&grammar.rules[rule].expr, pos);
        let known = self.memo.entry(key).or_default();
        let before = known.len();
        known.extend(ends);
        if known.len() != before {
            self.grew = true;
        }
        known.clone()
    }

    fn expr(&mut self, expr: &Expr, pos: usize) -> Positions {
        match expr {
            Expr::Literal {
                text,
                case_insensitive,
            } => self.literal(text, *case_insensitive, pos),
            Expr::Pattern(regex) => self.pattern(regex, pos),
            Expr::Rule(rule) => self.rule(*rule, pos),
            Expr::Sequence(items) => {
                let mut current = Positions::from([pos]);
                for item in items {
                    current = current
                        .into_iter()
                        .flat_map(|p| self.expr(item, p))
                        .collect();
                    if current.is_empty() {
                        break;
                    }
                }
                current
            }
            Expr::Choice(branches) => branches
                .iter()
                .flat_map(|branch| self.expr(branch, pos))
                .collect(),
            Expr::Optional(inner) => {
                let mut ends = self.expr(inner, pos);
                ends.insert(pos);
                ends
            }
            Expr::Repeat { expr, min } => {
                let start = if *min == 0 {
                    Positions::from([pos])
                } else {
                    self.expr(expr, pos)
                };
                self.closure(expr, start)
            }
        }
    }

    /// All positions reachable from `start` by zero or more further matches
    fn closure(&mut self, expr: &Expr, start: Positions) -> Positions {
        let mut reached = start.clone();
        let mut work: Vec<usize> = start.into_iter().collect();
        while let Some(p) = work.pop() {
            for end in self.expr(expr, p) {
                if reached.insert(end) {
                    work.push(end);
                }
            }
        }
        reached
    }

    fn literal(&self, literal: &str, case_insensitive: bool, pos: usize) -> Positions {
        let start = skip_whitespace(self.text, pos);
        let end = start + literal.len();
        let Some(candidate) = self.text.get(start..end) else {
            return Positions::new();
        };
        let matched = if case_insensitive {
            candidate.eq_ignore_ascii_case(literal)
        } else {
            candidate == literal
        };
        if matched && self.at_token_boundary(start, end) {
            Positions::from([end])
        } else {
            Positions::new()
        }
    }

    /// Every length the pattern matches in full, not only the longest
    fn pattern(&self, regex: &Regex, pos: usize) -> Positions {
        let start = skip_whitespace(self.text, pos);
        let rest = &self.text[start..];
        rest.char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(rest.len()))
            .filter(|&len| regex.is_match(&rest[..len]))
            .map(|len| start + len)
            .filter(|&end| self.at_token_boundary(start, end))
            .collect()
    }

    fn at_token_boundary(&self, start: usize, end: usize) -> bool {
        let last = self.text[start..end].chars().next_back();
        let next = self.text[end..].chars().next();
        match (last, next) {
            (Some(a), Some(b)) => !(is_word_char(a) && is_word_char(b)),
            _ => true,
        }
    }
}

fn skip_whitespace(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
