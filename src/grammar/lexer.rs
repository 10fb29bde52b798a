//! Lexer for grammar files (.lark)
//!
//! Uses Logos for tokenization. Newlines are significant: a rule ends at the
//! end of its line unless the next line continues it with `|`.

use logos::{Logos, Span};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token<'src> {
    // Comments, `%import`/`%ignore` directives, `-> alias` and `.priority`
    // markers carry nothing the validator needs.
    #[regex(r"//[^\n]*", logos::skip, allow_greedy = true)]
    #[regex(r"%[^\n]*", logos::skip, allow_greedy = true)]
    #[regex(r"->[ \t]*[A-Za-z_][A-Za-z0-9_]*", logos::skip)]
    #[regex(r"\.[0-9]+", logos::skip)]
    Ignored,

    /// Rule or terminal name
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Name(&'src str),

    /// String literal, quotes included, optionally followed by `i`
    #[regex(r#""([^"\\]|\\.)*"i?"#, |lex| lex.slice())]
    Literal(&'src str),

    /// Regex literal, slashes included, optionally followed by flags
    #[regex(r"/(\\/|[^/\n])+/[imsx]*", |lex| lex.slice())]
    Pattern(&'src str),

    #[token(":")]
    Colon,
    #[token("|")]
    Pipe,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("?")]
    Question,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("!")]
    Bang,
    #[token("\n")]
    Newline,
}

/// A token with its source span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub token: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(token: T, span: Span) -> Self {
        Self { token, span }
    }
}

/// Tokenize a grammar file into a vector of spanned tokens
pub fn lex(source: &str) -> Result<Vec<Spanned<Token<'_>>>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Ignored) => {}
            Ok(token) => tokens.push(Spanned::new(token, lexer.span())),
            Err(()) => {
                return Err(LexError {
                    span: lexer.span(),
                    slice: lexer.slice().to_string(),
                });
            }
        }
    }

    Ok(tokens)
}

/// Error during lexing
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Span,
    pub slice: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unexpected character(s) '{}' at {:?}",
            self.slice, self.span
        )
    }
}

impl std::error::Error for LexError {}
