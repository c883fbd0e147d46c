//! Lexer for Liquid output markup using logos

use logos::Logos;
use serde::Serialize;

/// Token types for the markup between `{{` and `}}`
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'src> {
    // Keywords
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,
    #[token("null")]
    Null,
    #[token("empty")]
    Empty,
    #[token("blank")]
    Blank,

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*\??", |lex| lex.slice())]
    Ident(&'src str),

    // Literals
    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len()-1]
    })]
    String(&'src str),

    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len()-1]
    })]
    SingleQuoteString(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    // Operators are only lexed so the parser can reject them by name.
    #[regex(r"==|!=|<>|<=|>=|<|>", |lex| lex.slice())]
    Comparison(&'src str),

    // Punctuation
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("|")]
    Pipe,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
}

/// Span information for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub span: TokenSpan,
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub span: TokenSpan,
    pub message: String,
}

/// Lex markup into tokens with spans
pub fn lex(source: &str) -> impl Iterator<Item = Result<SpannedToken<'_>, LexError>> + '_ {
    Token::lexer(source).spanned().map(|(result, span)| {
        let span = TokenSpan {
            start: span.start,
            end: span.end,
        };
        match result {
            Ok(token) => Ok(SpannedToken { token, span }),
            Err(_) => Err(LexError {
                span,
                message: "Unexpected character".to_string(),
            }),
        }
    })
}
