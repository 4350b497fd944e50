//! Lexer for single lines of the diagram language using logos
//!
//! The language is line oriented, so the lexer never sees a newline. Anything
//! that is not a scope, alias, quoted string or punctuation becomes `Text`,
//! which keeps arrow glyphs (`-`, `=`, `>`, `D`, `o`, ...) lexable without a
//! dedicated token per glyph.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
pub enum Token {
    /// `[Label]` or `[A.B.C]`, contents without the brackets
    #[regex(r"\[[^\]\n]*\]", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].trim().to_string()
    })]
    Scope(String),

    /// `{Alias}`, contents without the braces
    #[regex(r"\{[^}\n]*\}", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].trim().to_string()
    })]
    Alias(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].replace("\\\"", "\"")
    })]
    Quoted(String),

    // Delimiters (longer patterns first)
    #[token("...")]
    Ellipsis,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("|")]
    Pipe,

    /// Free text: words, arrow glyphs, anything else
    #[regex(r#"[^\[\]{}",:.|\s]+"#, |lex| lex.slice().to_string())]
    Text(String),
}

/// Lex a line into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
