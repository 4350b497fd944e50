//! Line parsers using chumsky over the logos token stream
//!
//! Each body line of a Layout or Relate section, and every candidate section
//! header, is parsed on its own. Spans are relative to the start of the line.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::describe_rich;
use crate::parser::ast::{Address, EdgeLabels, LayoutRef, LayoutRow, RelateRecord};
use crate::parser::lexer::{lex, Span, Token};

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn scope<'a, I>() -> impl Parser<'a, I, String, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! { Token::Scope(s) => s }.labelled("scope")
}

fn alias<'a, I>() -> impl Parser<'a, I, String, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    select! { Token::Alias(s) => s }.labelled("alias")
}

/// `[A.B]`, `{X}` or `{X}.[A.B]`
fn address<'a, I>() -> impl Parser<'a, I, Address, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let alias_path = alias()
        .then(
            just(Token::Dot)
                .ignore_then(scope())
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(name, scopes)| {
            let path = scopes
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(".");
            if path.is_empty() {
                Address::Alias(name)
            } else {
                Address::AliasPath(name, path)
            }
        });

    choice((alias_path, scope().map(|s| Address::path(&s))))
}

/// Header of a reference section: an address followed by a colon, nothing else
fn reference_header<'a, I>() -> impl Parser<'a, I, Address, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    address().then_ignore(just(Token::Colon)).then_ignore(end())
}

type RelateParts = ((Vec<Address>, Span), (Vec<Address>, Vec<Token>));

fn relate_line<'a, I>() -> impl Parser<'a, I, RelateParts, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let terms = address()
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>();

    // Everything up to the first scope or alias is the arrow
    let connector = any()
        .filter(|t: &Token| !matches!(t, Token::Scope(_) | Token::Alias(_)))
        .repeated()
        .at_least(1)
        .map_with(|_, e| span_range(&e.span()))
        .labelled("arrow");

    let tail = any().repeated().collect::<Vec<Token>>();

    terms
        .clone()
        .then(connector)
        .then(terms.then(tail))
        .then_ignore(end())
}

fn layout_part<'a, I>() -> impl Parser<'a, I, Vec<LayoutRef>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let words = select! { Token::Text(s) => s }
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .map(|w| w.join(" "));

    let entry = choice((
        alias()
            .then(choice((scope(), words)))
            .map(|(a, label)| LayoutRef::aliased(label, a)),
        scope().map(LayoutRef::new),
        alias().map(LayoutRef::alias_only),
    ));

    // Reading stops at the first token that is not an entry
    entry
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(any().repeated())
        .then_ignore(end())
}

/// Parse a section header of the form `[A.B]:`, `{X}:` or `{X}.[Y]:`.
///
/// Relation lines that end in `":` are rejected here because they carry an
/// arrow and labels after the first address.
pub fn parse_reference(line: &str) -> Option<Address> {
    let len = line.len();
    let token_iter = lex(line).map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    reference_header().parse(token_stream).into_result().ok()
}

/// Parse one Relate body line
pub fn parse_relate(line: &str) -> Result<RelateRecord, String> {
    let len = line.len();
    let token_iter = lex(line).map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    let ((start, arrow_span), (end, tail)) = relate_line()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.first()
                .map(describe_rich)
                .unwrap_or_else(|| "unreadable relation".to_string())
        })?;

    let arrow: String = line[arrow_span].split_whitespace().collect();
    let labels = edge_labels(&tail);

    Ok(RelateRecord {
        start,
        arrow,
        end,
        labels,
        span: Some(0..len),
    })
}

/// Parse one Layout body line: left entries, then right entries after `...`
pub fn parse_layout(line: &str) -> LayoutRow {
    let (left, right) = match line.split_once("...") {
        Some((l, r)) => (l, Some(r)),
        None => (line, None),
    };

    LayoutRow {
        left: layout_entries(left),
        right: right.map(layout_entries).unwrap_or_default(),
    }
}

fn layout_entries(part: &str) -> Vec<LayoutRef> {
    let len = part.len();
    let token_iter = lex(part).map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    layout_part()
        .parse(token_stream)
        .into_result()
        .unwrap_or_default()
}

/// Match the tokens after the end terms against the label patterns.
/// The first matching pattern wins; anything else yields no labels.
fn edge_labels(tail: &[Token]) -> EdgeLabels {
    use Token::{Colon, Quoted};

    let text = |s: &String| Some(s.clone());
    let (start, middle, end) = match tail {
        [Quoted(a), Colon, Quoted(b), Colon, Quoted(c)] => (text(a), text(b), text(c)),
        [Quoted(a), Colon, Colon, Quoted(c)] => (text(a), None, text(c)),
        [Quoted(a), Colon, Quoted(b)] => (text(a), text(b), None),
        [Colon, Quoted(b), Colon, Quoted(c)] => (None, text(b), text(c)),
        [Colon, Quoted(b), Colon] => (None, text(b), None),
        [Quoted(a), Colon, Quoted(b), Colon] => (text(a), text(b), None),
        [Quoted(a), Colon] | [Quoted(a), Colon, Colon] => (text(a), None, None),
        [Colon, Colon, Quoted(c)] | [Colon, Quoted(c)] => (None, None, text(c)),
        [Quoted(b)] => (None, text(b), None),
        [] => (None, None, None),
        other => {
            log::debug!(tokens = other.len(); "Relation labels match no pattern, ignoring them");
            (None, None, None)
        }
    };

    EdgeLabels { start, middle, end }
}
