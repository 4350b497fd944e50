//! Diagnostics accumulated while parsing, laying out and routing

use ariadne::{Color, Label, Report, ReportKind, Source};
use chumsky::error::{Rich, RichPattern, RichReason};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found in a diagram. Never fatal: the pipeline keeps going with a
/// best-effort result and reports these alongside it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error("scope '{scope}' has neither a Define nor a Layout section")]
    MissingSection { scope: String, span: Option<Span> },

    #[error("alias '{{{alias}}}' does not match any layout entry")]
    UnresolvedAlias { alias: String, span: Option<Span> },

    #[error("cannot read {section} line '{line}': {reason}")]
    MalformedLine {
        section: String,
        line: String,
        reason: String,
        span: Option<Span>,
    },

    #[error("relation endpoint {address} in scope '{scope}' does not match any node")]
    UnresolvedAddress { address: String, scope: String },

    #[error("no route from '{from}' to '{to}' avoids every other scope")]
    UnroutableConnector { from: String, to: String },

    #[error("'{from}' and '{to}' overlap, so they cannot be connected")]
    OverlappingEndpoints { from: String, to: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::MissingSection { .. }
            | Diagnostic::UnresolvedAlias { .. }
            | Diagnostic::MalformedLine { .. } => Severity::Error,
            Diagnostic::UnresolvedAddress { .. }
            | Diagnostic::UnroutableConnector { .. }
            | Diagnostic::OverlappingEndpoints { .. } => Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Diagnostic::MissingSection { span, .. }
            | Diagnostic::UnresolvedAlias { span, .. }
            | Diagnostic::MalformedLine { span, .. } => span.clone(),
            _ => None,
        }
    }

    /// Prepend an ancestor label to the scope chain of a missing-section error
    pub(crate) fn within(self, ancestor: &str) -> Self {
        match self {
            Diagnostic::MissingSection { scope, span } if !ancestor.is_empty() => {
                Diagnostic::MissingSection {
                    scope: format!("{}.{}", ancestor, scope),
                    span,
                }
            }
            other => other,
        }
    }

    /// Format the diagnostic with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return format!("{}: {}", self.kind_label(), self);
        };

        let kind = match self.severity() {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let color = match self.severity() {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let mut buf = Vec::new();
        let written = Report::build(kind, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(self.short_label())
                    .with_color(color),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("{}: {}", self.kind_label(), self),
        }
    }

    fn kind_label(&self) -> &'static str {
        match self.severity() {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    fn short_label(&self) -> &'static str {
        match self {
            Diagnostic::MissingSection { .. } => "add a Define: or Layout: section",
            Diagnostic::UnresolvedAlias { .. } => "unknown alias",
            Diagnostic::MalformedLine { .. } => "skipped",
            Diagnostic::UnresolvedAddress { .. } => "unknown endpoint",
            Diagnostic::UnroutableConnector { .. } => "drawn straight",
            Diagnostic::OverlappingEndpoints { .. } => "dropped",
        }
    }
}

/// Human-readable reason for a grammar failure on one line
pub(crate) fn describe_rich(err: &Rich<'_, Token>) -> String {
    let message = match err.reason() {
        RichReason::ExpectedFound { found, .. } => match found {
            Some(tok) => format!("unexpected {}", format_token(tok)),
            None => "unexpected end of line".to_string(),
        },
        RichReason::Custom(msg) => msg.to_string(),
    };

    let expected: Vec<String> = err
        .expected()
        .filter_map(|e| match e {
            RichPattern::Token(tok) => Some(format_token(tok)),
            RichPattern::Label(label) => Some(label.to_string()),
            RichPattern::EndOfInput => Some("end of line".to_string()),
            _ => None,
        })
        .collect();

    if expected.is_empty() {
        message
    } else {
        format!("{} (expected {})", message, expected.join(", "))
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Scope(s) => format!("scope '[{}]'", s),
        Token::Alias(s) => format!("alias '{{{}}}'", s),
        Token::Quoted(s) => format!("label \"{}\"", s),
        Token::Ellipsis => "'...'".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Pipe => "'|'".to_string(),
        Token::Text(s) => format!("'{}'", s),
    }
}
