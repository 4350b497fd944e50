//! Arrow tokens: splitting into line body and heads, and decoding glyphs

/// Characters that form the line body of an arrow token
const BODY_CHARS: [char; 3] = ['-', '=', '*'];

/// Line dash pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Arrowhead and cardinality glyphs, in right-pointing form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowHead {
    /// `>`
    Arrow,
    /// `D`
    Triangle,
    /// `o`
    Circle,
    /// `+`
    Cross,
    /// `0`
    Zero,
    /// `1`
    One,
    /// `N`
    Many,
    /// `01`
    ZeroOrOne,
    /// `11`
    OnlyOne,
    /// `0N`
    ZeroOrMany,
    /// `1N`
    OneOrMany,
}

impl ArrowHead {
    pub const ALL: [ArrowHead; 11] = [
        ArrowHead::Arrow,
        ArrowHead::Triangle,
        ArrowHead::Circle,
        ArrowHead::Cross,
        ArrowHead::Zero,
        ArrowHead::One,
        ArrowHead::Many,
        ArrowHead::ZeroOrOne,
        ArrowHead::OnlyOne,
        ArrowHead::ZeroOrMany,
        ArrowHead::OneOrMany,
    ];

    /// Decode head glyphs (without the body character)
    pub fn from_glyphs(glyphs: &str) -> Option<Self> {
        Some(match glyphs {
            ">" => ArrowHead::Arrow,
            "D" => ArrowHead::Triangle,
            "o" => ArrowHead::Circle,
            "+" => ArrowHead::Cross,
            "0" => ArrowHead::Zero,
            "1" => ArrowHead::One,
            "N" => ArrowHead::Many,
            "01" => ArrowHead::ZeroOrOne,
            "11" => ArrowHead::OnlyOne,
            "0N" => ArrowHead::ZeroOrMany,
            "1N" => ArrowHead::OneOrMany,
            _ => return None,
        })
    }

    /// Stable name used for SVG marker ids
    pub fn name(&self) -> &'static str {
        match self {
            ArrowHead::Arrow => "arrow",
            ArrowHead::Triangle => "triangle",
            ArrowHead::Circle => "circle",
            ArrowHead::Cross => "cross",
            ArrowHead::Zero => "zero",
            ArrowHead::One => "one",
            ArrowHead::Many => "many",
            ArrowHead::ZeroOrOne => "zero-or-one",
            ArrowHead::OnlyOne => "only-one",
            ArrowHead::ZeroOrMany => "zero-or-many",
            ArrowHead::OneOrMany => "one-or-many",
        }
    }
}

/// Split an arrow token into `(start head, line body, end head)`.
///
/// Heads keep one body character in front and are normalized to the
/// right-pointing form, so `->` gives `(None, "-", Some("->"))` and `<-`
/// gives `(Some("->"), "-", None)`.
pub fn split_arrow(token: &str) -> (Option<String>, String, Option<String>) {
    let token = token.trim();
    let (Some(first), Some(last)) = (
        token.find(|c: char| BODY_CHARS.contains(&c)),
        token.rfind(|c: char| BODY_CHARS.contains(&c)),
    ) else {
        return (None, token.to_string(), None);
    };

    let body = &token[first..=last];
    let prefix = &token[..first];
    let suffix = &token[last + 1..];
    let body_char = &token[first..first + 1];
    let last_char = &token[last..last + 1];

    let start = (!prefix.is_empty()).then(|| format!("{}{}", body_char, mirror(prefix)));
    let end = (!suffix.is_empty()).then(|| format!("{}{}", last_char, suffix));
    (start, body.to_string(), end)
}

/// Reverse head glyphs and flip their direction
fn mirror(glyphs: &str) -> String {
    glyphs
        .chars()
        .rev()
        .map(|c| match c {
            '<' => '>',
            '>' => '<',
            other => other,
        })
        .collect()
}

/// Decoded arrow: line style and optional heads at each end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrowSpec {
    pub start: Option<ArrowHead>,
    pub end: Option<ArrowHead>,
    pub style: LineStyle,
    pub bold: bool,
}

impl ArrowSpec {
    pub fn parse(token: &str) -> Self {
        let (start, body, end) = split_arrow(token);
        let head = |h: Option<String>| {
            h.and_then(|s| {
                let glyphs = s.trim_start_matches(|c: char| BODY_CHARS.contains(&c));
                let decoded = ArrowHead::from_glyphs(glyphs);
                if decoded.is_none() {
                    log::debug!(glyphs; "Unknown arrowhead glyphs, drawing a plain end");
                }
                decoded
            })
        };

        let dotted = body.contains('*');
        let bold = body.contains('=');
        let style = if dotted {
            LineStyle::Dotted
        } else if body.chars().count() >= 2 {
            LineStyle::Dashed
        } else {
            LineStyle::Solid
        };

        Self {
            start: head(start),
            end: head(end),
            style,
            bold,
        }
    }
}
