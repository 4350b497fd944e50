//! Text measurement and label wrapping

use super::config::{Font, LayoutConfig};

/// Rendered width of a string. Implementations must be deterministic and
/// free of side effects: layout decisions depend on repeatable answers.
pub trait TextMeasurer {
    fn text_width(&self, font: &Font, text: &str) -> f64;
}

/// Width estimate from per-character advances, used when no real font
/// metrics are available
#[derive(Debug, Clone, Copy, Default)]
pub struct CharWidthMeasurer;

impl TextMeasurer for CharWidthMeasurer {
    fn text_width(&self, font: &Font, text: &str) -> f64 {
        text.chars()
            .map(|c| match c {
                'i' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.3,
                ' ' => 0.35,
                'm' | 'w' | 'M' | 'W' => 0.85,
                _ => 0.55,
            })
            .sum::<f64>()
            * font.size
    }
}

impl<F> TextMeasurer for F
where
    F: Fn(&Font, &str) -> f64,
{
    fn text_width(&self, font: &Font, text: &str) -> f64 {
        self(font, text)
    }
}

/// Lines of text with their measured extent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextBlock {
    pub lines: Vec<String>,
    /// Horizontal rules, as indices of the line they follow
    pub rules: Vec<usize>,
    pub width: f64,
    pub height: f64,
}

impl TextBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn ratio(&self) -> f64 {
        if self.height <= 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }
}

/// Measure a block of lines as given
pub fn measure_lines(
    lines: Vec<String>,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
) -> TextBlock {
    let width = lines
        .iter()
        .map(|l| measurer.text_width(&config.font, l))
        .fold(0.0, f64::max);
    let height = lines.len() as f64 * config.line_height;
    TextBlock {
        lines,
        rules: Vec::new(),
        width,
        height,
    }
}

/// A label on one line, sized to its exact width
pub fn single_line(text: &str, measurer: &dyn TextMeasurer, config: &LayoutConfig) -> TextBlock {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let width = measurer.text_width(&config.font, &text);
    TextBlock {
        lines: vec![text],
        rules: Vec::new(),
        width,
        height: config.line_height,
    }
}

/// Wrap a label towards the configured golden ratio.
///
/// Candidates put one, two, three ... words on each line. Starting from one
/// word per line, a wider candidate replaces the current best while the best
/// is still narrower than `min_label_ratio`, or while it moves closer to
/// `golden_ratio`. The first candidate that does neither ends the search.
pub fn wrap_golden(text: &str, measurer: &dyn TextMeasurer, config: &LayoutConfig) -> TextBlock {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return TextBlock {
            lines: vec![String::new()],
            rules: Vec::new(),
            width: 0.0,
            height: config.line_height,
        };
    }

    let candidate = |per_line: usize| {
        let lines = words.chunks(per_line).map(|chunk| chunk.join(" ")).collect();
        measure_lines(lines, measurer, config)
    };

    let mut best = candidate(1);
    for per_line in 2..=words.len() {
        let next = candidate(per_line);
        let closer = (next.ratio() - config.golden_ratio).abs()
            < (best.ratio() - config.golden_ratio).abs();
        if best.ratio() < config.min_label_ratio || closer {
            best = next;
        } else {
            break;
        }
    }
    best
}
