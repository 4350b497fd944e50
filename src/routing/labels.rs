//! Placing start, middle and end labels along a routed connector

use crate::geometry::{Line, Point, EPSILON};
use crate::layout::{Font, TextMeasurer};
use crate::parser::EdgeLabels;

use super::RoutingConfig;

/// Horizontal alignment of a label relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSlot {
    Start,
    Middle,
    End,
}

/// A positioned label. `position.y` is the vertical centre of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub text: String,
    pub position: Point,
    pub anchor: TextAnchor,
    pub slot: LabelSlot,
}

/// Everything label placement needs to know about text and arrowheads
pub struct LabelPlacer<'a> {
    pub measurer: &'a dyn TextMeasurer,
    pub font: &'a Font,
    pub line_height: f64,
    pub config: &'a RoutingConfig,
}

impl LabelPlacer<'_> {
    /// Place each present label along the drawn points of a connector
    pub fn place(
        &self,
        points: &[Point],
        labels: &EdgeLabels,
        start_head: bool,
        end_head: bool,
    ) -> Vec<LabelLayout> {
        if labels.is_empty() || points.len() < 2 {
            return Vec::new();
        }
        let last = points.len() - 2;
        let longest = (0..=last)
            .max_by(|&a, &b| {
                let la = points[a].distance(points[a + 1]);
                let lb = points[b].distance(points[b + 1]);
                la.total_cmp(&lb).then(b.cmp(&a))
            })
            .unwrap_or(0);

        let segment = |i: usize| {
            let line = Line::new(points[i], points[i + 1]);
            self.usable(line, i == 0 && start_head, i == last && end_head)
        };

        let mut out = Vec::new();
        let slots = [
            (LabelSlot::Start, &labels.start, 0),
            (LabelSlot::Middle, &labels.middle, longest),
            (LabelSlot::End, &labels.end, last),
        ];
        for (slot, text, index) in slots {
            let Some(text) = text else { continue };
            let width = self.measurer.text_width(self.font, text);
            let (position, anchor) = match Orientation::of(&segment(index)) {
                Orientation::Vertical => self.vertical(&segment(index), slot),
                Orientation::Horizontal => {
                    let spare = self.spare_for_middle(&segment(index), labels, index, last);
                    self.horizontal(&segment(index), slot, width, spare)
                }
                Orientation::Diagonal => self.diagonal(&segment(index), slot),
            };
            out.push(LabelLayout {
                text: text.clone(),
                position,
                anchor,
                slot,
            });
        }
        out
    }

    /// The segment with room for the arrowheads taken off its ends
    fn usable(&self, line: Line, trim_start: bool, trim_end: bool) -> Line {
        let length = line.length();
        if length < EPSILON {
            return line;
        }
        let size = self.config.arrow_size.min(length / 3.0);
        let start = if trim_start {
            line.start.lerp(line.end, size / length)
        } else {
            line.start
        };
        let end = if trim_end {
            line.end.lerp(line.start, size / length)
        } else {
            line.end
        };
        Line::new(start, end)
    }

    fn half_height(&self) -> f64 {
        self.line_height / 2.0
    }

    /// Right of the line, just past the endpoint the label belongs to
    fn vertical(&self, line: &Line, slot: LabelSlot) -> (Point, TextAnchor) {
        let offset = self.config.label_offset;
        let down = if line.end.y >= line.start.y { 1.0 } else { -1.0 };
        let reach = offset + self.half_height();
        let y = match slot {
            LabelSlot::Start => line.start.y + down * reach,
            LabelSlot::Middle => line.midpoint().y,
            LabelSlot::End => line.end.y - down * reach,
        };
        (Point::new(line.start.x + offset, y), TextAnchor::Start)
    }

    /// Width along this segment left free by the start and end labels
    fn spare_for_middle(&self, line: &Line, labels: &EdgeLabels, index: usize, last: usize) -> f64 {
        let mut spare = line.length() - 2.0 * self.config.label_offset;
        if index == 0 {
            if let Some(text) = &labels.start {
                spare -= self.measurer.text_width(self.font, text) + self.config.label_offset;
            }
        }
        if index == last {
            if let Some(text) = &labels.end {
                spare -= self.measurer.text_width(self.font, text) + self.config.label_offset;
            }
        }
        spare
    }

    fn horizontal(&self, line: &Line, slot: LabelSlot, width: f64, spare: f64) -> (Point, TextAnchor) {
        let offset = self.config.label_offset;
        let rightward = line.end.x >= line.start.x;
        let above = line.start.y - offset - self.half_height();
        let below = line.start.y + offset + self.half_height();
        let (leading, trailing) = if rightward {
            (TextAnchor::Start, TextAnchor::End)
        } else {
            (TextAnchor::End, TextAnchor::Start)
        };
        let step = if rightward { offset } else { -offset };

        match slot {
            LabelSlot::Start => (Point::new(line.start.x + step, above), leading),
            LabelSlot::End => (Point::new(line.end.x - step, above), trailing),
            LabelSlot::Middle => {
                let mid = line.midpoint();
                if width <= spare {
                    (Point::new(mid.x, above), TextAnchor::Middle)
                } else if width <= line.length() - 2.0 * offset {
                    (Point::new(mid.x, below), TextAnchor::Middle)
                } else {
                    (Point::new(line.start.x + step, below), leading)
                }
            }
        }
    }

    /// Outside the turn: above-right of `\` lines, above-left of `/` lines
    fn diagonal(&self, line: &Line, slot: LabelSlot) -> (Point, TextAnchor) {
        let offset = self.config.label_offset;
        let t = match slot {
            LabelSlot::Start => 0.15,
            LabelSlot::Middle => 0.5,
            LabelSlot::End => 0.85,
        };
        let at = line.start.lerp(line.end, t);
        let dx = line.end.x - line.start.x;
        let dy = line.end.y - line.start.y;
        let y = at.y - offset - self.half_height();
        if dx * dy >= 0.0 {
            (Point::new(at.x + offset, y), TextAnchor::Start)
        } else {
            (Point::new(at.x - offset, y), TextAnchor::End)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Vertical,
    Horizontal,
    Diagonal,
}

impl Orientation {
    fn of(line: &Line) -> Self {
        if line.is_vertical() {
            Orientation::Vertical
        } else if line.is_horizontal() {
            Orientation::Horizontal
        } else {
            Orientation::Diagonal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CharWidthMeasurer;

    fn labels(start: Option<&str>, middle: Option<&str>, end: Option<&str>) -> EdgeLabels {
        EdgeLabels {
            start: start.map(String::from),
            middle: middle.map(String::from),
            end: end.map(String::from),
        }
    }

    fn place(points: &[Point], labels: &EdgeLabels, heads: (bool, bool)) -> Vec<LabelLayout> {
        place_with(&RoutingConfig::default(), points, labels, heads)
    }

    fn place_with(
        config: &RoutingConfig,
        points: &[Point],
        labels: &EdgeLabels,
        heads: (bool, bool),
    ) -> Vec<LabelLayout> {
        // Ten units per character keeps widths easy to reason about
        let measurer = |_: &Font, text: &str| text.chars().count() as f64 * 10.0;
        let font = Font::default();
        let placer = LabelPlacer {
            measurer: &measurer,
            font: &font,
            line_height: 16.0,
            config,
        };
        placer.place(points, labels, heads.0, heads.1)
    }

    #[test]
    fn test_no_labels_no_layouts() {
        let points = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert!(place(&points, &EdgeLabels::default(), (true, true)).is_empty());
    }

    #[test]
    fn test_horizontal_middle_above_when_it_fits() {
        let points = [Point::new(0.0, 50.0), Point::new(200.0, 50.0)];
        let placed = place(&points, &labels(None, Some("uses"), None), (false, true));
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].anchor, TextAnchor::Middle);
        assert_eq!(placed[0].slot, LabelSlot::Middle);
        // Head on the right trims the span to 0..192
        assert_eq!(placed[0].position, Point::new(96.0, 50.0 - 4.0 - 8.0));
    }

    #[test]
    fn test_offset_and_arrow_size_from_config() {
        let config = RoutingConfig::new().with_label_offset(10.0).with_arrow_size(20.0);
        let points = [Point::new(0.0, 50.0), Point::new(200.0, 50.0)];
        let placed = place_with(&config, &points, &labels(None, Some("uses"), None), (false, true));
        // Head on the right trims the span to 0..180
        assert_eq!(placed[0].position, Point::new(90.0, 50.0 - 10.0 - 8.0));
    }

    #[test]
    fn test_horizontal_middle_drops_below_when_crowded() {
        let points = [Point::new(0.0, 50.0), Point::new(120.0, 50.0)];
        let placed = place(&points, &labels(Some("aaaa"), Some("bbbb"), Some("cccc")), (false, false));
        let middle = placed.iter().find(|l| l.slot == LabelSlot::Middle).unwrap();
        assert!(middle.position.y > 50.0);
        let start = placed.iter().find(|l| l.slot == LabelSlot::Start).unwrap();
        assert_eq!(start.anchor, TextAnchor::Start);
        assert_eq!(start.position, Point::new(4.0, 38.0));
        let end = placed.iter().find(|l| l.slot == LabelSlot::End).unwrap();
        assert_eq!(end.anchor, TextAnchor::End);
        assert_eq!(end.position, Point::new(116.0, 38.0));
    }

    #[test]
    fn test_horizontal_middle_edge_anchored_when_too_long() {
        let points = [Point::new(100.0, 0.0), Point::new(40.0, 0.0)];
        let placed = place(&points, &labels(None, Some("far too long"), None), (false, false));
        assert_eq!(placed[0].anchor, TextAnchor::End);
        assert_eq!(placed[0].position, Point::new(96.0, 12.0));
    }

    #[test]
    fn test_vertical_labels_sit_right_of_line() {
        let points = [Point::new(10.0, 100.0), Point::new(10.0, 0.0)];
        let placed = place(&points, &labels(Some("s"), None, Some("e")), (true, true));
        assert!(placed.iter().all(|l| l.anchor == TextAnchor::Start));
        assert!(placed.iter().all(|l| l.position.x == 14.0));
        // Running upward: the start label sits above the trimmed start
        assert_eq!(placed[0].position.y, 100.0 - 8.0 - 12.0);
        assert_eq!(placed[1].position.y, 8.0 + 12.0);
    }

    #[test]
    fn test_diagonal_side_follows_slope() {
        let falling = [Point::new(0.0, 0.0), Point::new(100.0, 100.0)];
        let placed = place(&falling, &labels(None, Some("m"), None), (false, false));
        assert_eq!(placed[0].anchor, TextAnchor::Start);
        assert_eq!(placed[0].position, Point::new(54.0, 38.0));

        let rising = [Point::new(0.0, 100.0), Point::new(100.0, 0.0)];
        let placed = place(&rising, &labels(None, Some("m"), None), (false, false));
        assert_eq!(placed[0].anchor, TextAnchor::End);
        assert_eq!(placed[0].position, Point::new(46.0, 38.0));
    }

    #[test]
    fn test_middle_uses_longest_segment() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.0, -20.0),
            Point::new(300.0, -20.0),
            Point::new(300.0, 0.0),
        ];
        let measurer = CharWidthMeasurer;
        let font = Font::default();
        let config = RoutingConfig::default();
        let placer = LabelPlacer {
            measurer: &measurer,
            font: &font,
            line_height: 16.0,
            config: &config,
        };
        let placed = placer.place(&points, &labels(None, Some("mid"), None), false, false);
        assert_eq!(placed[0].position.x, 150.0);
    }
}
