//! Orthogonal paths whose joints are still ranges of valid positions

use crate::geometry::{Area, Point, Range, EPSILON};

/// A route joint: every position inside both ranges is still acceptable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentialPoint {
    pub x: Range,
    pub y: Range,
}

impl PotentialPoint {
    pub fn new(x: Range, y: Range) -> Self {
        Self { x, y }
    }

    /// The range on the axis shared with the neighbour across a segment
    pub fn shared(&self, horizontal: bool) -> Range {
        if horizontal {
            self.y
        } else {
            self.x
        }
    }

    fn with_shared(mut self, horizontal: bool, range: Range) -> Self {
        if horizontal {
            self.y = range;
        } else {
            self.x = range;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Straight,
    Elbow,
    Curl,
    Zigzag,
}

/// An orthogonal route. Segment `i` joins points `i` and `i + 1` and is
/// horizontal when `starts_horizontal` differs from `i` being odd.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<PotentialPoint>,
    pub starts_horizontal: bool,
    pub kind: PathKind,
}

impl Path {
    pub fn new(points: Vec<PotentialPoint>, starts_horizontal: bool, kind: PathKind) -> Self {
        Self {
            points,
            starts_horizontal,
            kind,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn is_horizontal(&self, segment: usize) -> bool {
        self.starts_horizontal != (segment % 2 == 1)
    }

    /// Narrow neighbouring joints to the values they can share.
    /// `None` when some range is empty or two neighbours have nothing in common.
    pub fn tightened(&self) -> Option<Path> {
        if self.points.iter().any(|p| p.x.is_empty() || p.y.is_empty()) {
            return None;
        }
        let mut points = self.points.clone();
        for segment in 0..self.segment_count() {
            let horizontal = self.is_horizontal(segment);
            let common = points[segment]
                .shared(horizontal)
                .intersect(&points[segment + 1].shared(horizontal))?;
            points[segment] = points[segment].with_shared(horizontal, common);
            points[segment + 1] = points[segment + 1].with_shared(horizontal, common);
        }
        Some(Path {
            points,
            ..self.clone()
        })
    }

    /// Copy of the path with segment `segment` restricted to `range` on its
    /// shared axis
    pub fn with_shared_range(&self, segment: usize, range: Range) -> Path {
        let horizontal = self.is_horizontal(segment);
        let mut points = self.points.clone();
        points[segment] = points[segment].with_shared(horizontal, range);
        points[segment + 1] = points[segment + 1].with_shared(horizontal, range);
        Path {
            points,
            ..self.clone()
        }
    }

    /// Concrete joints: the first point sits at the middle of its ranges,
    /// each later point inherits the coordinate it shares with its
    /// predecessor and takes the middle of its free range.
    pub fn stable_points(&self) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::with_capacity(self.points.len());
        for (i, p) in self.points.iter().enumerate() {
            let point = match out.last() {
                None => Point::new(p.x.mid(), p.y.mid()),
                Some(prev) if self.is_horizontal(i - 1) => Point::new(p.x.mid(), prev.y),
                Some(prev) => Point::new(prev.x, p.y.mid()),
            };
            out.push(point);
        }
        out
    }

    /// Stable points, with curls bent into diagonal-straight-diagonal shape
    /// so arrowheads at both ends have room
    pub fn drawn_points(&self, curl_inset: f64) -> Vec<Point> {
        let mut points = self.stable_points();
        if self.kind == PathKind::Curl && points.len() == 4 {
            let (b, c) = (points[1], points[2]);
            let length = b.distance(c);
            if length > EPSILON {
                let t = curl_inset.min(length / 3.0) / length;
                points[1] = b.lerp(c, t);
                points[2] = c.lerp(b, t);
            }
        }
        points
    }
}

/// A change of coordinates that maps any endpoint arrangement onto the
/// canonical one candidates are generated for. Forward applies the
/// transpose first, then the flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub transpose: bool,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Frame {
    pub fn area(&self, area: &Area) -> Area {
        let (mut x, mut y) = (area.x_range(), area.y_range());
        if self.transpose {
            std::mem::swap(&mut x, &mut y);
        }
        if self.flip_x {
            x = x.negate();
        }
        if self.flip_y {
            y = y.negate();
        }
        Area::new(x.start, y.start, x.span(), y.span())
    }

    /// Map a canonical path back to real coordinates
    pub fn restore(&self, path: Path) -> Path {
        let points = path
            .points
            .iter()
            .map(|p| {
                let (mut x, mut y) = (p.x, p.y);
                if self.flip_x {
                    x = x.negate();
                }
                if self.flip_y {
                    y = y.negate();
                }
                if self.transpose {
                    std::mem::swap(&mut x, &mut y);
                }
                PotentialPoint::new(x, y)
            })
            .collect();
        Path {
            points,
            starts_horizontal: path.starts_horizontal != self.transpose,
            kind: path.kind,
        }
    }
}
