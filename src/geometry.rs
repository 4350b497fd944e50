//! Geometry kernel: points, 1-D ranges, rectangular areas and line segments
//!
//! Ranges are closed intervals. A range whose `start` exceeds its `end` is
//! empty; operations that could produce one return `None` instead.

/// Tolerance used when comparing coordinates
pub const EPSILON: f64 = 1e-6;

/// A 2D point in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Linear interpolation towards `other` (`t = 0` is self, `t = 1` is other)
    pub fn lerp(self, other: Point, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Width and height of something that has not been positioned yet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A closed 1-D interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub start: f64,
    pub end: f64,
}

impl Range {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A degenerate range holding a single value
    pub fn point(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end + EPSILON
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.start - EPSILON && value <= self.end + EPSILON
    }

    /// Common part of both ranges, `None` when they are disjoint
    pub fn intersect(&self, other: &Range) -> Option<Range> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start > end + EPSILON {
            None
        } else {
            Some(Range::new(start, end.max(start)))
        }
    }

    /// True when the ranges share more than a boundary value
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start.max(other.start) < self.end.min(other.end) - EPSILON
    }

    /// Smallest range covering both
    pub fn union(&self, other: &Range) -> Range {
        Range::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Widen both ends by `amount`
    pub fn inflate(&self, amount: f64) -> Range {
        Range::new(self.start - amount, self.end + amount)
    }

    /// The parts of `self` left after removing `other`: `(below, above)`
    pub fn subtract(&self, other: &Range) -> (Option<Range>, Option<Range>) {
        if !self.overlaps(other) {
            return (Some(*self), None);
        }
        let below = (other.start > self.start + EPSILON).then(|| Range::new(self.start, other.start));
        let above = (other.end < self.end - EPSILON).then(|| Range::new(other.end, self.end));
        (below, above)
    }

    /// Distance from `value` to the closest point of the range
    pub fn distance_to(&self, value: f64) -> f64 {
        if value < self.start {
            self.start - value
        } else if value > self.end {
            value - self.end
        } else {
            0.0
        }
    }

    /// After removing `other`, the remaining piece closest to `target`
    pub fn minus_near(&self, other: &Range, target: f64) -> Option<Range> {
        match self.subtract(other) {
            (Some(a), Some(b)) => {
                if a.distance_to(target) <= b.distance_to(target) {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (a, b) => a.or(b),
        }
    }

    /// After removing `other`, the remaining piece farthest from `target`.
    /// `None` unless the removal split the range in two.
    pub fn minus_far(&self, other: &Range, target: f64) -> Option<Range> {
        match self.subtract(other) {
            (Some(a), Some(b)) => {
                if a.distance_to(target) <= b.distance_to(target) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            _ => None,
        }
    }

    /// Mirror around zero
    pub fn negate(&self) -> Range {
        Range::new(-self.end, -self.start)
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Area {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Area {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn x_range(&self) -> Range {
        Range::new(self.x, self.right())
    }

    pub fn y_range(&self) -> Range {
        Range::new(self.y, self.bottom())
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Area {
        Area::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow the area by `padding` on every side
    pub fn inflate(&self, padding: f64) -> Area {
        Area::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }

    /// Point lies inside or on the boundary
    pub fn contains(&self, point: Point) -> bool {
        self.x_range().contains(point.x) && self.y_range().contains(point.y)
    }

    /// Point lies strictly inside the boundary
    pub fn contains_strictly(&self, point: Point) -> bool {
        point.x > self.x + EPSILON
            && point.x < self.right() - EPSILON
            && point.y > self.y + EPSILON
            && point.y < self.bottom() - EPSILON
    }

    /// Interiors overlap
    pub fn intersects(&self, other: &Area) -> bool {
        self.x_range().overlaps(&other.x_range()) && self.y_range().overlaps(&other.y_range())
    }

    /// Smallest area covering both
    pub fn union(&self, other: &Area) -> Area {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Area::new(x, y, right - x, bottom - y)
    }

    /// Part of `line` inside the area (Liang-Barsky clipping)
    pub fn clip(&self, line: &Line) -> Option<Line> {
        let dx = line.end.x - line.start.x;
        let dy = line.end.y - line.start.y;
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        let checks = [
            (-dx, line.start.x - self.x),
            (dx, self.right() - line.start.x),
            (-dy, line.start.y - self.y),
            (dy, self.bottom() - line.start.y),
        ];
        for (p, q) in checks {
            if p.abs() < EPSILON {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some(Line::new(
            line.start.lerp(line.end, t0),
            line.start.lerp(line.end, t1),
        ))
    }

    /// The line enters and exits the area: it passes through the interior
    /// while neither endpoint lies strictly inside.
    pub fn is_crossed_by(&self, line: &Line) -> bool {
        if self.contains_strictly(line.start) || self.contains_strictly(line.end) {
            return false;
        }
        match self.clip(line) {
            Some(inside) => {
                inside.length() > EPSILON && self.contains_strictly(inside.midpoint())
            }
            None => false,
        }
    }

    /// Some part of the line, longer than a point, runs through the interior
    pub fn passes_through(&self, line: &Line) -> bool {
        self.clip(line)
            .is_some_and(|inside| inside.length() > EPSILON && self.contains_strictly(inside.midpoint()))
    }

    /// Where the ray from the center towards `target` leaves the area
    pub fn boundary_toward(&self, target: Point) -> Point {
        let center = self.center();
        let dx = target.x - center.x;
        let dy = target.y - center.y;
        if dx.abs() < EPSILON && dy.abs() < EPSILON {
            return center;
        }
        let sx = if dx.abs() < EPSILON {
            f64::INFINITY
        } else {
            (self.width / 2.0) / dx.abs()
        };
        let sy = if dy.abs() < EPSILON {
            f64::INFINITY
        } else {
            (self.height / 2.0) / dy.abs()
        };
        let scale = sx.min(sy);
        Point::new(center.x + dx * scale, center.y + dy * scale)
    }
}

/// A straight 2-D segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Point {
        self.start.lerp(self.end, 0.5)
    }

    pub fn is_horizontal(&self) -> bool {
        (self.start.y - self.end.y).abs() < EPSILON
    }

    pub fn is_vertical(&self) -> bool {
        (self.start.x - self.end.x).abs() < EPSILON
    }

    /// Consecutive segments of a polyline
    pub fn segments(points: &[Point]) -> impl Iterator<Item = Line> + '_ {
        points.windows(2).map(|pair| Line::new(pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_intersect() {
        let a = Range::new(0.0, 10.0);
        let b = Range::new(5.0, 20.0);
        assert_eq!(a.intersect(&b), Some(Range::new(5.0, 10.0)));
        assert_eq!(a.intersect(&Range::new(11.0, 12.0)), None);
        // Touching ranges share a single value
        assert_eq!(a.intersect(&Range::new(10.0, 12.0)), Some(Range::point(10.0)));
    }

    #[test]
    fn test_range_subtract_splits() {
        let r = Range::new(0.0, 100.0);
        let (below, above) = r.subtract(&Range::new(40.0, 60.0));
        assert_eq!(below, Some(Range::new(0.0, 40.0)));
        assert_eq!(above, Some(Range::new(60.0, 100.0)));
    }

    #[test]
    fn test_range_subtract_one_side() {
        let r = Range::new(0.0, 100.0);
        let (below, above) = r.subtract(&Range::new(-10.0, 30.0));
        assert_eq!(below, None);
        assert_eq!(above, Some(Range::new(30.0, 100.0)));
        assert_eq!(r.subtract(&Range::new(-10.0, 110.0)), (None, None));
    }

    #[test]
    fn test_minus_near_and_far() {
        let r = Range::new(0.0, 100.0);
        let hole = Range::new(40.0, 60.0);
        assert_eq!(r.minus_near(&hole, 90.0), Some(Range::new(60.0, 100.0)));
        assert_eq!(r.minus_far(&hole, 90.0), Some(Range::new(0.0, 40.0)));
        // Only one side survives: there is no far piece
        assert_eq!(r.minus_far(&Range::new(-5.0, 50.0), 0.0), None);
        assert_eq!(
            r.minus_near(&Range::new(-5.0, 50.0), 0.0),
            Some(Range::new(50.0, 100.0))
        );
    }

    #[test]
    fn test_area_edges() {
        let area = Area::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(area.right(), 110.0);
        assert_eq!(area.bottom(), 70.0);
        assert_eq!(area.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_area_intersects() {
        let a = Area::new(0.0, 0.0, 100.0, 100.0);
        let b = Area::new(50.0, 50.0, 100.0, 100.0);
        let c = Area::new(200.0, 200.0, 50.0, 50.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_area_union() {
        let a = Area::new(0.0, 0.0, 50.0, 50.0);
        let b = Area::new(100.0, 100.0, 50.0, 50.0);
        assert_eq!(a.union(&b), Area::new(0.0, 0.0, 150.0, 150.0));
    }

    #[test]
    fn test_line_crossing_through_area() {
        let area = Area::new(10.0, 10.0, 20.0, 20.0);
        let through = Line::new(Point::new(0.0, 20.0), Point::new(50.0, 20.0));
        let past = Line::new(Point::new(0.0, 40.0), Point::new(50.0, 40.0));
        let into = Line::new(Point::new(0.0, 20.0), Point::new(20.0, 20.0));
        let along_edge = Line::new(Point::new(0.0, 10.0), Point::new(50.0, 10.0));
        assert!(area.is_crossed_by(&through));
        assert!(!area.is_crossed_by(&past));
        assert!(!area.is_crossed_by(&into));
        assert!(!area.is_crossed_by(&along_edge));
        assert!(area.passes_through(&into));
        assert!(!area.passes_through(&along_edge));
    }

    #[test]
    fn test_boundary_toward() {
        let area = Area::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(area.boundary_toward(Point::new(200.0, 25.0)), Point::new(100.0, 25.0));
        assert_eq!(area.boundary_toward(Point::new(50.0, -100.0)), Point::new(50.0, 0.0));
        let corner = area.boundary_toward(Point::new(150.0, 75.0));
        assert!((corner.x - 100.0).abs() < EPSILON);
        assert!((corner.y - 50.0).abs() < EPSILON);
    }
}
