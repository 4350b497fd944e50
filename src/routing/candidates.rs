//! Classifying endpoint pairs and generating candidate routes

use crate::geometry::{Area, Line, Range};

use super::path::{Frame, Path, PathKind, PotentialPoint};
use super::RoutingConfig;

/// How two endpoint rectangles sit relative to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Side by side or stacked: their projections overlap on one axis
    Axis,
    /// Quadrant relation: no projection overlap
    Diagonal,
    /// Both projections overlap, so the areas do
    Overlapping,
}

pub fn classify(from: &Area, to: &Area) -> Relation {
    let x = from.x_range().overlaps(&to.x_range());
    let y = from.y_range().overlaps(&to.y_range());
    match (x, y) {
        (true, true) => Relation::Overlapping,
        (false, false) => Relation::Diagonal,
        _ => Relation::Axis,
    }
}

/// Candidates for an endpoint pair, in preference order, plus the direct
/// centre line for diagonal pairs
pub fn generate(from: &Area, to: &Area, config: &RoutingConfig) -> (Vec<Path>, Option<Line>) {
    match classify(from, to) {
        Relation::Axis => {
            let frame = axis_frame(from, to);
            let (f, t) = (frame.area(from), frame.area(to));
            let candidates = axis_candidates(&f, &t, config)
                .into_iter()
                .map(|p| frame.restore(p))
                .collect();
            (candidates, None)
        }
        Relation::Diagonal => {
            let frame = diagonal_frame(from, to);
            let (f, t) = (frame.area(from), frame.area(to));
            let candidates = diagonal_candidates(&f, &t, config)
                .into_iter()
                .map(|p| frame.restore(p))
                .collect();
            (candidates, Some(direct_line(from, to)))
        }
        Relation::Overlapping => (Vec::new(), None),
    }
}

/// Frame in which `to` lies to the right of `from`
fn axis_frame(from: &Area, to: &Area) -> Frame {
    let side_by_side = from.y_range().overlaps(&to.y_range());
    if side_by_side {
        Frame {
            flip_x: to.x < from.x,
            ..Frame::default()
        }
    } else {
        Frame {
            transpose: true,
            flip_x: to.y < from.y,
            flip_y: false,
        }
    }
}

/// Frame in which `to` lies right of and below `from`
fn diagonal_frame(from: &Area, to: &Area) -> Frame {
    Frame {
        transpose: false,
        flip_x: to.x < from.x,
        flip_y: to.y < from.y,
    }
}

fn pp(x: Range, y: Range) -> PotentialPoint {
    PotentialPoint::new(x, y)
}

/// Canonical: `t` right of `f`, vertical projections overlapping
fn axis_candidates(f: &Area, t: &Area, config: &RoutingConfig) -> Vec<Path> {
    let gap = config.gap;
    let mut out = Vec::with_capacity(4);

    if let Some(shared) = f.y_range().intersect(&t.y_range()) {
        out.push(Path::new(
            vec![
                pp(Range::point(f.right()), shared),
                pp(Range::point(t.x), shared),
            ],
            true,
            PathKind::Straight,
        ));
    }

    // Leave through the top, come in from the left above `f`
    out.push(Path::new(
        vec![
            pp(f.x_range(), Range::point(f.y)),
            pp(f.x_range(), Range::new(t.y, f.y - gap)),
            pp(Range::point(t.x), t.y_range()),
        ],
        false,
        PathKind::Elbow,
    ));

    // Leave through the bottom, come in from the left below `f`
    out.push(Path::new(
        vec![
            pp(f.x_range(), Range::point(f.bottom())),
            pp(f.x_range(), Range::new(f.bottom() + gap, t.bottom())),
            pp(Range::point(t.x), t.y_range()),
        ],
        false,
        PathKind::Elbow,
    ));

    // Over the top of both
    let top = f.y.min(t.y);
    let over = Range::new(top - config.curl_reach, top - gap);
    out.push(Path::new(
        vec![
            pp(f.x_range(), Range::point(f.y)),
            pp(f.x_range(), over),
            pp(t.x_range(), over),
            pp(t.x_range(), Range::point(t.y)),
        ],
        false,
        PathKind::Curl,
    ));

    out
}

/// Canonical: `t` right of and below `f`
fn diagonal_candidates(f: &Area, t: &Area, config: &RoutingConfig) -> Vec<Path> {
    let gap = config.gap;
    vec![
        // Across, then down into the top of `t`
        Path::new(
            vec![
                pp(Range::point(f.right()), f.y_range()),
                pp(t.x_range(), f.y_range()),
                pp(t.x_range(), Range::point(t.y)),
            ],
            true,
            PathKind::Elbow,
        ),
        // Down, then across into the left of `t`
        Path::new(
            vec![
                pp(f.x_range(), Range::point(f.bottom())),
                pp(f.x_range(), t.y_range()),
                pp(Range::point(t.x), t.y_range()),
            ],
            false,
            PathKind::Elbow,
        ),
        // Across, down in the horizontal gap, across
        Path::new(
            vec![
                pp(Range::point(f.right()), f.y_range()),
                pp(Range::new(f.right() + gap, t.x - gap), f.y_range()),
                pp(Range::new(f.right() + gap, t.x - gap), t.y_range()),
                pp(Range::point(t.x), t.y_range()),
            ],
            true,
            PathKind::Zigzag,
        ),
        // Down, across in the vertical gap, down
        Path::new(
            vec![
                pp(f.x_range(), Range::point(f.bottom())),
                pp(f.x_range(), Range::new(f.bottom() + gap, t.y - gap)),
                pp(t.x_range(), Range::new(f.bottom() + gap, t.y - gap)),
                pp(t.x_range(), Range::point(t.y)),
            ],
            false,
            PathKind::Zigzag,
        ),
    ]
}

/// Line between the two centres, clipped to where it leaves each area
pub fn direct_line(from: &Area, to: &Area) -> Line {
    Line::new(
        from.boundary_toward(to.center()),
        to.boundary_toward(from.center()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn config() -> RoutingConfig {
        RoutingConfig::default()
    }

    #[test]
    fn test_classify() {
        let a = Area::new(0.0, 0.0, 50.0, 30.0);
        assert_eq!(classify(&a, &Area::new(100.0, 10.0, 50.0, 30.0)), Relation::Axis);
        assert_eq!(classify(&a, &Area::new(10.0, 100.0, 50.0, 30.0)), Relation::Axis);
        assert_eq!(classify(&a, &Area::new(100.0, 100.0, 50.0, 30.0)), Relation::Diagonal);
        assert_eq!(classify(&a, &Area::new(10.0, 10.0, 10.0, 10.0)), Relation::Overlapping);
    }

    #[test]
    fn test_straight_candidate_left_to_right() {
        let from = Area::new(0.0, 0.0, 50.0, 30.0);
        let to = Area::new(100.0, 10.0, 50.0, 30.0);
        let (candidates, direct) = generate(&from, &to, &config());
        assert!(direct.is_none());
        assert_eq!(candidates.len(), 4);
        let straight = candidates[0].tightened().unwrap();
        assert_eq!(straight.kind, PathKind::Straight);
        assert_eq!(
            straight.stable_points(),
            vec![Point::new(50.0, 20.0), Point::new(100.0, 20.0)]
        );
    }

    #[test]
    fn test_straight_candidate_right_to_left() {
        let from = Area::new(100.0, 0.0, 50.0, 30.0);
        let to = Area::new(0.0, 0.0, 50.0, 30.0);
        let (candidates, _) = generate(&from, &to, &config());
        let points = candidates[0].tightened().unwrap().stable_points();
        assert_eq!(points, vec![Point::new(100.0, 15.0), Point::new(50.0, 15.0)]);
    }

    #[test]
    fn test_straight_candidate_stacked() {
        let from = Area::new(0.0, 100.0, 40.0, 30.0);
        let to = Area::new(0.0, 0.0, 40.0, 30.0);
        let (candidates, _) = generate(&from, &to, &config());
        let straight = candidates[0].tightened().unwrap();
        assert!(!straight.starts_horizontal);
        assert_eq!(
            straight.stable_points(),
            vec![Point::new(20.0, 100.0), Point::new(20.0, 30.0)]
        );
    }

    #[test]
    fn test_curl_goes_over_both() {
        let from = Area::new(0.0, 0.0, 50.0, 30.0);
        let to = Area::new(100.0, 0.0, 50.0, 30.0);
        let (candidates, _) = generate(&from, &to, &config());
        let curl = candidates
            .iter()
            .find(|c| c.kind == PathKind::Curl)
            .unwrap()
            .tightened()
            .unwrap();
        let points = curl.stable_points();
        assert_eq!(points.first().unwrap().y, 0.0);
        assert_eq!(points.last().unwrap().y, 0.0);
        assert!(points[1].y < -config().gap);
    }

    #[test]
    fn test_curl_height_follows_config() {
        let from = Area::new(0.0, 0.0, 50.0, 30.0);
        let to = Area::new(100.0, 0.0, 50.0, 30.0);
        let curl_top = |config: &RoutingConfig| {
            let (candidates, _) = generate(&from, &to, config);
            let curl = candidates.into_iter().find(|c| c.kind == PathKind::Curl).unwrap();
            curl.tightened().unwrap().stable_points()[1].y
        };
        let near = curl_top(&config());
        let far = curl_top(&RoutingConfig::new().with_curl_reach(60.0).with_gap(10.0));
        assert!(far < near);
        assert!(far <= -10.0);
    }

    #[test]
    fn test_equal_heights_have_no_elbows() {
        let from = Area::new(0.0, 0.0, 50.0, 30.0);
        let to = Area::new(100.0, 0.0, 50.0, 30.0);
        let (candidates, _) = generate(&from, &to, &config());
        let elbows: Vec<_> = candidates
            .iter()
            .filter(|c| c.kind == PathKind::Elbow)
            .collect();
        assert_eq!(elbows.len(), 2);
        assert!(elbows.iter().all(|e| e.tightened().is_none()));
    }

    #[test]
    fn test_diagonal_candidates_connect_edges() {
        let from = Area::new(200.0, 200.0, 50.0, 30.0);
        let to = Area::new(0.0, 0.0, 50.0, 30.0);
        let (candidates, direct) = generate(&from, &to, &config());
        let direct = direct.unwrap();
        assert!(direct.start.distance(Point::new(210.0, 200.0)) < 1e-9);
        assert!(direct.end.distance(Point::new(40.0, 30.0)) < 1e-9);
        let elbow = candidates[0].tightened().unwrap().stable_points();
        assert_eq!(elbow.first().unwrap().x, 200.0);
        assert_eq!(elbow.last().unwrap().y, 30.0);
        assert_eq!(candidates.len(), 4);
    }
}
