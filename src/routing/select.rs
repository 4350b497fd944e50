//! Choosing a candidate that stays clear of other scopes

use log::{debug, trace};

use crate::geometry::{Area, Line, Point, Range};

use super::path::{Path, PathKind};
use super::RoutingConfig;

/// Rounds of narrowing before a bendable candidate is given up
const AVOID_PASSES: usize = 3;

/// A chosen route, before coincident lines are separated
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Path(Path),
    Direct(Line),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub route: Route,
    /// Nothing avoided every obstacle; this is the last-resort midline
    pub unroutable: bool,
}

/// Pick a route: the direct line if it crosses nothing, else the first
/// candidate that survives avoidance, else the first candidate as generated
pub fn select(
    candidates: &[Path],
    direct: Option<Line>,
    obstacles: &[Area],
    config: &RoutingConfig,
) -> Option<Selection> {
    if let Some(line) = direct {
        if !obstacles.iter().any(|o| o.is_crossed_by(&line)) {
            debug!("Direct line is clear");
            return Some(Selection {
                route: Route::Direct(line),
                unroutable: false,
            });
        }
    }

    for (index, candidate) in candidates.iter().enumerate() {
        let routed = if candidate.kind == PathKind::Straight {
            candidate
                .tightened()
                .filter(|p| !crosses(&p.drawn_points(config.curl_inset), obstacles))
        } else {
            avoid(candidate, obstacles, config)
        };
        match routed {
            Some(path) => {
                debug!(index, kind:? = path.kind; "Candidate chosen");
                return Some(Selection {
                    route: Route::Path(path),
                    unroutable: false,
                });
            }
            None => trace!(index, kind:? = candidate.kind; "Candidate rejected"),
        }
    }

    let route = match candidates.first().and_then(Path::tightened) {
        Some(path) => Route::Path(path),
        None => Route::Direct(direct?),
    };
    Some(Selection {
        route,
        unroutable: true,
    })
}

/// True when some segment runs through the interior of an obstacle
pub fn crosses(points: &[Point], obstacles: &[Area]) -> bool {
    Line::segments(points).any(|segment| obstacles.iter().any(|o| o.passes_through(&segment)))
}

/// Narrow a bendable path until no segment can run through an obstacle
/// (kept `gap` away), then confirm the result really is clear
pub fn avoid(path: &Path, obstacles: &[Area], config: &RoutingConfig) -> Option<Path> {
    let mut current = path.tightened()?;

    for _ in 0..AVOID_PASSES {
        let mut changed = false;
        for obstacle in obstacles {
            let zone = obstacle.inflate(config.gap);
            for segment in 0..current.segment_count() {
                let horizontal = current.is_horizontal(segment);
                let points = current.stable_points();
                let (a, b) = (points[segment], points[segment + 1]);
                let (extent, along, across) = if horizontal {
                    (Range::new(a.x.min(b.x), a.x.max(b.x)), zone.x_range(), zone.y_range())
                } else {
                    (Range::new(a.y.min(b.y), a.y.max(b.y)), zone.y_range(), zone.x_range())
                };
                let shared = current.points[segment].shared(horizontal);
                if !extent.overlaps(&along) || !shared.overlaps(&across) {
                    continue;
                }
                current = narrow(&current, segment, &across, neighbour_target(&current, segment))?;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Narrowing is a heuristic; make sure it actually worked
    if crosses(&current.drawn_points(config.curl_inset), obstacles) {
        return None;
    }
    Some(current)
}

/// Where the path heads after this segment, on the segment's shared axis
fn neighbour_target(path: &Path, segment: usize) -> f64 {
    let horizontal = path.is_horizontal(segment);
    if let Some(next) = path.points.get(segment + 2) {
        next.shared(horizontal).mid()
    } else if segment >= 1 {
        path.points[segment - 1].shared(horizontal).mid()
    } else {
        path.points[segment].shared(horizontal).mid()
    }
}

/// Remove `hole` from the segment's shared range, keeping the piece nearer
/// `target`, or the farther piece when the nearer one breaks the path
fn narrow(path: &Path, segment: usize, hole: &Range, target: f64) -> Option<Path> {
    let shared = path.points[segment].shared(path.is_horizontal(segment));
    let near = shared.minus_near(hole, target)?;
    if let Some(narrowed) = path.with_shared_range(segment, near).tightened() {
        return Some(narrowed);
    }
    let far = shared.minus_far(hole, target)?;
    path.with_shared_range(segment, far).tightened()
}
