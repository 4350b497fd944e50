//! Fanning out straight connectors that would draw on top of each other

use log::debug;

use crate::geometry::Range;

use super::select::Route;

/// A straight two-point route, seen along its shared axis
struct Straight {
    index: usize,
    horizontal: bool,
    shared: Range,
    along: Range,
}

impl Straight {
    fn of(index: usize, route: &Route) -> Option<Self> {
        let Route::Path(path) = route else {
            return None;
        };
        if path.points.len() != 2 {
            return None;
        }
        let horizontal = path.is_horizontal(0);
        let points = path.stable_points();
        let (a, b) = (points[0], points[1]);
        let along = if horizontal {
            Range::new(a.x.min(b.x), a.x.max(b.x))
        } else {
            Range::new(a.y.min(b.y), a.y.max(b.y))
        };
        Some(Self {
            index,
            horizontal,
            shared: path.points[0].shared(horizontal),
            along,
        })
    }

    /// Parallel with intersecting position ranges. The extents along the line
    /// must overlap too, so parallel routes far apart on the canvas stay put.
    fn coincides(&self, other: &Straight) -> bool {
        self.horizontal == other.horizontal
            && self.shared.intersect(&other.shared).is_some()
            && self.along.overlaps(&other.along)
    }
}

/// Spread groups of parallel straight routes with overlapping position
/// ranges over evenly spaced bands of their common range
pub fn separate(routes: &mut [Route]) {
    let straights: Vec<Straight> = routes
        .iter()
        .enumerate()
        .filter_map(|(i, r)| Straight::of(i, r))
        .collect();

    for group in groups(&straights) {
        if group.len() < 2 {
            continue;
        }
        let Some(union) = group
            .iter()
            .map(|&g| straights[g].shared)
            .reduce(|a, b| a.union(&b))
        else {
            continue;
        };
        let count = group.len() as f64;
        let bands: Vec<f64> = (1..=group.len())
            .map(|k| union.start + union.span() * k as f64 / (count + 1.0))
            .collect();
        debug!(members = group.len(), start = union.start, end = union.end; "Separating coincident lines");

        let mut taken = vec![false; bands.len()];
        for &g in &group {
            let member = &straights[g];
            let slot = bands
                .iter()
                .enumerate()
                .position(|(b, value)| !taken[b] && member.shared.contains(*value));
            let value = match slot {
                Some(b) => {
                    taken[b] = true;
                    bands[b]
                }
                None => member.shared.mid(),
            };
            if let Route::Path(path) = &mut routes[member.index] {
                *path = path.with_shared_range(0, Range::point(value));
            }
        }
    }
}

/// Connected groups of coinciding routes, each in original order
fn groups(straights: &[Straight]) -> Vec<Vec<usize>> {
    let mut group_of: Vec<Option<usize>> = vec![None; straights.len()];
    let mut out: Vec<Vec<usize>> = Vec::new();

    for seed in 0..straights.len() {
        if group_of[seed].is_some() {
            continue;
        }
        let id = out.len();
        group_of[seed] = Some(id);
        let mut members = vec![seed];
        let mut cursor = 0;
        while cursor < members.len() {
            let current = members[cursor];
            for other in 0..straights.len() {
                if group_of[other].is_none() && straights[current].coincides(&straights[other]) {
                    group_of[other] = Some(id);
                    members.push(other);
                }
            }
            cursor += 1;
        }
        members.sort_unstable();
        out.push(members);
    }
    out
}
