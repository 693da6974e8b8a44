//! Ordering of disjoint segment groups into one traversable route.
//!
//! Distances are planar on raw degrees. Candidates are always scanned in a
//! fixed order and only a strictly smaller distance replaces the current
//! best, so ties go to the first candidate found and the output is fully
//! deterministic.

use std::fmt;

use model::{Point, Route};
use serde::{Deserialize, Serialize};
use utility::geo::planar_distance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StitchStrategy {
    /// Chain whole groups by nearest endpoint, reversing a group when its
    /// last point is the closer one.
    #[default]
    Grouped,
    /// Greedy nearest-neighbor tour over every single point.
    PointTour,
}

impl StitchStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "grouped" => Some(Self::Grouped),
            "point-tour" | "point_tour" => Some(Self::PointTour),
            _ => None,
        }
    }

    pub fn stitch(
        &self,
        groups: &[Vec<Point>],
        source_latitude: f64,
        source_longitude: f64,
    ) -> Route {
        match self {
            Self::Grouped => stitch_groups(groups, source_latitude, source_longitude),
            Self::PointTour => stitch_point_tour(groups, source_latitude, source_longitude),
        }
    }
}

impl fmt::Display for StitchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Grouped => write!(f, "grouped"),
            Self::PointTour => write!(f, "point-tour"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    reversed: bool,
    distance: f64,
}

/// Closest unused group endpoint to `from`.
fn nearest_endpoint(
    groups: &[&[Point]],
    used: &[bool],
    from: (f64, f64),
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (index, group) in groups.iter().enumerate() {
        if used[index] {
            continue;
        }
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        for (endpoint, reversed) in [(first, false), (last, true)] {
            let distance =
                planar_distance(from.0, from.1, endpoint.latitude, endpoint.longitude);
            if best.map_or(true, |best| distance < best.distance) {
                best = Some(Candidate {
                    index,
                    reversed,
                    distance,
                });
            }
        }
    }
    best
}

/// Stitches segment groups by greedy nearest-endpoint chaining, starting at
/// the endpoint closest to the source. Every point of every group appears
/// exactly once; each group keeps its internal order or is fully reversed.
pub fn stitch_groups(
    groups: &[Vec<Point>],
    source_latitude: f64,
    source_longitude: f64,
) -> Route {
    let groups = groups
        .iter()
        .map(Vec::as_slice)
        .filter(|group| !group.is_empty())
        .collect::<Vec<_>>();

    match groups.as_slice() {
        [] => return Route::empty(),
        [single] => return Route::new(single.to_vec()),
        _ => {}
    }

    let mut used = vec![false; groups.len()];
    let mut points = Vec::with_capacity(groups.iter().map(|group| group.len()).sum());
    let mut anchor = (source_latitude, source_longitude);

    while let Some(next) = nearest_endpoint(&groups, &used, anchor) {
        used[next.index] = true;
        let group = groups[next.index];
        if next.reversed {
            points.extend(group.iter().rev().copied());
        } else {
            points.extend_from_slice(group);
        }
        log::trace!(
            "appended {} group of {} points (reversed: {})",
            group[0].segment_kind,
            group.len(),
            next.reversed
        );
        if let Some(last) = points.last() {
            anchor = last.position();
        }
    }

    Route::new(points)
}

/// Visits every point individually, always moving to the nearest point not
/// yet visited. Points are tracked by arena index, so duplicate coordinates
/// are still visited once each.
pub fn stitch_point_tour(
    groups: &[Vec<Point>],
    source_latitude: f64,
    source_longitude: f64,
) -> Route {
    let arena = groups.iter().flatten().copied().collect::<Vec<_>>();
    let mut used = vec![false; arena.len()];
    let mut points = Vec::with_capacity(arena.len());
    let mut anchor = (source_latitude, source_longitude);

    loop {
        let nearest = arena
            .iter()
            .enumerate()
            .filter(|(index, _)| !used[*index])
            .map(|(index, point)| {
                let distance =
                    planar_distance(anchor.0, anchor.1, point.latitude, point.longitude);
                (index, distance)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((index, _)) = nearest else {
            break;
        };
        used[index] = true;
        points.push(arena[index]);
        anchor = arena[index].position();
    }

    Route::new(points)
}
