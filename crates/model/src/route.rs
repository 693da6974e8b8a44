use std::ops::Deref;

use serde::{Deserialize, Serialize};
use utility::geo::haversine_distance;

use crate::point::{Point, SegmentKind};

/// The stitched, ordered traversal of one source's trajectory.
/// An empty route is valid and renderable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<Point>);

impl Route {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// The first `count` points, or all of them if the route is shorter.
    pub fn prefix(&self, count: usize) -> &[Point] {
        &self.0[..count.min(self.0.len())]
    }

    /// Sum of the great-circle legs, in kilometers.
    pub fn length_km(&self) -> f64 {
        self.0
            .windows(2)
            .map(|leg| {
                haversine_distance(
                    leg[0].latitude,
                    leg[0].longitude,
                    leg[1].latitude,
                    leg[1].longitude,
                )
            })
            .sum()
    }
}

impl Deref for Route {
    type Target = [Point];

    fn deref(&self) -> &[Point] {
        &self.0
    }
}

impl From<Vec<Point>> for Route {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl FromIterator<Point> for Route {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A maximal run of consecutive points sharing a segment kind. Derived for
/// rendering only, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredSegment {
    pub segment_kind: SegmentKind,
    pub points: Vec<Point>,
}
