use itertools::Itertools;
use model::{ColoredSegment, Point};

/// Splits a route into maximal runs of equal segment kind. The point where
/// the kind changes is repeated at the start of the following run so that
/// adjacent runs stay visually connected.
pub fn colored_segments(points: &[Point]) -> Vec<ColoredSegment> {
    let mut segments: Vec<ColoredSegment> = Vec::new();
    for (segment_kind, run) in &points.iter().chunk_by(|point| point.segment_kind) {
        let mut run_points = Vec::new();
        if let Some(boundary) = segments.last().and_then(|segment| segment.points.last()) {
            run_points.push(*boundary);
        }
        run_points.extend(run.copied());
        segments.push(ColoredSegment {
            segment_kind,
            points: run_points,
        });
    }
    segments
}

/// Inverse of [`colored_segments`]: concatenates the runs and drops the
/// repeated boundary points.
pub fn flatten_runs(segments: &[ColoredSegment]) -> Vec<Point> {
    segments
        .iter()
        .enumerate()
        .flat_map(|(index, segment)| {
            let skip = usize::from(index > 0);
            segment.points.iter().skip(skip).copied()
        })
        .collect()
}
