use model::{Route, TrajectoryData};

pub mod colorize;
pub mod downsample;
pub mod point_store;
pub mod stitch;

pub use colorize::colored_segments;
pub use downsample::downsample;
pub use stitch::StitchStrategy;

/// Normalizes a service payload and stitches it into one route anchored at
/// the source coordinate.
pub fn build_route(
    data: &TrajectoryData,
    source_latitude: f64,
    source_longitude: f64,
    strategy: StitchStrategy,
) -> Route {
    let groups = point_store::segment_groups(data);
    strategy.stitch(&groups, source_latitude, source_longitude)
}
