pub use serde_with;

pub mod point;
pub mod route;
pub mod source;
pub mod trajectory;

pub use point::{Point, SegmentKind};
pub use route::{ColoredSegment, Route};
pub use source::{CoordinateKey, Source, SourceDraft};
pub use trajectory::TrajectoryData;
