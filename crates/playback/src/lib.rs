use std::error;
use std::fmt;

pub mod clock;
pub mod config;
pub mod fetch;
pub mod runner;
pub mod track;
pub mod viewer;

pub use clock::{AnimationClock, ClockState, TickOutcome};
pub use config::ViewerConfig;
pub use fetch::{FetchBatch, FetchRequest, FetchResults};
pub use runner::Viewport;
pub use track::Track;
pub use viewer::{SourceField, SourceState, TickReport, Viewer};

/// Rejected user operations. The messages are meant to be shown as is.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    LastSource,
    NothingToAnimate,
    UnknownSource(String),
    UnknownCity(String),
}

impl error::Error for ViewerError {}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ViewerError::LastSource => write!(f, "You must have at least one source"),
            ViewerError::NothingToAnimate => write!(
                f,
                "Not enough points to animate trajectory for one or more sources"
            ),
            ViewerError::UnknownSource(id) => write!(f, "Unknown source: {id}"),
            ViewerError::UnknownCity(name) => write!(f, "Unknown city: {name}"),
        }
    }
}

/// A (latitude, longitude) pair handed to the map viewport.
pub type Position = (f64, f64);
