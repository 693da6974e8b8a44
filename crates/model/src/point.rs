use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Shore,
    Offshore,
    Inland,
}

impl SegmentKind {
    /// Scan order used whenever groups are compared against each other.
    pub const ALL: [SegmentKind; 3] =
        [SegmentKind::Shore, SegmentKind::Offshore, SegmentKind::Inland];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shore => "shore",
            Self::Offshore => "offshore",
            Self::Inland => "inland",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single sample of a simulated debris path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "segment")]
    pub segment_kind: SegmentKind,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64, segment_kind: SegmentKind) -> Self {
        Self {
            latitude,
            longitude,
            segment_kind,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_use_the_short_wire_names() {
        let point = Point::new(24.1, 54.1, SegmentKind::Offshore);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"lat":24.1,"lon":54.1,"segment":"offshore"}"#);
        assert_eq!(serde_json::from_str::<Point>(&json).unwrap(), point);
    }
}
