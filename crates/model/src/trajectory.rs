use serde::{Deserialize, Serialize};

use crate::point::SegmentKind;

/// Payload of the remote trajectory service. Every field may be missing and
/// array entries may be `null`; consumers treat both as "no data".
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryData {
    pub latitudes_shore: Option<Vec<Option<f64>>>,
    pub longitudes_shore: Option<Vec<Option<f64>>>,
    pub latitudes_offshore: Option<Vec<Option<f64>>>,
    pub longitudes_offshore: Option<Vec<Option<f64>>>,
    pub latitudes_inland: Option<Vec<Option<f64>>>,
    pub longitudes_inland: Option<Vec<Option<f64>>>,
    pub times_offshore: Option<Vec<Option<f64>>>,
    pub times_inland: Option<Vec<Option<f64>>>,
    pub particle_id: Option<i64>,
    pub probability: Option<f64>,
    pub travelled_distance: Option<f64>,
    pub trajectory_center_lat: Option<f64>,
    pub trajectory_center_lon: Option<f64>,
    pub is_polar_trajectory: Option<bool>,
}

impl TrajectoryData {
    /// The (latitudes, longitudes) arrays of one segment kind.
    pub fn coordinates(
        &self,
        kind: SegmentKind,
    ) -> (Option<&[Option<f64>]>, Option<&[Option<f64>]>) {
        let (latitudes, longitudes) = match kind {
            SegmentKind::Shore => (&self.latitudes_shore, &self.longitudes_shore),
            SegmentKind::Offshore => (&self.latitudes_offshore, &self.longitudes_offshore),
            SegmentKind::Inland => (&self.latitudes_inland, &self.longitudes_inland),
        };
        (latitudes.as_deref(), longitudes.as_deref())
    }

    pub fn center(&self) -> Option<(f64, f64)> {
        self.trajectory_center_lat.zip(self.trajectory_center_lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_and_nulls_are_accepted() {
        let json = r#"{
            "latitudes_shore": [24.1, null],
            "longitudes_shore": [54.1, 54.2],
            "particle_id": 17,
            "is_polar_trajectory": false
        }"#;
        let data: TrajectoryData = serde_json::from_str(json).unwrap();
        let (latitudes, longitudes) = data.coordinates(SegmentKind::Shore);
        assert_eq!(latitudes.unwrap(), &[Some(24.1), None]);
        assert_eq!(longitudes.unwrap().len(), 2);
        assert_eq!(data.coordinates(SegmentKind::Inland), (None, None));
        assert_eq!(data.particle_id, Some(17));
        assert_eq!(data.center(), None);
    }
}
