use model::{Point, SegmentKind, TrajectoryData};

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

/// Zips parallel coordinate arrays into points. Only the overlapping prefix
/// is used and indices with a missing or non-finite coordinate are skipped.
pub fn segment_group(
    latitudes: Option<&[Option<f64>]>,
    longitudes: Option<&[Option<f64>]>,
    kind: SegmentKind,
) -> Vec<Point> {
    let (Some(latitudes), Some(longitudes)) = (latitudes, longitudes) else {
        return Vec::new();
    };
    latitudes
        .iter()
        .zip(longitudes)
        .filter_map(|(latitude, longitude)| {
            Some(Point::new(finite(*latitude)?, finite(*longitude)?, kind))
        })
        .collect()
}

/// One group per segment kind, in `SegmentKind::ALL` order.
pub fn segment_groups(data: &TrajectoryData) -> [Vec<Point>; 3] {
    SegmentKind::ALL.map(|kind| {
        let (latitudes, longitudes) = data.coordinates(kind);
        segment_group(latitudes, longitudes, kind)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_overlapping_prefix_is_used() {
        let latitudes = [Some(1.0), Some(2.0), Some(3.0)];
        let longitudes = [Some(10.0), Some(20.0)];
        let group = segment_group(Some(&latitudes[..]), Some(&longitudes[..]), SegmentKind::Shore);
        assert_eq!(
            group,
            vec![
                Point::new(1.0, 10.0, SegmentKind::Shore),
                Point::new(2.0, 20.0, SegmentKind::Shore),
            ]
        );
    }

    #[test]
    fn non_finite_and_missing_values_are_dropped() {
        let latitudes = [Some(1.0), None, Some(f64::NAN), Some(4.0)];
        let longitudes = [Some(10.0), Some(20.0), Some(30.0), Some(f64::INFINITY)];
        let group = segment_group(Some(&latitudes[..]), Some(&longitudes[..]), SegmentKind::Inland);
        assert_eq!(group, vec![Point::new(1.0, 10.0, SegmentKind::Inland)]);
    }

    #[test]
    fn absent_arrays_contribute_nothing() {
        let latitudes = [Some(1.0)];
        assert!(segment_group(Some(&latitudes[..]), None, SegmentKind::Shore).is_empty());
        assert!(segment_group(None, None, SegmentKind::Shore).is_empty());

        let groups = segment_groups(&TrajectoryData::default());
        assert!(groups.iter().all(|group| group.is_empty()));
    }

    #[test]
    fn groups_follow_segment_order() {
        let data = TrajectoryData {
            latitudes_inland: Some(vec![Some(3.0)]),
            longitudes_inland: Some(vec![Some(30.0)]),
            latitudes_shore: Some(vec![Some(1.0)]),
            longitudes_shore: Some(vec![Some(10.0)]),
            ..Default::default()
        };
        let [shore, offshore, inland] = segment_groups(&data);
        assert_eq!(shore[0].segment_kind, SegmentKind::Shore);
        assert!(offshore.is_empty());
        assert_eq!(inland[0].segment_kind, SegmentKind::Inland);
    }
}
