use model::Route;

/// Keeps the first and last point plus every `stride`-th point in between.
/// Routes of at most two points and strides of at most one are returned
/// unchanged.
pub fn downsample(route: &Route, stride: usize) -> Route {
    let len = route.len();
    if len <= 2 || stride <= 1 {
        return route.clone();
    }

    let mut points = Vec::with_capacity(len / stride + 2);
    points.push(route[0]);
    points.extend(route[..len - 1].iter().skip(stride).step_by(stride).copied());
    points.push(route[len - 1]);
    Route::new(points)
}

#[cfg(test)]
mod tests {
    use model::{Point, SegmentKind};

    use super::*;

    fn route(len: usize) -> Route {
        (0..len)
            .map(|index| Point::new(index as f64, 0.0, SegmentKind::Offshore))
            .collect()
    }

    fn indices(route: &Route) -> Vec<usize> {
        route.iter().map(|point| point.latitude as usize).collect()
    }

    #[test]
    fn stride_three_of_ten_points() {
        assert_eq!(indices(&downsample(&route(10), 3)), vec![0, 3, 6, 9]);
    }

    #[test]
    fn stride_positions_before_the_last_point_only() {
        // 9 is a multiple of 3 but also the last index, it must not appear twice
        assert_eq!(indices(&downsample(&route(10), 3)).len(), 4);
        assert_eq!(indices(&downsample(&route(11), 3)), vec![0, 3, 6, 9, 10]);
        assert_eq!(indices(&downsample(&route(5), 10)), vec![0, 4]);
    }

    #[test]
    fn short_routes_and_small_strides_are_unchanged() {
        for len in 0..=2 {
            assert_eq!(downsample(&route(len), 3), route(len));
        }
        assert_eq!(downsample(&route(7), 1), route(7));
        assert_eq!(downsample(&route(7), 0), route(7));
    }

    #[test]
    fn endpoints_are_always_kept() {
        for len in 3..40 {
            for stride in 2..8 {
                let sampled = downsample(&route(len), stride);
                assert_eq!(sampled.first(), route(len).first());
                assert_eq!(sampled.last(), route(len).last());
            }
        }
    }
}
