use model::{ColoredSegment, Point, Route};
use trajectory::{colored_segments, downsample};

/// Playback state of one source: its full route, the downsampled route that
/// is drawn, and a frame counter on the full route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    route: Route,
    downsampled: Route,
    frame: usize,
    loading: bool,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the route and rewinds to the first frame.
    pub fn set_route(&mut self, route: Route, stride: usize) {
        self.downsampled = downsample(&route, stride);
        self.route = route;
        self.frame = 0;
    }

    pub fn resample(&mut self, stride: usize) {
        self.downsampled = downsample(&self.route, stride);
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn downsampled(&self) -> &Route {
        &self.downsampled
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn last_frame(&self) -> usize {
        self.route.len().saturating_sub(1)
    }

    pub fn is_animatable(&self) -> bool {
        self.route.len() > 1
    }

    /// Moves one frame forward unless the end of the route is reached.
    pub fn advance(&mut self) -> bool {
        if self.frame < self.last_frame() {
            self.frame += 1;
            true
        } else {
            false
        }
    }

    pub fn rewind(&mut self) {
        self.frame = 0;
    }

    /// The full-resolution frame mapped into the downsampled route,
    /// `floor(frame * downsampled_len / full_len)` clamped to its last index.
    pub fn scaled_index(&self) -> Option<usize> {
        let full = self.route.len();
        let sampled = self.downsampled.len();
        if full == 0 || sampled == 0 {
            return None;
        }
        Some((self.frame * sampled / full).min(sampled - 1))
    }

    pub fn visible_prefix(&self) -> &[Point] {
        match self.scaled_index() {
            Some(index) => &self.downsampled[..=index],
            None => &[],
        }
    }

    /// Current animated position on the drawn route.
    pub fn head(&self) -> Option<&Point> {
        self.visible_prefix().last()
    }

    /// Current position on the full-resolution route.
    pub fn full_head(&self) -> Option<&Point> {
        self.route.get(self.frame)
    }

    /// Tooltip summary such as `4/10 points (40%)`.
    pub fn points_info(&self) -> String {
        let total = self.route.len();
        if total == 0 {
            return "No data".to_owned();
        }
        let sampled = self.downsampled.len();
        let percent = (sampled as f64 / total as f64 * 100.0).round();
        format!("{sampled}/{total} points ({percent}%)")
    }

    pub fn colored_segments(&self) -> Vec<ColoredSegment> {
        colored_segments(&self.downsampled)
    }

    /// Colored runs of the visible prefix that can be drawn as a line.
    pub fn visible_segments(&self) -> Vec<ColoredSegment> {
        colored_segments(self.visible_prefix())
            .into_iter()
            .filter(|segment| segment.points.len() >= 2)
            .collect()
    }
}
