//! The operations a map front end drives: source editing, fetching, playback
//! control and follow tracking. Rendering itself happens elsewhere.

use std::sync::Arc;

use cache::TrajectoryCache;
use indexmap::IndexMap;
use model::{source::city_preset, ColoredSegment, Route, Source, SourceDraft};
use tracker::{ApiError, TrajectoryFeed};
use utility::id::Id;

use crate::{
    clock::{AnimationClock, ClockState, TickOutcome},
    config::ViewerConfig,
    fetch::{FetchBatch, FetchRequest, FetchResults},
    track::Track,
    Position, ViewerError,
};

pub const CACHES_CLEARED: &str = "All trajectory caches cleared";

#[derive(Debug, Clone, PartialEq)]
pub struct SourceState {
    pub source: Source,
    pub track: Track,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceField {
    Name(String),
    Latitude(f64),
    Longitude(f64),
    Color(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Set when the followed position moved during this tick.
    pub follow: Option<Position>,
}

pub struct Viewer {
    sources: IndexMap<Id<Source>, SourceState>,
    cache: Arc<TrajectoryCache<ApiError>>,
    feed: Arc<dyn TrajectoryFeed>,
    config: ViewerConfig,
    clock: AnimationClock,
    follow: Option<Id<Source>>,
    last_follow_position: Option<Position>,
    error: Option<String>,
}

impl Viewer {
    /// A viewer over the default sources with a cache built from `config`.
    pub fn new(feed: Arc<dyn TrajectoryFeed>, config: ViewerConfig) -> Self {
        let cache = Arc::new(TrajectoryCache::with_ttl(
            config.persistent_store(),
            config.cache_ttl,
        ));
        Self::with_default_sources(cache, feed, config)
    }

    pub fn with_default_sources(
        cache: Arc<TrajectoryCache<ApiError>>,
        feed: Arc<dyn TrajectoryFeed>,
        config: ViewerConfig,
    ) -> Self {
        Self::with_sources(Source::defaults(), cache, feed, config)
    }

    /// Falls back to the default sources when `sources` is empty.
    pub fn with_sources(
        sources: Vec<Source>,
        cache: Arc<TrajectoryCache<ApiError>>,
        feed: Arc<dyn TrajectoryFeed>,
        config: ViewerConfig,
    ) -> Self {
        let sources = if sources.is_empty() {
            Source::defaults()
        } else {
            sources
        };
        let sources = sources
            .into_iter()
            .map(|source| {
                let state = SourceState {
                    source,
                    track: Track::new(),
                };
                (Source::generate_id(), state)
            })
            .collect::<IndexMap<_, _>>();
        let follow = sources.keys().next().cloned();

        Self {
            sources,
            cache,
            feed,
            config,
            clock: AnimationClock::new(),
            follow,
            last_follow_position: None,
            error: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TrajectoryCache<ApiError>> {
        &self.cache
    }

    pub fn sources(&self) -> impl Iterator<Item = (&Id<Source>, &SourceState)> {
        self.sources.iter()
    }

    pub fn source(&self, id: &Id<Source>) -> Option<&SourceState> {
        self.sources.get(id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Message of the most recent failed fetch, cleared by the next full fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn state_mut(&mut self, id: &Id<Source>) -> Result<&mut SourceState, ViewerError> {
        self.sources
            .get_mut(id)
            .ok_or_else(|| ViewerError::UnknownSource(id.to_string()))
    }

    /// Appends a source and returns the fetch for its route.
    pub fn add_source(&mut self, draft: SourceDraft) -> (Id<Source>, FetchBatch) {
        let source = Source::from_draft(draft, self.sources.len());
        let id = Source::generate_id();
        log::info!(
            "Adding source '{}' at {},{}.",
            source.name,
            source.latitude,
            source.longitude
        );

        let request = FetchRequest::new(id.clone(), &source);
        let mut track = Track::new();
        track.set_loading(true);
        self.sources.insert(id.clone(), SourceState { source, track });
        (id.clone(), self.batch(vec![request]))
    }

    pub fn add_city_source(&mut self, city: &str) -> Result<(Id<Source>, FetchBatch), ViewerError> {
        let preset = city_preset(city).ok_or_else(|| {
            log::warn!("No preset for city '{city}'.");
            ViewerError::UnknownCity(city.to_owned())
        })?;
        Ok(self.add_source(SourceDraft::from(preset)))
    }

    /// Edits one field. The route stays as it is until the next fetch.
    pub fn update_source(&mut self, id: &Id<Source>, field: SourceField) -> Result<(), ViewerError> {
        let source = &mut self.state_mut(id)?.source;
        match field {
            SourceField::Name(name) => source.name = name,
            SourceField::Latitude(latitude) => source.latitude = latitude,
            SourceField::Longitude(longitude) => source.longitude = longitude,
            SourceField::Color(color) => source.color = color,
        }
        Ok(())
    }

    pub fn remove_source(&mut self, id: &Id<Source>) -> Result<Source, ViewerError> {
        if self.sources.len() <= 1 {
            log::warn!("Refusing to remove the last source.");
            return Err(ViewerError::LastSource);
        }
        let state = self
            .sources
            .shift_remove(id)
            .ok_or_else(|| ViewerError::UnknownSource(id.to_string()))?;
        log::info!("Removed source '{}'.", state.source.name);

        if self.follow.as_ref() == Some(id) {
            self.follow = self.sources.keys().next().cloned();
            self.last_follow_position = None;
        }
        Ok(state.source)
    }

    fn batch(&self, requests: Vec<FetchRequest>) -> FetchBatch {
        FetchBatch::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.feed),
            self.config.stitch,
            requests,
        )
    }

    /// Marks every source as loading and returns the fetch for all of them.
    pub fn begin_fetch_all(&mut self) -> FetchBatch {
        self.error = None;
        let requests = self
            .sources
            .iter_mut()
            .map(|(id, state)| {
                state.track.set_loading(true);
                FetchRequest::new(id.clone(), &state.source)
            })
            .collect();
        self.batch(requests)
    }

    pub fn begin_fetch(&mut self, id: &Id<Source>) -> Result<FetchBatch, ViewerError> {
        let state = self.state_mut(id)?;
        state.track.set_loading(true);
        let request = FetchRequest::new(id.clone(), &state.source);
        Ok(self.batch(vec![request]))
    }

    /// Installs fetched routes and rewinds their tracks. Results for sources
    /// removed in the meantime are dropped. Returns how many were installed.
    pub fn apply_fetch(&mut self, results: FetchResults) -> usize {
        let stride = self.config.sampling_rate;
        let mut applied = 0;
        for (id, result) in results {
            let Some(state) = self.sources.get_mut(&id) else {
                log::debug!("Dropping trajectory for removed source {id}.");
                continue;
            };
            let route = match result {
                Ok(route) => route,
                Err(why) => {
                    self.error = Some(why.to_string());
                    Route::empty()
                }
            };
            state.track.set_route(route, stride);
            state.track.set_loading(false);
            applied += 1;
        }
        applied
    }

    /// Fetches every source and waits for all of them.
    pub async fn fetch_all(&mut self) -> usize {
        let results = self.begin_fetch_all().run().await;
        self.apply_fetch(results)
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn is_animating(&self) -> bool {
        self.clock.is_active()
    }

    pub fn start_animation(&mut self) -> Result<(), ViewerError> {
        self.clock
            .start(self.sources.values().map(|state| &state.track))
    }

    pub fn stop_animation(&mut self) {
        self.clock.stop();
    }

    pub fn toggle_animation(&mut self) -> Result<ClockState, ViewerError> {
        self.clock
            .toggle(self.sources.values().map(|state| &state.track))
    }

    /// One animation step over every source.
    pub fn tick(&mut self) -> TickReport {
        let outcome = self
            .clock
            .tick(self.sources.values_mut().map(|state| &mut state.track));

        let position = self.follow_position();
        let follow = if position != self.last_follow_position {
            self.last_follow_position = position;
            position
        } else {
            None
        };
        TickReport { outcome, follow }
    }

    pub fn settle(&mut self) -> bool {
        self.clock.settle()
    }

    /// Empties both cache tiers and returns the notice to show.
    pub async fn clear_all_caches(&self) -> &'static str {
        self.cache.clear().await;
        CACHES_CLEARED
    }

    pub fn sampling_rate(&self) -> usize {
        self.config.sampling_rate
    }

    /// Changes the downsampling stride and resamples every loaded route.
    /// Frame counters are kept.
    pub fn set_downsample_stride(&mut self, stride: usize) {
        let stride = stride.max(1);
        self.config.sampling_rate = stride;
        for state in self.sources.values_mut() {
            state.track.resample(stride);
        }
    }

    pub fn follow_target(&self) -> Option<&Id<Source>> {
        self.follow.as_ref()
    }

    /// Follows another source and returns where the viewport should go.
    pub fn set_follow_target(&mut self, id: &Id<Source>) -> Result<Option<Position>, ViewerError> {
        if !self.sources.contains_key(id) {
            return Err(ViewerError::UnknownSource(id.to_string()));
        }
        self.follow = Some(id.clone());
        self.last_follow_position = self.follow_position();
        Ok(self.last_follow_position)
    }

    /// Animated head of the followed source, or its coordinate while it has
    /// no route.
    pub fn follow_position(&self) -> Option<Position> {
        let state = self.sources.get(self.follow.as_ref()?)?;
        Some(match state.track.head() {
            Some(point) => point.position(),
            None => (state.source.latitude, state.source.longitude),
        })
    }

    /// Position of the followed source on its full-resolution route.
    pub fn center_on_follow_target(&self) -> Option<Position> {
        let state = self.sources.get(self.follow.as_ref()?)?;
        Some(match state.track.full_head() {
            Some(point) => point.position(),
            None => (state.source.latitude, state.source.longitude),
        })
    }

    pub fn colored_segments(&self, id: &Id<Source>) -> Option<Vec<ColoredSegment>> {
        self.sources
            .get(id)
            .map(|state| state.track.colored_segments())
    }

    pub fn visible_segments(&self, id: &Id<Source>) -> Option<Vec<ColoredSegment>> {
        self.sources
            .get(id)
            .map(|state| state.track.visible_segments())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use cache::MemoryStore;
    use model::{CoordinateKey, TrajectoryData};

    use super::*;

    /// Serves an offshore line of `len` points starting at the requested
    /// coordinate. Negative latitudes fail with a 503 style error.
    struct LineFeed {
        len: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TrajectoryFeed for LineFeed {
        async fn fetch(&self, latitude: f64, longitude: f64) -> Result<TrajectoryData, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if latitude < 0.0 {
                return Err(ApiError::Other("API error: 503".to_owned()));
            }
            let latitudes = (0..self.len)
                .map(|index| Some(latitude + index as f64 * 0.1))
                .collect();
            let longitudes = (0..self.len).map(|_| Some(longitude)).collect();
            Ok(TrajectoryData {
                latitudes_offshore: Some(latitudes),
                longitudes_offshore: Some(longitudes),
                ..Default::default()
            })
        }
    }

    fn source(name: &str, latitude: f64, longitude: f64) -> Source {
        Source {
            name: name.to_owned(),
            latitude,
            longitude,
            color: "#007bff".to_owned(),
        }
    }

    fn viewer(sources: Vec<Source>, len: usize) -> (Viewer, Arc<LineFeed>) {
        let feed = Arc::new(LineFeed {
            len,
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(TrajectoryCache::new(Box::new(MemoryStore::new())));
        let config = ViewerConfig {
            sampling_rate: 1,
            ..Default::default()
        };
        let viewer = Viewer::with_sources(sources, cache, feed.clone(), config);
        (viewer, feed)
    }

    fn ids(viewer: &Viewer) -> Vec<Id<Source>> {
        viewer.sources().map(|(id, _)| id.clone()).collect()
    }

    #[test]
    fn starts_with_the_default_sources() {
        let (viewer, _) = viewer(Vec::new(), 3);
        let names = viewer
            .sources()
            .map(|(_, state)| state.source.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Abu Dhabi", "Dubai", "Doha", "Muscat", "Fujairah"]);
        assert_eq!(viewer.follow_target(), ids(&viewer).first());
        assert_eq!(viewer.follow_position(), Some((24.4539, 54.3773)));
    }

    #[test]
    fn the_last_source_can_not_be_removed() {
        let (mut viewer, _) = viewer(vec![source("a", 1.0, 1.0), source("b", 2.0, 2.0)], 3);
        let ids = ids(&viewer);

        assert_eq!(viewer.remove_source(&ids[0]).unwrap().name, "a");
        assert_eq!(viewer.follow_target(), Some(&ids[1]));
        assert_eq!(viewer.remove_source(&ids[1]), Err(ViewerError::LastSource));
        assert_eq!(viewer.len(), 1);
        assert_eq!(
            ViewerError::LastSource.to_string(),
            "You must have at least one source"
        );
    }

    #[test]
    fn added_sources_get_default_names_and_colors() {
        let (mut viewer, _) = viewer(vec![source("a", 1.0, 1.0)], 3);
        let (id, batch) = viewer.add_source(SourceDraft::default());
        assert_eq!(batch.requests().len(), 1);

        let state = viewer.source(&id).unwrap();
        assert_eq!(state.source.name, "Source 2");
        assert_eq!(state.source.color, "#2ecc71");
        assert_eq!(
            (state.source.latitude, state.source.longitude),
            (24.4539, 54.3773)
        );
        assert!(state.track.is_loading());

        let (id, _) = viewer.add_city_source("dubai").unwrap();
        assert_eq!(viewer.source(&id).unwrap().source.name, "Dubai");
        assert_eq!(
            viewer.add_city_source("Atlantis").err(),
            Some(ViewerError::UnknownCity("Atlantis".to_owned()))
        );
    }

    #[tokio::test]
    async fn fetches_install_routes_and_report_failures() {
        let (mut viewer, feed) = viewer(vec![source("a", 1.0, 1.0), source("b", -1.0, 1.0)], 4);
        let ids = ids(&viewer);

        assert_eq!(viewer.fetch_all().await, 2);
        assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
        assert_eq!(viewer.source(&ids[0]).unwrap().track.route().len(), 4);
        assert!(viewer.source(&ids[1]).unwrap().track.route().is_empty());
        assert!(!viewer.source(&ids[1]).unwrap().track.is_loading());
        assert_eq!(viewer.error(), Some("API error: 503"));

        // the healthy route is served from the session tier now
        viewer
            .update_source(&ids[1], SourceField::Latitude(1.0))
            .unwrap();
        viewer.fetch_all().await;
        assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
        assert_eq!(viewer.error(), None);
    }

    #[tokio::test]
    async fn results_for_removed_sources_are_dropped() {
        let (mut viewer, _) = viewer(vec![source("a", 1.0, 1.0), source("b", 2.0, 2.0)], 4);
        let ids = ids(&viewer);

        let batch = viewer.begin_fetch_all();
        viewer.remove_source(&ids[1]).unwrap();
        let results = batch.run().await;

        assert_eq!(viewer.apply_fetch(results), 1);
        assert_eq!(viewer.len(), 1);
        // the coordinate entry stays usable for a future source
        assert!(viewer
            .cache()
            .get(&CoordinateKey::new(2.0, 2.0))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn editing_a_source_keeps_its_route() {
        let (mut viewer, _) = viewer(vec![source("a", 1.0, 1.0)], 4);
        let id = ids(&viewer).remove(0);
        viewer.fetch_all().await;

        viewer
            .update_source(&id, SourceField::Longitude(7.0))
            .unwrap();
        viewer
            .update_source(&id, SourceField::Name("renamed".to_owned()))
            .unwrap();

        let state = viewer.source(&id).unwrap();
        assert_eq!(state.source.name, "renamed");
        assert_eq!(state.track.route().len(), 4);
        assert_eq!(state.track.route()[0].longitude, 1.0);
    }

    #[tokio::test]
    async fn animation_follows_the_target_until_exhausted() {
        let (mut viewer, _) = viewer(vec![source("a", 1.0, 1.0), source("b", 2.0, 2.0)], 3);
        let ids = ids(&viewer);

        assert_eq!(
            viewer.toggle_animation(),
            Err(ViewerError::NothingToAnimate)
        );
        viewer.fetch_all().await;
        assert_eq!(viewer.set_follow_target(&ids[1]), Ok(Some((2.0, 2.0))));
        assert_eq!(viewer.toggle_animation(), Ok(ClockState::Running));

        let report = viewer.tick();
        assert_eq!(report.outcome, TickOutcome::Advanced);
        let (latitude, longitude) = report.follow.unwrap();
        assert!((latitude - 2.1).abs() < 1e-9);
        assert_eq!(longitude, 2.0);

        assert_eq!(viewer.tick().outcome, TickOutcome::Advanced);
        let report = viewer.tick();
        assert_eq!(report.outcome, TickOutcome::Exhausted);
        assert_eq!(report.follow, None);
        assert!(viewer.is_animating());
        assert!(viewer.settle());
        assert_eq!(viewer.clock_state(), ClockState::Idle);
    }

    #[tokio::test]
    async fn follow_and_center_read_different_resolutions() {
        let (mut viewer, _) = viewer(vec![source("a", 1.0, 1.0)], 10);
        let id = ids(&viewer).remove(0);
        viewer.fetch_all().await;
        viewer.set_downsample_stride(3);

        viewer.start_animation().unwrap();
        for _ in 0..2 {
            viewer.tick();
        }
        // frame 2 maps to downsampled index floor(2 * 4 / 10) = 0
        assert_eq!(viewer.follow_position(), Some((1.0, 1.0)));
        let (latitude, _) = viewer.center_on_follow_target().unwrap();
        assert!((latitude - 1.2).abs() < 1e-9);

        assert_eq!(viewer.colored_segments(&id).unwrap().len(), 1);
        assert!(viewer.visible_segments(&id).unwrap().is_empty());
        viewer.stop_animation();
        assert_eq!(viewer.clock_state(), ClockState::Idle);
    }

    #[tokio::test]
    async fn clearing_caches_forces_a_refetch() {
        let (mut viewer, feed) = viewer(vec![source("a", 1.0, 1.0)], 3);
        viewer.fetch_all().await;
        assert_eq!(viewer.clear_all_caches().await, "All trajectory caches cleared");
        viewer.fetch_all().await;
        assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let (mut viewer, _) = viewer(Vec::new(), 3);
        let stranger = Id::new("nobody".to_owned());
        assert_eq!(
            viewer.update_source(&stranger, SourceField::Color("#000".to_owned())),
            Err(ViewerError::UnknownSource("nobody".to_owned()))
        );
        assert!(viewer.set_follow_target(&stranger).is_err());
        assert!(viewer.begin_fetch(&stranger).is_err());
        assert!(viewer.colored_segments(&stranger).is_none());
    }
}
