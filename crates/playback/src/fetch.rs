use std::sync::Arc;

use cache::TrajectoryCache;
use futures::future::join_all;
use model::{CoordinateKey, Route, Source};
use tracker::{ApiError, TrajectoryFeed};
use trajectory::StitchStrategy;
use utility::id::Id;

/// A source as it looked when its fetch was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub id: Id<Source>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl FetchRequest {
    pub fn new(id: Id<Source>, source: &Source) -> Self {
        Self {
            id,
            name: source.name.clone(),
            latitude: source.latitude,
            longitude: source.longitude,
        }
    }

    pub fn coordinate_key(&self) -> CoordinateKey {
        CoordinateKey::new(self.latitude, self.longitude)
    }
}

/// Fetches detached from the viewer, so they can run without holding it.
pub struct FetchBatch {
    cache: Arc<TrajectoryCache<ApiError>>,
    feed: Arc<dyn TrajectoryFeed>,
    strategy: StitchStrategy,
    requests: Vec<FetchRequest>,
}

pub type FetchResults = Vec<(Id<Source>, Result<Route, ApiError>)>;

impl FetchBatch {
    pub fn new(
        cache: Arc<TrajectoryCache<ApiError>>,
        feed: Arc<dyn TrajectoryFeed>,
        strategy: StitchStrategy,
        requests: Vec<FetchRequest>,
    ) -> Self {
        Self {
            cache,
            feed,
            strategy,
            requests,
        }
    }

    pub fn requests(&self) -> &[FetchRequest] {
        &self.requests
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Resolves every request concurrently and returns once all are done.
    pub async fn run(self) -> FetchResults {
        let Self {
            cache,
            feed,
            strategy,
            requests,
        } = self;
        let cache = &cache;
        let feed = &feed;

        join_all(requests.into_iter().map(|request| async move {
            let route = fetch_route(cache, Arc::clone(feed), strategy, &request).await;
            (request.id, route)
        }))
        .await
    }
}

async fn fetch_route(
    cache: &TrajectoryCache<ApiError>,
    feed: Arc<dyn TrajectoryFeed>,
    strategy: StitchStrategy,
    request: &FetchRequest,
) -> Result<Route, ApiError> {
    let FetchRequest {
        name,
        latitude,
        longitude,
        ..
    } = request;
    let (latitude, longitude) = (*latitude, *longitude);

    let result = cache
        .get_or_fetch(&request.coordinate_key(), move || async move {
            log::info!("Fetching trajectory for {latitude},{longitude}.");
            let data = feed.fetch(latitude, longitude).await?;
            Ok::<_, ApiError>(trajectory::build_route(&data, latitude, longitude, strategy))
        })
        .await;

    match &result {
        Ok(route) => log::info!(
            "Trajectory for '{name}' has {} points over {:.1} km.",
            route.len(),
            route.length_km()
        ),
        Err(why) => log::error!("Error fetching trajectory for '{name}': {why}"),
    }
    result
}
