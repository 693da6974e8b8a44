use std::env;
use std::sync::Arc;

use cache::TrajectoryCache;
use model::{source::city_preset, Source, SourceDraft};
use playback::{runner, Viewer, ViewerConfig};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracker::{TrackerClient, TrackerConfig};

/// Plays the trajectories of the default sources, or of the cities named on
/// the command line, and logs where the followed source drifts.
#[tokio::main]
async fn main() {
    env_logger::init();

    let tracker_config = TrackerConfig::from_env();
    let viewer_config = ViewerConfig::from_env();
    let client = TrackerClient::new(tracker_config).expect("could not build tracker client.");

    let sources = env::args()
        .skip(1)
        .filter_map(|name| match city_preset(&name) {
            Some(city) => Some(SourceDraft::from(city)),
            None => {
                log::warn!("Skipping unknown city '{name}'.");
                None
            }
        })
        .enumerate()
        .map(|(index, draft)| Source::from_draft(draft, index))
        .collect::<Vec<_>>();
    let cache = Arc::new(TrajectoryCache::with_ttl(
        viewer_config.persistent_store(),
        viewer_config.cache_ttl,
    ));
    let mut viewer = Viewer::with_sources(sources, cache, Arc::new(client), viewer_config);

    viewer.fetch_all().await;
    if let Some(error) = viewer.error() {
        log::error!("{error}");
    }
    for (_, state) in viewer.sources() {
        log::info!("{}: {}", state.source.name, state.track.points_info());
    }
    if let Err(why) = viewer.toggle_animation() {
        log::warn!("{why}");
        return;
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let viewer = Mutex::new(viewer);
    let mut followed = 0usize;
    runner::run(&viewer, cancel, &mut |latitude: f64, longitude: f64| {
        followed += 1;
        log::debug!("Following {latitude:.4},{longitude:.4}.");
    })
    .await;

    let viewer = viewer.lock().await;
    if let Some((latitude, longitude)) = viewer.center_on_follow_target() {
        log::info!("Animation ended at {latitude:.4},{longitude:.4} after {followed} moves.");
    }
}
