use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use cache::{FileStore, MemoryStore, PersistentStore, DEFAULT_TTL_HOURS};
use trajectory::StitchStrategy;

pub const DEFAULT_SAMPLING_RATE: usize = 3;
pub const DEFAULT_TICK_MS: u64 = 16;
pub const DEFAULT_SETTLE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Downsampling stride for the rendered routes.
    pub sampling_rate: usize,
    pub tick_interval: Duration,
    /// Pause between the last frame and the clock going idle.
    pub settle_delay: Duration,
    pub cache_ttl: chrono::Duration,
    /// Persistent tier on disk. Kept in memory when unset.
    pub cache_file: Option<PathBuf>,
    pub stitch: StitchStrategy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            sampling_rate: DEFAULT_SAMPLING_RATE,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
            cache_ttl: chrono::Duration::hours(DEFAULT_TTL_HOURS),
            cache_file: None,
            stitch: StitchStrategy::default(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid value '{value}' for {name}.");
            default
        }),
        Err(_) => default,
    }
}

/// Intervals must be non-zero for `tokio::time::interval`.
fn tick_interval(millis: u64) -> Duration {
    if millis == 0 {
        log::warn!("Ignoring tick interval of 0 ms, using {DEFAULT_TICK_MS} ms.");
        return Duration::from_millis(DEFAULT_TICK_MS);
    }
    Duration::from_millis(millis)
}

fn cache_ttl(hours: i64) -> chrono::Duration {
    match chrono::Duration::try_hours(hours).filter(|_| hours >= 0) {
        Some(ttl) => ttl,
        None => {
            log::warn!("Ignoring cache TTL of {hours} hours, using {DEFAULT_TTL_HOURS} hours.");
            chrono::Duration::hours(DEFAULT_TTL_HOURS)
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        let stitch = match env::var("TRAJECTORY_STITCH") {
            Ok(name) => StitchStrategy::from_name(&name).unwrap_or_else(|| {
                log::warn!("Ignoring unknown stitch strategy '{name}'.");
                StitchStrategy::default()
            }),
            Err(_) => StitchStrategy::default(),
        };
        Self {
            sampling_rate: env_or("TRAJECTORY_SAMPLING_RATE", DEFAULT_SAMPLING_RATE),
            tick_interval: tick_interval(env_or("TRAJECTORY_TICK_MS", DEFAULT_TICK_MS)),
            settle_delay: Duration::from_millis(env_or(
                "TRAJECTORY_SETTLE_MS",
                DEFAULT_SETTLE_MS,
            )),
            cache_ttl: cache_ttl(env_or("TRAJECTORY_CACHE_TTL_HOURS", DEFAULT_TTL_HOURS)),
            cache_file: env::var("TRAJECTORY_CACHE_FILE")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            stitch,
        }
    }

    pub fn persistent_store(&self) -> Box<dyn PersistentStore> {
        match &self.cache_file {
            Some(path) => {
                log::info!("Caching trajectories in '{}'.", path.display());
                Box::new(FileStore::new(path))
            }
            None => Box::new(MemoryStore::new()),
        }
    }
}
