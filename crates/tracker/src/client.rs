use std::env;

use async_trait::async_trait;
use model::TrajectoryData;

use crate::{ApiError, TrajectoryFeed};

pub const TRACKER_API_URL: &str = "https://tracker.toc.yt/api";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub base_url: String,
    pub proxy: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: TRACKER_API_URL.to_owned(),
            proxy: None,
        }
    }
}

impl TrackerConfig {
    /// Reads `TRACKER_API_URL` and `TRACKER_PROXY`, falling back to the
    /// public service without proxy.
    pub fn from_env() -> Self {
        let base_url = env::var("TRACKER_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| TRACKER_API_URL.to_owned());
        let proxy = env::var("TRACKER_PROXY")
            .ok()
            .filter(|proxy| !proxy.trim().is_empty());
        Self { base_url, proxy }
    }

    pub fn trajectory_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/trash_trajectory?longitude={longitude}&latitude={latitude}",
            self.base_url.trim_end_matches('/')
        )
    }
}

pub struct TrackerClient {
    pub config: TrackerConfig,
    http: reqwest::Client,
}

impl TrackerClient {
    pub fn new(config: TrackerConfig) -> Result<Self, ApiError> {
        /* build the http client with optional proxy */
        let http = if let Some(proxy_url) = &config.proxy {
            log::info!("Using proxy '{proxy_url}' for trajectory requests.");
            reqwest::Client::builder()
                .proxy(reqwest::Proxy::all(proxy_url)?)
                .build()?
        } else {
            reqwest::Client::new()
        };
        Ok(Self { config, http })
    }
}

#[async_trait]
impl TrajectoryFeed for TrackerClient {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<TrajectoryData, ApiError> {
        let url = self.config.trajectory_url(latitude, longitude);
        log::debug!("Requesting '{url}'.");

        let response = self.http.get(&url).send().await?;

        /* parse response */
        let status_code = response.status();
        if status_code.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let response = response.text().await.ok();
            Err(ApiError::InvalidResponse {
                status_code,
                url,
                response,
            })
        }
    }
}
