use std::error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use model::TrajectoryData;

pub mod client;

pub use client::{TrackerClient, TrackerConfig};

/// Anything able to deliver raw trajectory data for a coordinate.
#[async_trait]
pub trait TrajectoryFeed: Send + Sync {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<TrajectoryData, ApiError>;
}

#[derive(Debug, Clone)]
pub enum ApiError {
    RequestError(Arc<reqwest::Error>),
    JsonError(Arc<serde_json::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
        response: Option<String>,
    },
    Other(String),
}

impl error::Error for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            ApiError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            ApiError::InvalidResponse { status_code, .. } => {
                write!(f, "API error: {}", status_code.as_u16())
            }
            ApiError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::RequestError(Arc::new(e))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::JsonError(Arc::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_responses_read_like_the_status_notice() {
        let error = ApiError::InvalidResponse {
            status_code: reqwest::StatusCode::BAD_GATEWAY,
            url: "https://example.invalid/trash_trajectory".to_owned(),
            response: None,
        };
        assert_eq!(error.to_string(), "API error: 502");
    }

    #[test]
    fn json_errors_convert() {
        let why = serde_json::from_str::<TrajectoryData>("[").unwrap_err();
        let error: ApiError = why.into();
        assert!(matches!(error, ApiError::JsonError(_)));
        assert!(error.to_string().starts_with("JSON parse error"));
    }
}
