use chrono::{DateTime, Duration, Utc};
use model::Route;
use serde::{Deserialize, Serialize};

use crate::Result;

/// What the persistent tier holds for one coordinate:
/// `{ "data": [...points], "timestamp": <epoch millis> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Route,
    #[serde(with = "utility::serde::epoch_millis")]
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: Route, timestamp: DateTime<Utc>) -> Self {
        Self { data, timestamp }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.timestamp > ttl
    }

    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use model::{Point, SegmentKind};

    use super::*;

    #[test]
    fn entries_expire_strictly_after_the_ttl() {
        let stored_at = Utc.timestamp_millis_opt(1_000_000).unwrap();
        let entry = CacheEntry::new(Route::empty(), stored_at);
        let ttl = Duration::hours(24);

        assert!(!entry.is_expired(stored_at, ttl));
        assert!(!entry.is_expired(stored_at + ttl, ttl));
        assert!(entry.is_expired(stored_at + ttl + Duration::milliseconds(1), ttl));
    }

    #[test]
    fn entries_are_stored_as_text() {
        let route = Route::new(vec![Point::new(24.1, 54.1, SegmentKind::Shore)]);
        let entry = CacheEntry::new(route, Utc.timestamp_millis_opt(42).unwrap());

        let text = entry.to_text().unwrap();
        assert_eq!(
            text,
            r#"{"data":[{"lat":24.1,"lon":54.1,"segment":"shore"}],"timestamp":42}"#
        );
        assert_eq!(CacheEntry::from_text(&text).unwrap(), entry);
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        assert!(matches!(
            CacheEntry::from_text("{not json"),
            Err(crate::StoreError::Serialization(_))
        ));
    }
}
