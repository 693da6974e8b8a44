use std::fmt;

use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};
use uuid::Uuid;

pub const DEFAULT_LATITUDE: f64 = 24.4539;
pub const DEFAULT_LONGITUDE: f64 = 54.3773;

/// Colors handed out to manually added sources, `PALETTE[count % 10]`.
pub const PALETTE: [&str; 10] = [
    "#3498db", "#2ecc71", "#f39c12", "#e74c3c", "#9b59b6", "#1abc9c", "#f1c40f",
    "#d35400", "#8e44ad", "#16a085",
];

/// (name, latitude, longitude, color)
pub const DEFAULT_SOURCES: [(&str, f64, f64, &str); 5] = [
    ("Abu Dhabi", DEFAULT_LATITUDE, DEFAULT_LONGITUDE, "#007bff"),
    ("Dubai", 25.2048, 55.2708, "#dc3545"),
    ("Doha", 25.276987, 51.520008, "#6610f2"),
    ("Muscat", 23.5880, 58.3829, "#fd7e14"),
    ("Fujairah", 25.1288, 56.3265, "#e83e8c"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityPreset {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const fn city(name: &'static str, latitude: f64, longitude: f64) -> CityPreset {
    CityPreset {
        name,
        latitude,
        longitude,
    }
}

pub const CITY_PRESETS: &[CityPreset] = &[
    city("Abu Dhabi", 24.4539, 54.3773),
    city("Dubai", 25.2048, 55.2708),
    city("Doha", 25.2854, 51.5310),
    city("Manama", 26.2285, 50.5860),
    city("Kuwait City", 29.3759, 47.9774),
    city("Muscat", 23.5880, 58.3829),
    city("Fujairah", 25.1288, 56.3265),
    city("Ras Al Khaimah", 25.7895, 55.9432),
    city("Jeddah", 21.4858, 39.1925),
    city("Aqaba", 29.5266, 35.0078),
    city("Beirut", 33.8938, 35.5018),
    city("Alexandria", 31.2001, 29.9187),
    city("Port Said", 31.2565, 32.2841),
    city("Istanbul", 41.0082, 28.9784),
    city("Antalya", 36.8969, 30.7133),
    city("Aden", 12.7797, 45.0095),
    city("Dammam", 26.4344, 50.1033),
    city("Basra", 30.5085, 47.7804),
    city("Latakia", 35.5384, 35.7959),
    city("Madrid", 40.4168, -3.7038),
    city("Barcelona", 41.3851, 2.1734),
    city("Marseille", 43.2965, 5.3698),
    city("New York City", 40.7128, -74.0060),
    city("Miami", 25.7617, -80.1918),
    city("Rio de Janeiro", -22.9068, -43.1729),
    city("Lisbon", 38.7223, -9.1393),
    city("Singapore", 1.3521, 103.8198),
    city("Sydney", -33.8688, 151.2093),
    city("Tokyo", 35.6762, 139.6503),
];

pub fn city_preset(name: &str) -> Option<&'static CityPreset> {
    CITY_PRESETS
        .iter()
        .find(|city| city.name.eq_ignore_ascii_case(name))
}

/// A named origin from which debris trajectories are requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub color: String,
}

impl HasId for Source {
    type IdType = String;
}

impl Source {
    pub fn generate_id() -> Id<Source> {
        Id::new(Uuid::new_v4().to_string())
    }

    /// Builds a source from a partial override. `existing` is the number of
    /// sources already present and picks the default name and color.
    pub fn from_draft(draft: SourceDraft, existing: usize) -> Self {
        Self {
            name: draft
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("Source {}", existing + 1)),
            latitude: draft.latitude.unwrap_or(DEFAULT_LATITUDE),
            longitude: draft.longitude.unwrap_or(DEFAULT_LONGITUDE),
            color: draft
                .color
                .filter(|color| !color.is_empty())
                .unwrap_or_else(|| PALETTE[existing % PALETTE.len()].to_owned()),
        }
    }

    pub fn defaults() -> Vec<Source> {
        DEFAULT_SOURCES
            .iter()
            .map(|(name, latitude, longitude, color)| Source {
                name: (*name).to_owned(),
                latitude: *latitude,
                longitude: *longitude,
                color: (*color).to_owned(),
            })
            .collect()
    }

    pub fn coordinate_key(&self) -> CoordinateKey {
        CoordinateKey::new(self.latitude, self.longitude)
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDraft {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub color: Option<String>,
}

impl From<&CityPreset> for SourceDraft {
    fn from(city: &CityPreset) -> Self {
        Self {
            name: Some(city.name.to_owned()),
            latitude: Some(city.latitude),
            longitude: Some(city.longitude),
            color: None,
        }
    }
}

/// `"<latitude>,<longitude>"` of a source at the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoordinateKey(String);

impl CoordinateKey {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(format!("{latitude},{longitude}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
