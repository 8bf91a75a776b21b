//! Core types - platform-independent data structures
//!
//! These types describe a detected creature and the geographic points the
//! filter measures between.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

// =============================================================================
// GEO POINT
// =============================================================================

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True if both coordinates are finite and inside their valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoPointParseError {
    #[error("expected \"lat,lng\", got {0:?}")]
    Format(String),
    #[error("coordinates out of range: {0}")]
    OutOfRange(String),
}

impl FromStr for GeoPoint {
    type Err = GeoPointParseError;

    /// Parse `"lat,lng"`, e.g. `"40.7128,-74.0060"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoPointParseError::Format(s.to_string()))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| GeoPointParseError::Format(s.to_string()))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| GeoPointParseError::Format(s.to_string()))?;

        let point = GeoPoint::new(lat, lng);
        if !point.is_valid() {
            return Err(GeoPointParseError::OutOfRange(s.to_string()));
        }
        Ok(point)
    }
}

// =============================================================================
// CREATURE EVENT
// =============================================================================

/// A creature sighting handed to the filter
///
/// `id` is the numeric species id kept as text so it can be compared
/// against ignore lists directly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatureEvent {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Unix timestamp (seconds) at which the creature despawns
    pub disappear_time: i64,
}

#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event has an empty name")]
    EmptyName,
    #[error("event coordinates out of range: {0}")]
    InvalidCoordinates(GeoPoint),
}

impl CreatureEvent {
    pub fn new(id: impl Into<String>, name: &str, lat: f64, lng: f64, disappear_time: i64) -> Self {
        Self {
            id: id.into(),
            name: name.trim().to_string(),
            lat,
            lng,
            disappear_time,
        }
    }

    /// Parse and validate a single JSON event object
    pub fn from_json(json: &str) -> Result<Self, EventParseError> {
        let event: CreatureEvent = serde_json::from_str(json)?;
        if event.name.is_empty() {
            return Err(EventParseError::EmptyName);
        }
        if !event.position().is_valid() {
            return Err(EventParseError::InvalidCoordinates(event.position()));
        }
        Ok(event)
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Accept `"id": 16`, `"id": -3`, `"id": 16.0` and `"id": "16"`.
/// Floats keep their fractional part (`16.0`).
fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
        RawId::Float(f) => format!("{f:?}"),
        RawId::Text(s) => s.trim().to_string(),
    })
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_from_str() {
        let p: GeoPoint = "40.0,-75.0".parse().unwrap();
        assert_eq!(p, GeoPoint::new(40.0, -75.0));

        let p: GeoPoint = " 51.5 , -0.12 ".parse().unwrap();
        assert_eq!(p, GeoPoint::new(51.5, -0.12));
    }

    #[test]
    fn test_geo_point_from_str_rejects_garbage() {
        assert!(matches!(
            "40.0".parse::<GeoPoint>(),
            Err(GeoPointParseError::Format(_))
        ));
        assert!(matches!(
            "north,west".parse::<GeoPoint>(),
            Err(GeoPointParseError::Format(_))
        ));
        assert!(matches!(
            "91.0,0.0".parse::<GeoPoint>(),
            Err(GeoPointParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_event_from_json_numeric_id() {
        let event = CreatureEvent::from_json(
            r#"{"id": 19, "name": " Rattata ", "lat": 40.001, "lng": -75.001, "disappear_time": 1469000000}"#,
        )
        .unwrap();
        assert_eq!(event.id, "19");
        assert_eq!(event.name, "Rattata");
        assert_eq!(event.disappear_time, 1_469_000_000);
    }

    #[test]
    fn test_event_from_json_string_id() {
        let event = CreatureEvent::from_json(
            r#"{"id": "16", "name": "Pidgey", "lat": 0.0, "lng": 0.0, "disappear_time": 0}"#,
        )
        .unwrap();
        assert_eq!(event.id, "16");
    }

    #[test]
    fn test_event_from_json_float_and_negative_ids() {
        let event = CreatureEvent::from_json(
            r#"{"id": 16.0, "name": "Pidgey", "lat": 0.0, "lng": 0.0, "disappear_time": 0}"#,
        )
        .unwrap();
        assert_eq!(event.id, "16.0");

        let event = CreatureEvent::from_json(
            r#"{"id": -3, "name": "Missingno", "lat": 0.0, "lng": 0.0, "disappear_time": 0}"#,
        )
        .unwrap();
        assert_eq!(event.id, "-3");
    }

    #[test]
    fn test_event_from_json_errors() {
        assert!(matches!(
            CreatureEvent::from_json("{not json"),
            Err(EventParseError::Json(_))
        ));
        assert!(matches!(
            CreatureEvent::from_json(
                r#"{"id": 1, "name": "  ", "lat": 0.0, "lng": 0.0, "disappear_time": 0}"#
            ),
            Err(EventParseError::EmptyName)
        ));
        assert!(matches!(
            CreatureEvent::from_json(
                r#"{"id": 1, "name": "Zubat", "lat": 120.0, "lng": 0.0, "disappear_time": 0}"#
            ),
            Err(EventParseError::InvalidCoordinates(_))
        ));
    }
}
