//! Core types for the location subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo;
use crate::location::sensor::SensorError;

/// Which provider tier produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    /// Platform location sensor (GPS-grade).
    DeviceSensor,
    /// IP-geolocation lookup (city-grade).
    NetworkInferred,
    /// Built-in timezone/region table (country-grade).
    HeuristicDefault,
    /// Coordinates supplied directly by the caller.
    Manual,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceSensor => write!(f, "device sensor"),
            Self::NetworkInferred => write!(f, "network"),
            Self::HeuristicDefault => write!(f, "heuristic default"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A resolved geographic position with provenance.
///
/// Immutable once constructed: a new resolution produces a new value,
/// never mutates an old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated accuracy radius in meters, when the provider reports one.
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    pub source: LocationSource,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl Location {
    /// Construct a location, validating coordinate bounds.
    pub fn new(latitude: f64, longitude: f64, source: LocationSource) -> Result<Self, LocationError> {
        if !geo::is_valid_coordinate(latitude, longitude) {
            return Err(LocationError::InvalidCoordinate { latitude, longitude });
        }
        Ok(Self {
            latitude,
            longitude,
            accuracy_m: None,
            source,
            city: None,
            region: None,
            country: None,
            resolved_at: Utc::now(),
        })
    }

    /// A caller-supplied position (CLI `--lat/--lon`, API query params).
    pub fn manual(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        Self::new(latitude, longitude, LocationSource::Manual)
    }

    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy_m = Some(meters);
        self
    }

    pub fn with_place(
        mut self,
        city: Option<String>,
        region: Option<String>,
        country: Option<String>,
    ) -> Self {
        self.city = city;
        self.region = region;
        self.country = country;
        self
    }

    /// One-line summary for stderr banners.
    pub fn display_line(&self) -> String {
        let place = match (&self.city, &self.country) {
            (Some(city), Some(country)) => format!("{}, {}", city, country),
            (Some(city), None) => city.clone(),
            (None, Some(country)) => country.clone(),
            (None, None) => "unknown place".to_string(),
        };
        let accuracy = match self.accuracy_m {
            Some(m) if m >= 1000.0 => format!(" (±{:.0} km)", m / 1000.0),
            Some(m) => format!(" (±{:.0} m)", m),
            None => String::new(),
        };
        format!(
            "{} — {:.4}, {:.4}{} via {}",
            place, self.latitude, self.longitude, accuracy, self.source
        )
    }
}

/// Reverse-geocoded address components. Pure enrichment: absence never
/// fails a resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressDetails {
    pub display_name: String,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Location resolution errors.
///
/// `LocationResolver::resolve` absorbs all of these internally; they
/// surface only from constructors given bad input, or to describe why a
/// single tier was skipped.
#[derive(Debug)]
pub enum LocationError {
    InvalidCoordinate { latitude: f64, longitude: f64 },
    Sensor(SensorError),
    Network(String),
    InvalidResponse(String),
    /// Provider answered but the payload was missing latitude/longitude.
    Incomplete(&'static str),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoordinate { latitude, longitude } => {
                write!(f, "Invalid coordinates ({}, {}): lat must be -90..90, lng -180..180", latitude, longitude)
            }
            Self::Sensor(e) => write!(f, "Device sensor: {}", e),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid provider response: {}", msg),
            Self::Incomplete(field) => write!(f, "Provider response missing {}", field),
        }
    }
}

impl std::error::Error for LocationError {}

impl From<SensorError> for LocationError {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_new_valid() {
        let loc = Location::new(30.3747, 76.1434, LocationSource::DeviceSensor).unwrap();
        assert_eq!(loc.latitude, 30.3747);
        assert_eq!(loc.source, LocationSource::DeviceSensor);
        assert!(loc.accuracy_m.is_none());
    }

    #[test]
    fn test_location_new_rejects_out_of_range() {
        assert!(Location::new(999.0, 77.0, LocationSource::Manual).is_err());
        assert!(Location::new(0.0, -181.0, LocationSource::Manual).is_err());
        assert!(Location::new(f64::NAN, 0.0, LocationSource::Manual).is_err());
    }

    #[test]
    fn test_with_place_and_accuracy() {
        let loc = Location::new(19.0760, 72.8777, LocationSource::NetworkInferred)
            .unwrap()
            .with_accuracy(10_000.0)
            .with_place(Some("Mumbai".into()), Some("Maharashtra".into()), Some("India".into()));
        assert_eq!(loc.city.as_deref(), Some("Mumbai"));
        assert_eq!(loc.accuracy_m, Some(10_000.0));
    }

    #[test]
    fn test_display_line() {
        let loc = Location::new(28.6139, 77.2090, LocationSource::HeuristicDefault)
            .unwrap()
            .with_accuracy(50_000.0)
            .with_place(Some("Delhi".into()), None, Some("India".into()));
        let line = loc.display_line();
        assert!(line.contains("Delhi, India"));
        assert!(line.contains("±50 km"));
        assert!(line.contains("heuristic default"));
    }

    #[test]
    fn test_location_serializes() {
        let loc = Location::new(30.0, 76.0, LocationSource::DeviceSensor).unwrap();
        let json = serde_json::to_string(&loc).unwrap();
        assert!(json.contains("\"DeviceSensor\""));
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back.latitude, 30.0);
    }
}
