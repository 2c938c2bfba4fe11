//! Canonical facility shapes produced by the search engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad category of a medical facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityType {
    Hospital,
    Clinic,
    DoctorOffice,
    Pharmacy,
    MedicalCentre,
    Unknown,
}

impl FacilityType {
    /// Display name used when an element carries no name of its own.
    pub fn generic_name(&self) -> &'static str {
        match self {
            Self::Hospital => "Hospital",
            Self::Clinic => "Clinic",
            Self::DoctorOffice => "Doctor's Office",
            Self::Pharmacy => "Pharmacy",
            Self::MedicalCentre => "Medical Centre",
            Self::Unknown => "Medical Facility",
        }
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generic_name())
    }
}

/// Who operates a facility, as far as the tags reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    Government,
    Private,
    Unknown,
}

/// Where a facility record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceProvenance {
    /// Returned by the live geospatial database.
    LiveExternal,
    /// Generated locally because no live data was available.
    SyntheticFallback,
}

/// One medical facility near a search origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// Stable within its source ("node/123", "synthetic/1").
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Great-circle distance from the search origin. Recomputed for every
    /// query, never reused across origins.
    pub distance_km: f64,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub facility_type: FacilityType,
    pub ownership: Ownership,
    pub specialties: Vec<String>,
    pub services: Vec<String>,
    pub has_emergency: bool,
    pub open_24x7: bool,
    /// Display heuristic in [1.0, 5.0]. Not derived from review data and
    /// never to be presented as a genuine quality signal.
    pub rating: f64,
    pub verified: bool,
    pub provenance: SourceProvenance,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Facility {
    /// How much optional detail this record carries. Duplicate resolution
    /// keeps the entry with the strictly higher score.
    pub fn info_score(&self) -> usize {
        let mut score = self.specialties.len();
        if self.phone.is_some() {
            score += 1;
        }
        if self.website.is_some() {
            score += 1;
        }
        score
    }
}

/// Failure modes of the external geospatial query.
#[derive(Debug)]
pub enum TransportError {
    /// HTTP 429 from the endpoint.
    RateLimited,
    /// Any other HTTP error status.
    Http(u16),
    Timeout,
    Network(String),
    InvalidBody(String),
}

impl TransportError {
    /// Transient failures are retried; the rest fail the query outright.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited | Self::Timeout | Self::Network(_) => true,
            Self::Http(code) => *code >= 500,
            Self::InvalidBody(_) => false,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limited (HTTP 429)"),
            Self::Http(code) => write!(f, "HTTP status {}", code),
            Self::Timeout => write!(f, "request timed out"),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::InvalidBody(msg) => write!(f, "invalid response body: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_facility() -> Facility {
        Facility {
            id: "node/1".into(),
            name: "Test Clinic".into(),
            address: "Address not available".into(),
            latitude: 30.37,
            longitude: 76.14,
            distance_km: 1.5,
            phone: None,
            website: None,
            facility_type: FacilityType::Clinic,
            ownership: Ownership::Unknown,
            specialties: vec![],
            services: vec![],
            has_emergency: false,
            open_24x7: false,
            rating: 3.5,
            verified: true,
            provenance: SourceProvenance::LiveExternal,
            last_updated: None,
        }
    }

    #[test]
    fn test_generic_names() {
        assert_eq!(FacilityType::Hospital.generic_name(), "Hospital");
        assert_eq!(FacilityType::Unknown.generic_name(), "Medical Facility");
        assert_eq!(FacilityType::DoctorOffice.to_string(), "Doctor's Office");
    }

    #[test]
    fn test_info_score_counts_optional_detail() {
        let bare = bare_facility();
        assert_eq!(bare.info_score(), 0);

        let mut rich = bare_facility();
        rich.phone = Some("+91 1765 220000".into());
        rich.website = Some("https://example.org".into());
        rich.specialties = vec!["Cardiology".into(), "Orthopaedics".into()];
        assert_eq!(rich.info_score(), 4);
        assert!(rich.info_score() > bare.info_score());
    }

    #[test]
    fn test_transient_classification() {
        assert!(TransportError::RateLimited.is_transient());
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::Network("reset".into()).is_transient());
        assert!(TransportError::Http(503).is_transient());
        assert!(!TransportError::Http(400).is_transient());
        assert!(!TransportError::InvalidBody("not json".into()).is_transient());
    }

    #[test]
    fn test_facility_serde_roundtrip() {
        let f = bare_facility();
        let json = serde_json::to_string(&f).unwrap();
        let back: Facility = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, f.id);
        assert_eq!(back.facility_type, f.facility_type);
        assert_eq!(back.provenance, SourceProvenance::LiveExternal);
    }
}
