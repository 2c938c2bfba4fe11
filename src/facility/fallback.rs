//! Synthetic facilities for total-failure degradation.
//!
//! When every live attempt fails the UI still needs something to render.
//! These entries are clearly flagged so the presentation layer can show
//! a "sample data" badge.

use rand::Rng;

use crate::geo;

use super::types::{Facility, FacilityType, Ownership, SourceProvenance};

struct CatalogueEntry {
    name: &'static str,
    facility_type: FacilityType,
    ownership: Ownership,
    specialties: &'static [&'static str],
    services: &'static [&'static str],
    has_emergency: bool,
    open_24x7: bool,
    base_rating: f64,
}

/// A plausible mix of government and private facilities for a small
/// town and its surroundings.
const CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        name: "District Civil Hospital",
        facility_type: FacilityType::Hospital,
        ownership: Ownership::Government,
        specialties: &["General Medicine", "Emergency Medicine", "General Surgery", "Obstetrics"],
        services: &["Outpatient Services", "Emergency Care", "Ambulance"],
        has_emergency: true,
        open_24x7: true,
        base_rating: 4.0,
    },
    CatalogueEntry {
        name: "Community Health Centre",
        facility_type: FacilityType::MedicalCentre,
        ownership: Ownership::Government,
        specialties: &["General Medicine", "Paediatrics"],
        services: &["Consultations", "Vaccination"],
        has_emergency: false,
        open_24x7: false,
        base_rating: 3.7,
    },
    CatalogueEntry {
        name: "Primary Health Centre",
        facility_type: FacilityType::Clinic,
        ownership: Ownership::Government,
        specialties: &["General Medicine"],
        services: &["Consultations", "Vaccination"],
        has_emergency: false,
        open_24x7: false,
        base_rating: 3.5,
    },
    CatalogueEntry {
        name: "City Multispecialty Hospital",
        facility_type: FacilityType::Hospital,
        ownership: Ownership::Private,
        specialties: &["General Medicine", "Emergency Medicine", "Cardiology", "Orthopaedics"],
        services: &["Outpatient Services", "Emergency Care", "Diagnostic Laboratory"],
        has_emergency: true,
        open_24x7: true,
        base_rating: 4.2,
    },
    CatalogueEntry {
        name: "Family Care Clinic",
        facility_type: FacilityType::Clinic,
        ownership: Ownership::Private,
        specialties: &["General Medicine", "Paediatrics"],
        services: &["Consultations"],
        has_emergency: false,
        open_24x7: false,
        base_rating: 3.8,
    },
    CatalogueEntry {
        name: "LifeCare Pharmacy",
        facility_type: FacilityType::Pharmacy,
        ownership: Ownership::Private,
        specialties: &[],
        services: &["Prescription Filling", "Medication Dispensing"],
        has_emergency: false,
        open_24x7: false,
        base_rating: 3.6,
    },
];

/// Places the fixed catalogue at randomized bearings around the origin,
/// all within `radius_km`. `rng` controls placement and the rating
/// perturbation so tests can pin the layout.
pub fn synthetic_facilities<R: Rng>(
    origin_lat: f64,
    origin_lng: f64,
    radius_km: f64,
    rng: &mut R,
) -> Vec<Facility> {
    let max_distance = (radius_km.max(1.0) * 0.9).max(0.5);
    CATALOGUE
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let bearing = rng.gen_range(0.0..360.0);
            let distance = rng.gen_range(0.4..max_distance);
            let (latitude, longitude) =
                geo::destination_point(origin_lat, origin_lng, bearing, distance);
            let distance_km = geo::haversine_km(origin_lat, origin_lng, latitude, longitude);
            let rating = ((entry.base_rating + rng.gen_range(-0.2..=0.2)).clamp(1.0, 5.0)
                * 10.0)
                .round()
                / 10.0;
            Facility {
                id: format!("synthetic/{}", index + 1),
                name: entry.name.to_string(),
                address: format!("{:.1} km from your location", distance_km),
                latitude,
                longitude,
                distance_km,
                phone: None,
                website: None,
                facility_type: entry.facility_type,
                ownership: entry.ownership,
                specialties: entry.specialties.iter().map(|s| s.to_string()).collect(),
                services: entry.services.iter().map(|s| s.to_string()).collect(),
                has_emergency: entry.has_emergency,
                open_24x7: entry.open_24x7,
                rating,
                verified: false,
                provenance: SourceProvenance::SyntheticFallback,
                last_updated: None,
            }
        })
        .collect()
}
