//! Normalization of raw geospatial elements into canonical facilities.
//!
//! Provider tag vocabulary stops here; everything downstream works with
//! the [`Facility`] shape only.

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;

use crate::geo;

use super::query::RawElement;
use super::types::{Facility, FacilityType, Ownership, SourceProvenance};

/// Hospitals without an explicit emergency tag are assumed to take
/// emergencies; everything else is assumed not to.
pub fn normalize_element<R: Rng>(
    element: &RawElement,
    origin_lat: f64,
    origin_lng: f64,
    rng: &mut R,
) -> Option<Facility> {
    let (latitude, longitude) = element.coordinates()?;
    if !geo::is_valid_coordinate(latitude, longitude) {
        return None;
    }

    let facility_type = infer_type(element);
    let name = resolve_name(element, facility_type);
    let ownership = infer_ownership(element);
    let has_emergency = match element.tag("emergency") {
        Some("yes") => true,
        Some("no") => false,
        _ => facility_type == FacilityType::Hospital,
    };
    let open_24x7 = element.tag("opening_hours") == Some("24/7")
        || (facility_type == FacilityType::Hospital && has_emergency);
    let distance_km = geo::haversine_km(origin_lat, origin_lng, latitude, longitude);
    let rating = heuristic_rating(facility_type, element, has_emergency, distance_km, rng);

    Some(Facility {
        id: element.source_id(),
        name,
        address: assemble_address(element),
        latitude,
        longitude,
        distance_km,
        phone: element
            .tag("phone")
            .or_else(|| element.tag("contact:phone"))
            .map(str::to_string),
        website: element
            .tag("website")
            .or_else(|| element.tag("contact:website"))
            .map(str::to_string),
        facility_type,
        ownership,
        specialties: extract_specialties(element, facility_type),
        services: derive_services(element, facility_type, has_emergency),
        has_emergency,
        open_24x7,
        rating,
        verified: true,
        provenance: SourceProvenance::LiveExternal,
        last_updated: Some(Utc::now()),
    })
}

fn infer_type(element: &RawElement) -> FacilityType {
    match element.tag("amenity") {
        Some("hospital") => return FacilityType::Hospital,
        Some("clinic") => return FacilityType::Clinic,
        Some("doctors") => return FacilityType::DoctorOffice,
        Some("pharmacy") => return FacilityType::Pharmacy,
        _ => {}
    }
    match element.tag("healthcare") {
        Some("hospital") => FacilityType::Hospital,
        Some("clinic") => FacilityType::Clinic,
        Some("doctor") | Some("doctors") => FacilityType::DoctorOffice,
        Some("pharmacy") => FacilityType::Pharmacy,
        Some(_) => FacilityType::MedicalCentre,
        None => FacilityType::Unknown,
    }
}

/// Name fallback chain: explicit name, English name, operator, then the
/// type-derived generic ("Medical Facility" for unknown types).
fn resolve_name(element: &RawElement, facility_type: FacilityType) -> String {
    element
        .tag("name")
        .or_else(|| element.tag("name:en"))
        .or_else(|| element.tag("operator"))
        .map(str::to_string)
        .unwrap_or_else(|| facility_type.generic_name().to_string())
}

const GOVERNMENT_MARKERS: &[&str] = &["government", "govt", "civil", "district", "municipal", "community health"];
const PRIVATE_MARKERS: &[&str] = &["private", "pvt"];

fn infer_ownership(element: &RawElement) -> Ownership {
    match element.tag("operator:type") {
        Some("government") | Some("public") => return Ownership::Government,
        Some("private") => return Ownership::Private,
        _ => {}
    }
    let mut haystack = element.tag("operator").unwrap_or("").to_lowercase();
    if let Some(name) = element.tag("name") {
        haystack.push(' ');
        haystack.push_str(&name.to_lowercase());
    }
    if GOVERNMENT_MARKERS.iter().any(|m| haystack.contains(m)) {
        Ownership::Government
    } else if PRIVATE_MARKERS.iter().any(|m| haystack.contains(m)) {
        Ownership::Private
    } else {
        Ownership::Unknown
    }
}

fn default_specialties(facility_type: FacilityType) -> Vec<String> {
    let defaults: &[&str] = match facility_type {
        FacilityType::Hospital => &["General Medicine", "Emergency Medicine"],
        FacilityType::Clinic | FacilityType::MedicalCentre => &["General Medicine"],
        FacilityType::DoctorOffice => &["General Practice"],
        FacilityType::Pharmacy | FacilityType::Unknown => &[],
    };
    defaults.iter().map(|s| s.to_string()).collect()
}

/// Specialties from the semicolon-delimited tag, or a minimal inferred
/// set when the tag is absent.
fn extract_specialties(element: &RawElement, facility_type: FacilityType) -> Vec<String> {
    let parsed: Vec<String> = element
        .tag("healthcare:speciality")
        .map(|raw| {
            raw.split(';')
                .map(|s| titlecase_token(s.trim()))
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let mut list = if parsed.is_empty() {
        default_specialties(facility_type)
    } else {
        parsed
    };
    list.sort();
    list.dedup();
    list
}

fn titlecase_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut at_word_start = true;
    for c in token.chars() {
        if c == '_' || c == ' ' {
            out.push(' ');
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn derive_services(
    element: &RawElement,
    facility_type: FacilityType,
    has_emergency: bool,
) -> Vec<String> {
    let mut services: Vec<String> = match facility_type {
        FacilityType::Hospital => vec!["Outpatient Services".into()],
        FacilityType::Clinic | FacilityType::MedicalCentre | FacilityType::DoctorOffice => {
            vec!["Consultations".into()]
        }
        FacilityType::Pharmacy => vec!["Prescription Filling".into()],
        FacilityType::Unknown => vec![],
    };
    if has_emergency {
        services.push("Emergency Care".into());
    }
    if element.tag("dispensing") == Some("yes") {
        services.push("Medication Dispensing".into());
    }
    if element.tag("vaccination") == Some("yes") || element.tag("healthcare") == Some("vaccination_centre") {
        services.push("Vaccination".into());
    }
    if element.tag("healthcare") == Some("laboratory") {
        services.push("Diagnostic Laboratory".into());
    }
    services.sort();
    services.dedup();
    services
}

const ADDRESS_KEYS: &[&str] = &[
    "addr:housenumber",
    "addr:street",
    "addr:suburb",
    "addr:city",
    "addr:district",
    "addr:state",
    "addr:postcode",
];

/// Assembles free-text address from whatever structured parts exist.
fn assemble_address(element: &RawElement) -> String {
    if let Some(full) = element.tag("addr:full") {
        return full.to_string();
    }
    let parts: Vec<&str> = ADDRESS_KEYS
        .iter()
        .filter_map(|key| element.tag(key))
        .filter(|v| !v.is_empty())
        .collect();
    if parts.is_empty() {
        "Address not available".to_string()
    } else {
        parts.join(", ")
    }
}

/// Display rating in [1.0, 5.0] from type, notable tags, and proximity,
/// with a small random perturbation for variety.
///
/// This is a cosmetic heuristic, not a quality signal; callers must
/// present it accordingly.
pub fn heuristic_rating<R: Rng>(
    facility_type: FacilityType,
    element: &RawElement,
    has_emergency: bool,
    distance_km: f64,
    rng: &mut R,
) -> f64 {
    let base = match facility_type {
        FacilityType::Hospital => 3.9,
        FacilityType::MedicalCentre => 3.7,
        FacilityType::Clinic => 3.6,
        FacilityType::DoctorOffice => 3.5,
        FacilityType::Pharmacy => 3.4,
        FacilityType::Unknown => 3.0,
    };
    let mut score = base;
    if has_emergency {
        score += 0.3;
    }
    if element.tag("dispensing") == Some("yes") {
        score += 0.2;
    }
    if element.tag("healthcare") == Some("laboratory") {
        score += 0.2;
    }
    // Closer facilities score slightly higher, fading out at 10 km.
    score += ((10.0 - distance_km).max(0.0) / 10.0) * 0.3;
    score += rng.gen_range(-0.2..=0.2);
    (score.clamp(1.0, 5.0) * 10.0).round() / 10.0
}

fn dedup_key(facility: &Facility) -> (String, i64, i64) {
    let name: String = facility
        .name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    (
        name,
        (facility.latitude * 1000.0).round() as i64,
        (facility.longitude * 1000.0).round() as i64,
    )
}

/// Removes duplicates: same normalized name and coordinates equal at
/// 3-decimal precision. The entry with the strictly higher
/// [`info_score`](Facility::info_score) wins; otherwise the earlier one
/// stays. Input order is preserved, and the operation is idempotent.
pub fn dedup_facilities(list: Vec<Facility>) -> Vec<Facility> {
    let mut seen: HashMap<(String, i64, i64), usize> = HashMap::new();
    let mut out: Vec<Facility> = Vec::with_capacity(list.len());
    for facility in list {
        let key = dedup_key(&facility);
        match seen.get(&key) {
            Some(&index) => {
                if facility.info_score() > out[index].info_score() {
                    out[index] = facility;
                }
            }
            None => {
                seen.insert(key, out.len());
                out.push(facility);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn element(kind: &str, id: u64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> RawElement {
        let tag_map: serde_json::Map<String, serde_json::Value> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        serde_json::from_value(json!({
            "type": kind,
            "id": id,
            "lat": lat,
            "lon": lon,
            "tags": tag_map,
        }))
        .unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn normalize(e: &RawElement) -> Facility {
        normalize_element(e, 30.3747, 76.1434, &mut rng()).unwrap()
    }

    #[test]
    fn test_name_chain_explicit_name() {
        let e = element("node", 1, 30.38, 76.15, &[
            ("amenity", "hospital"),
            ("name", "Civil Hospital Nabha"),
        ]);
        assert_eq!(normalize(&e).name, "Civil Hospital Nabha");
    }

    #[test]
    fn test_name_chain_operator_fallback() {
        let e = element("node", 2, 30.38, 76.15, &[
            ("amenity", "clinic"),
            ("operator", "District Health Board"),
        ]);
        assert_eq!(normalize(&e).name, "District Health Board");
    }

    #[test]
    fn test_name_chain_generic_fallback() {
        let pharmacy = element("node", 3, 30.38, 76.15, &[("amenity", "pharmacy")]);
        assert_eq!(normalize(&pharmacy).name, "Pharmacy");

        let untyped = element("node", 4, 30.38, 76.15, &[]);
        assert_eq!(normalize(&untyped).name, "Medical Facility");
    }

    #[test]
    fn test_type_inference() {
        let cases = [
            (vec![("amenity", "hospital")], FacilityType::Hospital),
            (vec![("amenity", "clinic")], FacilityType::Clinic),
            (vec![("amenity", "doctors")], FacilityType::DoctorOffice),
            (vec![("amenity", "pharmacy")], FacilityType::Pharmacy),
            (vec![("healthcare", "doctor")], FacilityType::DoctorOffice),
            (vec![("healthcare", "physiotherapist")], FacilityType::MedicalCentre),
            (vec![], FacilityType::Unknown),
        ];
        for (tags, expected) in cases {
            let e = element("node", 5, 30.38, 76.15, &tags);
            assert_eq!(infer_type(&e), expected, "tags {:?}", tags);
        }
    }

    #[test]
    fn test_ownership_inference() {
        let tagged = element("node", 6, 30.38, 76.15, &[("operator:type", "government")]);
        assert_eq!(infer_ownership(&tagged), Ownership::Government);

        let by_name = element("node", 7, 30.38, 76.15, &[
            ("amenity", "hospital"),
            ("name", "Civil Hospital Nabha"),
        ]);
        assert_eq!(infer_ownership(&by_name), Ownership::Government);

        let private = element("node", 8, 30.38, 76.15, &[
            ("name", "Sharma Pvt Clinic"),
        ]);
        assert_eq!(infer_ownership(&private), Ownership::Private);

        let unknown = element("node", 9, 30.38, 76.15, &[("name", "Sunrise Clinic")]);
        assert_eq!(infer_ownership(&unknown), Ownership::Unknown);
    }

    #[test]
    fn test_specialties_from_tag() {
        let e = element("node", 10, 30.38, 76.15, &[
            ("amenity", "hospital"),
            ("healthcare:speciality", "cardiology;orthopaedics; paediatrics"),
        ]);
        let f = normalize(&e);
        assert_eq!(f.specialties, vec!["Cardiology", "Orthopaedics", "Paediatrics"]);
    }

    #[test]
    fn test_specialty_defaults_per_type() {
        let hospital = element("node", 11, 30.38, 76.15, &[("amenity", "hospital")]);
        assert_eq!(
            normalize(&hospital).specialties,
            vec!["Emergency Medicine", "General Medicine"]
        );

        let doctors = element("node", 12, 30.38, 76.15, &[("amenity", "doctors")]);
        assert_eq!(normalize(&doctors).specialties, vec!["General Practice"]);

        let pharmacy = element("node", 13, 30.38, 76.15, &[("amenity", "pharmacy")]);
        assert!(normalize(&pharmacy).specialties.is_empty());
    }

    #[test]
    fn test_services_from_tags() {
        let e = element("node", 14, 30.38, 76.15, &[
            ("amenity", "pharmacy"),
            ("dispensing", "yes"),
        ]);
        let f = normalize(&e);
        assert!(f.services.contains(&"Medication Dispensing".to_string()));
        assert!(f.services.contains(&"Prescription Filling".to_string()));
    }

    #[test]
    fn test_address_assembly() {
        let structured = element("node", 15, 30.38, 76.15, &[
            ("addr:street", "Patiala Road"),
            ("addr:city", "Nabha"),
            ("addr:postcode", "147201"),
        ]);
        assert_eq!(normalize(&structured).address, "Patiala Road, Nabha, 147201");

        let bare = element("node", 16, 30.38, 76.15, &[("amenity", "clinic")]);
        assert_eq!(normalize(&bare).address, "Address not available");
    }

    #[test]
    fn test_emergency_and_24x7_inference() {
        let hospital = element("node", 17, 30.38, 76.15, &[("amenity", "hospital")]);
        let f = normalize(&hospital);
        assert!(f.has_emergency);
        assert!(f.open_24x7);

        let no_emergency = element("node", 18, 30.38, 76.15, &[
            ("amenity", "hospital"),
            ("emergency", "no"),
        ]);
        let f = normalize(&no_emergency);
        assert!(!f.has_emergency);
        assert!(!f.open_24x7);

        let all_day_pharmacy = element("node", 19, 30.38, 76.15, &[
            ("amenity", "pharmacy"),
            ("opening_hours", "24/7"),
        ]);
        assert!(normalize(&all_day_pharmacy).open_24x7);
    }

    #[test]
    fn test_rating_stays_in_bounds() {
        let mut r = rng();
        for distance in [0.0, 2.5, 9.9, 25.0, 50.0] {
            for tags in [vec![("amenity", "hospital"), ("emergency", "yes")], vec![]] {
                let e = element("node", 20, 30.38, 76.15, &tags);
                let rating = heuristic_rating(infer_type(&e), &e, true, distance, &mut r);
                assert!((1.0..=5.0).contains(&rating), "rating {} out of bounds", rating);
                assert_eq!(rating, (rating * 10.0).round() / 10.0, "rating not 1dp");
            }
        }
    }

    #[test]
    fn test_rating_deterministic_for_fixed_seed() {
        let e = element("node", 21, 30.38, 76.15, &[("amenity", "hospital")]);
        let a = heuristic_rating(FacilityType::Hospital, &e, true, 1.2, &mut rng());
        let b = heuristic_rating(FacilityType::Hospital, &e, true, 1.2, &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_distance_computed_from_origin() {
        let e = element("node", 22, 30.3747, 76.1434, &[("amenity", "clinic")]);
        let f = normalize(&e);
        assert!(f.distance_km.abs() < 1e-9);
    }

    #[test]
    fn test_skips_invalid_or_missing_coordinates() {
        let no_coords: RawElement = serde_json::from_value(json!({
            "type": "relation",
            "id": 23,
            "tags": {"name": "Hospital Grounds"}
        }))
        .unwrap();
        assert!(normalize_element(&no_coords, 30.0, 76.0, &mut rng()).is_none());
    }

    fn quick_facility(name: &str, lat: f64, lng: f64, phone: Option<&str>) -> Facility {
        Facility {
            id: format!("node/{}", name),
            name: name.to_string(),
            address: "Address not available".into(),
            latitude: lat,
            longitude: lng,
            distance_km: 1.0,
            phone: phone.map(str::to_string),
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
    fn test_dedup_richer_entry_wins() {
        // Both coordinate pairs round to (30.375, 76.143) at 3 decimals.
        let list = vec![
            quick_facility("City Clinic", 30.3747, 76.1434, None),
            quick_facility("CITY CLINIC.", 30.3749, 76.1432, Some("+91 1765 220000")),
        ];
        let deduped = dedup_facilities(list);
        assert_eq!(deduped.len(), 1);
        assert!(deduped[0].phone.is_some());
    }

    #[test]
    fn test_dedup_keeps_earlier_on_tie() {
        let first = quick_facility("City Clinic", 30.3747, 76.1434, None);
        let second = quick_facility("city clinic", 30.3747, 76.1434, None);
        let deduped = dedup_facilities(vec![first.clone(), second]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, first.id);
    }

    #[test]
    fn test_dedup_respects_coordinate_precision() {
        // 30.374 vs 30.376 round differently at 3 decimals.
        let list = vec![
            quick_facility("City Clinic", 30.374, 76.1434, None),
            quick_facility("City Clinic", 30.376, 76.1434, None),
        ];
        assert_eq!(dedup_facilities(list).len(), 2);
    }

    #[test]
    fn test_dedup_idempotent_and_order_preserving() {
        let list = vec![
            quick_facility("Alpha Clinic", 30.3747, 76.1434, None),
            quick_facility("Beta Clinic", 30.3800, 76.1500, Some("+91 1765 220001")),
            quick_facility("alpha clinic", 30.3747, 76.1434, Some("+91 1765 220002")),
        ];
        let once = dedup_facilities(list);
        let names: Vec<&str> = once.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alpha clinic", "Beta Clinic"]);

        let twice = dedup_facilities(once.clone());
        assert_eq!(
            serde_json::to_string(&twice).unwrap(),
            serde_json::to_string(&once).unwrap()
        );
    }
}
