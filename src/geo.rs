//! Spherical geometry primitives: great-circle distance, coordinate
//! validation, and destination-point projection.
//!
//! Everything here is pure math on WGS84-ish decimal degrees; no I/O,
//! no allocation beyond return values.

use std::f64::consts::PI;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Great-circle distance between two points in kilometers (Haversine).
///
/// Symmetric in its arguments; zero for identical points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = to_radians(lat1);
    let lat2_rad = to_radians(lat2);
    let dlat = to_radians(lat2 - lat1);
    let dlng = to_radians(lng2 - lng1);

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Bounds check for a latitude/longitude pair.
///
/// Rejects NaN and infinities; accepts the closed ranges
/// [-90, 90] and [-180, 180].
pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

/// Point reached by travelling `distance_km` from (`lat`, `lng`) along
/// the initial bearing `bearing_deg` (degrees clockwise from north).
///
/// Used to scatter synthetic facilities around a search origin.
pub fn destination_point(lat: f64, lng: f64, bearing_deg: f64, distance_km: f64) -> (f64, f64) {
    let lat1 = to_radians(lat);
    let lng1 = to_radians(lng);
    let bearing = to_radians(bearing_deg);
    let angular = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    // Normalize longitude to [-180, 180]
    let lng2_deg = (to_degrees(lng2) + 540.0) % 360.0 - 180.0;
    (to_degrees(lat2), lng2_deg)
}

/// Round a coordinate to `decimals` places.
///
/// Cache keys use 4 decimals (~11 m), dedup keys use 3 (~110 m).
pub fn round_coord(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DELHI: (f64, f64) = (28.6139, 77.2090);
    const MUMBAI: (f64, f64) = (19.0760, 72.8777);

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_km(DELHI.0, DELHI.1, DELHI.0, DELHI.1), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let ab = haversine_km(DELHI.0, DELHI.1, MUMBAI.0, MUMBAI.1);
        let ba = haversine_km(MUMBAI.0, MUMBAI.1, DELHI.0, DELHI.1);
        assert_relative_eq!(ab, ba, epsilon = 1e-9);
    }

    #[test]
    fn test_haversine_delhi_mumbai() {
        // Known distance is roughly 1150-1180 km
        let d = haversine_km(DELHI.0, DELHI.1, MUMBAI.0, MUMBAI.1);
        assert!(d > 1150.0 && d < 1180.0, "Delhi-Mumbai distance off: {} km", d);
    }

    #[test]
    fn test_haversine_short_hop() {
        // ~1.11 km per 0.01 degree of latitude
        let d = haversine_km(30.0, 76.0, 30.01, 76.0);
        assert!((d - 1.11).abs() < 0.02, "got {}", d);
    }

    #[test]
    fn test_valid_coordinates() {
        assert!(is_valid_coordinate(0.0, 0.0));
        assert!(is_valid_coordinate(-90.0, -180.0));
        assert!(is_valid_coordinate(90.0, 180.0));
        assert!(is_valid_coordinate(30.3747, 76.1434));
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(!is_valid_coordinate(90.1, 0.0));
        assert!(!is_valid_coordinate(-90.1, 0.0));
        assert!(!is_valid_coordinate(0.0, 180.1));
        assert!(!is_valid_coordinate(0.0, -180.1));
        assert!(!is_valid_coordinate(999.0, 77.0));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::NAN));
        assert!(!is_valid_coordinate(f64::INFINITY, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::NEG_INFINITY));
    }

    #[test]
    fn test_destination_point_distance_roundtrip() {
        // Destination at bearing B and distance D must be ~D away
        for bearing in [0.0, 45.0, 90.0, 135.0, 180.0, 270.0] {
            let (lat, lng) = destination_point(30.3747, 76.1434, bearing, 5.0);
            let d = haversine_km(30.3747, 76.1434, lat, lng);
            assert_relative_eq!(d, 5.0, epsilon = 0.01);
        }
    }

    #[test]
    fn test_destination_point_north() {
        let (lat, lng) = destination_point(28.0, 77.0, 0.0, 10.0);
        assert!(lat > 28.0);
        assert_relative_eq!(lng, 77.0, epsilon = 1e-6);
    }

    #[test]
    fn test_destination_point_stays_in_bounds() {
        let (lat, lng) = destination_point(89.9, 179.9, 45.0, 50.0);
        assert!(is_valid_coordinate(lat, lng));
    }

    #[test]
    fn test_round_coord() {
        assert_eq!(round_coord(28.613941, 4), 28.6139);
        assert_eq!(round_coord(28.61396, 4), 28.614);
        assert_eq!(round_coord(-76.14349, 3), -76.143);
        assert_eq!(round_coord(12.0, 3), 12.0);
    }
}
