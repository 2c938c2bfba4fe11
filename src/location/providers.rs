//! Location providers: the network-inferred tier, Nominatim reverse
//! geocoding, and the built-in heuristic default table.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{AddressDetails, Location, LocationError, LocationSource};

/// Identifies this tool to the public endpoints it queries.
pub const USER_AGENT: &str = "CareCompass/0.3 (nearby-facility-discovery)";

/// Accuracy attributed to IP-derived positions, in meters.
pub const NETWORK_ACCURACY_M: f64 = 10_000.0;

/// Accuracy attributed to timezone-derived positions, in meters.
pub const HEURISTIC_ACCURACY_M: f64 = 50_000.0;

// ─── Network-inferred tier ──────────────────────────────────────

/// A service that estimates the caller's position from its public IP.
///
/// The resolver consults implementations in order; each failure falls
/// through to the next provider.
pub trait NetworkLocator: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// One position estimate, bounded by `timeout`.
    fn locate(&self, timeout: Duration) -> Result<Location, LocationError>;
}

/// Providers consulted by default, in priority order.
pub fn default_network_providers() -> Vec<Box<dyn NetworkLocator>> {
    vec![Box::new(IpapiCo), Box::new(IpApiCom), Box::new(IpWhoIs)]
}

fn network_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
) -> Result<Location, LocationError> {
    let latitude = latitude.ok_or(LocationError::Incomplete("latitude"))?;
    let longitude = longitude.ok_or(LocationError::Incomplete("longitude"))?;
    Ok(Location::new(latitude, longitude, LocationSource::NetworkInferred)?
        .with_accuracy(NETWORK_ACCURACY_M)
        .with_place(city, region, country))
}

fn get_json<T: serde::de::DeserializeOwned>(
    url: &str,
    timeout: Duration,
) -> Result<T, LocationError> {
    ureq::get(url)
        .set("User-Agent", USER_AGENT)
        .timeout(timeout)
        .call()
        .map_err(|e| LocationError::Network(e.to_string()))?
        .into_json::<T>()
        .map_err(|e| LocationError::InvalidResponse(e.to_string()))
}

/// `ipapi.co` JSON endpoint. Flat schema, full-word field names.
pub struct IpapiCo;

#[derive(Debug, Deserialize)]
struct IpapiCoResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
}

impl NetworkLocator for IpapiCo {
    fn name(&self) -> &'static str {
        "ipapi.co"
    }

    fn locate(&self, timeout: Duration) -> Result<Location, LocationError> {
        let body: IpapiCoResponse = get_json("https://ipapi.co/json/", timeout)?;
        network_location(
            body.latitude,
            body.longitude,
            body.city,
            body.region,
            body.country_name,
        )
    }
}

/// `ip-api.com` JSON endpoint. Abbreviated fields plus a status flag.
pub struct IpApiCom;

#[derive(Debug, Deserialize)]
struct IpApiComResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

impl NetworkLocator for IpApiCom {
    fn name(&self) -> &'static str {
        "ip-api.com"
    }

    fn locate(&self, timeout: Duration) -> Result<Location, LocationError> {
        let body: IpApiComResponse = get_json("http://ip-api.com/json/", timeout)?;
        if body.status.as_deref() != Some("success") {
            return Err(LocationError::InvalidResponse(format!(
                "ip-api.com status: {}",
                body.status.as_deref().unwrap_or("missing")
            )));
        }
        network_location(body.lat, body.lon, body.city, body.region_name, body.country)
    }
}

/// `ipwho.is` JSON endpoint. Full-word fields plus a success flag.
pub struct IpWhoIs;

#[derive(Debug, Deserialize)]
struct IpWhoIsResponse {
    success: Option<bool>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

impl NetworkLocator for IpWhoIs {
    fn name(&self) -> &'static str {
        "ipwho.is"
    }

    fn locate(&self, timeout: Duration) -> Result<Location, LocationError> {
        let body: IpWhoIsResponse = get_json("https://ipwho.is/", timeout)?;
        if body.success == Some(false) {
            return Err(LocationError::InvalidResponse(
                "ipwho.is reported failure".to_string(),
            ));
        }
        network_location(
            body.latitude,
            body.longitude,
            body.city,
            body.region,
            body.country,
        )
    }
}

// ─── Reverse geocoding (Nominatim) ──────────────────────────────

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: String,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    suburb: Option<String>,
    village: Option<String>,
    town: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    /// Smaller places report `town` or `village` instead of `city`.
    fn locality(self) -> (Option<String>, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>) {
        (
            self.road,
            self.suburb,
            self.city.or(self.town).or(self.village),
            self.state,
            self.postcode,
            self.country,
        )
    }
}

/// Resolves a coordinate to a human-readable address via Nominatim.
pub fn reverse_geocode(
    latitude: f64,
    longitude: f64,
    timeout: Duration,
) -> Result<AddressDetails, LocationError> {
    let url = format!(
        "https://nominatim.openstreetmap.org/reverse?lat={}&lon={}&format=json&zoom=16&addressdetails=1",
        latitude, longitude
    );
    let body: NominatimReverse = get_json(&url, timeout)?;
    let (road, suburb, city, state, postcode, country) = body.address.locality();
    Ok(AddressDetails {
        display_name: body.display_name,
        road,
        suburb,
        city,
        state,
        postcode,
        country,
    })
}

// ─── Heuristic default tier ─────────────────────────────────────

/// A representative city for an IANA timezone.
#[derive(Debug, Clone, Serialize)]
pub struct RegionDefault {
    pub timezone: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Used when no timezone hint is available or none of the mappings match.
pub const FIXED_DEFAULT: RegionDefault = RegionDefault {
    timezone: "Asia/Kolkata",
    city: "Delhi",
    country: "India",
    latitude: 28.6139,
    longitude: 77.2090,
};

#[rustfmt::skip]
const REGION_DEFAULTS: &[RegionDefault] = &[
    RegionDefault { timezone: "Asia/Kolkata",        city: "Delhi",        country: "India",                latitude: 28.6139,  longitude: 77.2090 },
    RegionDefault { timezone: "Asia/Karachi",        city: "Karachi",      country: "Pakistan",             latitude: 24.8607,  longitude: 67.0011 },
    RegionDefault { timezone: "Asia/Dhaka",          city: "Dhaka",        country: "Bangladesh",           latitude: 23.8103,  longitude: 90.4125 },
    RegionDefault { timezone: "Asia/Riyadh",         city: "Riyadh",       country: "Saudi Arabia",         latitude: 24.7136,  longitude: 46.6753 },
    RegionDefault { timezone: "Asia/Dubai",          city: "Dubai",        country: "United Arab Emirates", latitude: 25.2048,  longitude: 55.2708 },
    RegionDefault { timezone: "Asia/Tehran",         city: "Tehran",       country: "Iran",                 latitude: 35.6892,  longitude: 51.3890 },
    RegionDefault { timezone: "Asia/Tokyo",          city: "Tokyo",        country: "Japan",                latitude: 35.6762,  longitude: 139.6503 },
    RegionDefault { timezone: "Asia/Shanghai",       city: "Shanghai",     country: "China",                latitude: 31.2304,  longitude: 121.4737 },
    RegionDefault { timezone: "Asia/Jakarta",        city: "Jakarta",      country: "Indonesia",            latitude: -6.2088,  longitude: 106.8456 },
    RegionDefault { timezone: "Asia/Kuala_Lumpur",   city: "Kuala Lumpur", country: "Malaysia",             latitude: 3.1390,   longitude: 101.6869 },
    RegionDefault { timezone: "Asia/Singapore",      city: "Singapore",    country: "Singapore",            latitude: 1.3521,   longitude: 103.8198 },
    RegionDefault { timezone: "Europe/London",       city: "London",       country: "United Kingdom",       latitude: 51.5074,  longitude: -0.1278 },
    RegionDefault { timezone: "Europe/Paris",        city: "Paris",        country: "France",               latitude: 48.8566,  longitude: 2.3522 },
    RegionDefault { timezone: "Europe/Berlin",       city: "Berlin",       country: "Germany",              latitude: 52.5200,  longitude: 13.4050 },
    RegionDefault { timezone: "Europe/Stockholm",    city: "Stockholm",    country: "Sweden",               latitude: 59.3293,  longitude: 18.0686 },
    RegionDefault { timezone: "Europe/Istanbul",     city: "Istanbul",     country: "Turkey",               latitude: 41.0082,  longitude: 28.9784 },
    RegionDefault { timezone: "Europe/Moscow",       city: "Moscow",       country: "Russia",               latitude: 55.7558,  longitude: 37.6173 },
    RegionDefault { timezone: "Africa/Cairo",        city: "Cairo",        country: "Egypt",                latitude: 30.0444,  longitude: 31.2357 },
    RegionDefault { timezone: "Africa/Lagos",        city: "Lagos",        country: "Nigeria",              latitude: 6.5244,   longitude: 3.3792 },
    RegionDefault { timezone: "Africa/Nairobi",      city: "Nairobi",      country: "Kenya",                latitude: -1.2921,  longitude: 36.8219 },
    RegionDefault { timezone: "America/New_York",    city: "New York",     country: "United States",        latitude: 40.7128,  longitude: -74.0060 },
    RegionDefault { timezone: "America/Chicago",     city: "Chicago",      country: "United States",        latitude: 41.8781,  longitude: -87.6298 },
    RegionDefault { timezone: "America/Los_Angeles", city: "Los Angeles",  country: "United States",        latitude: 34.0522,  longitude: -118.2437 },
    RegionDefault { timezone: "America/Mexico_City", city: "Mexico City",  country: "Mexico",               latitude: 19.4326,  longitude: -99.1332 },
    RegionDefault { timezone: "America/Sao_Paulo",   city: "Sao Paulo",    country: "Brazil",               latitude: -23.5505, longitude: -46.6333 },
    RegionDefault { timezone: "Australia/Sydney",    city: "Sydney",       country: "Australia",            latitude: -33.8688, longitude: 151.2093 },
    RegionDefault { timezone: "Pacific/Auckland",    city: "Auckland",     country: "New Zealand",          latitude: -36.8485, longitude: 174.7633 },
];

/// The full timezone-to-city mapping, for listings and diagnostics.
pub fn region_defaults() -> &'static [RegionDefault] {
    REGION_DEFAULTS
}

/// True when `hint` names a zone chrono-tz knows about.
pub fn is_known_timezone(hint: &str) -> bool {
    hint.parse::<chrono_tz::Tz>().is_ok()
}

fn lookup_region(hint: &str) -> Option<&'static RegionDefault> {
    REGION_DEFAULTS
        .iter()
        .find(|entry| entry.timezone.eq_ignore_ascii_case(hint))
}

/// Last-resort position that always succeeds.
///
/// Maps the timezone hint to a representative city, falling back to one
/// fixed default when the hint is absent or unmapped.
pub fn heuristic_default(tz_hint: Option<&str>) -> Location {
    let region = tz_hint.and_then(lookup_region).unwrap_or(&FIXED_DEFAULT);
    Location {
        latitude: region.latitude,
        longitude: region.longitude,
        accuracy_m: Some(HEURISTIC_ACCURACY_M),
        source: LocationSource::HeuristicDefault,
        city: Some(region.city.to_string()),
        region: None,
        country: Some(region.country.to_string()),
        resolved_at: chrono::Utc::now(),
    }
}
