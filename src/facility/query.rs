//! Query construction and the raw element schema of the geospatial
//! database (Overpass API).

use serde::Deserialize;
use std::collections::HashMap;

/// Amenity values that count as medical facilities.
const AMENITY_FILTER: &str = "hospital|clinic|doctors|pharmacy";

/// Server-side evaluation budget embedded in the query, in seconds.
pub const SERVER_TIMEOUT_S: u32 = 25;

/// Overpass QL for every facility-like element within `radius_m` of a
/// point. The database has no unified medical category, so the query
/// unions the individual amenity values with generically tagged
/// healthcare elements.
pub fn build_query(latitude: f64, longitude: f64, radius_m: u32) -> String {
    format!(
        "[out:json][timeout:{timeout}];\n\
         (\n\
         \x20 node[\"amenity\"~\"{amenity}\"](around:{r},{lat},{lng});\n\
         \x20 way[\"amenity\"~\"{amenity}\"](around:{r},{lat},{lng});\n\
         \x20 node[\"healthcare\"](around:{r},{lat},{lng});\n\
         \x20 way[\"healthcare\"](around:{r},{lat},{lng});\n\
         );\n\
         out center;",
        timeout = SERVER_TIMEOUT_S,
        amenity = AMENITY_FILTER,
        r = radius_m,
        lat = latitude,
        lng = longitude,
    )
}

/// Top-level response envelope.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

/// One tagged node, way, or relation as the database returns it.
///
/// Field names here are the provider's, not ours; nothing outside this
/// module should see them.
#[derive(Debug, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Centroid reported for ways and relations under `out center`.
#[derive(Debug, Deserialize)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl RawElement {
    /// Nodes carry coordinates directly; ways and relations report a
    /// center instead.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.center.as_ref().map(|c| (c.lat, c.lon)),
        }
    }

    /// Identifier stable within the source database.
    pub fn source_id(&self) -> String {
        format!("{}/{}", self.kind, self.id)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// True when the element names itself or its operator. A response
    /// with no named elements at all is treated as unusable.
    pub fn is_named(&self) -> bool {
        self.tags.contains_key("name")
            || self.tags.contains_key("name:en")
            || self.tags.contains_key("operator")
    }
}
