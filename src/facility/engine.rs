//! Facility search engine: query, retry, normalize, dedup, rank, cache.
//!
//! External failures never reach the caller. The engine degrades to the
//! synthetic catalogue instead, so `search` always returns a usable list.

use std::cmp::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cache::TtlCache;
use crate::geo;
use crate::location::providers::{heuristic_default, USER_AGENT};
use crate::location::Location;

use super::fallback;
use super::normalize;
use super::query::{self, QueryResponse};
use super::types::{Facility, TransportError};

/// Public Overpass endpoint queried in production.
pub const OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Client-side bound per attempt, slightly above the server budget.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub const MAX_ATTEMPTS: u32 = 3;
pub const BACKOFF_BASE_MS: u64 = 500;

/// Operating range for the search radius.
pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 50.0;

/// Facility lists stay valid for half an hour.
pub const SEARCH_TTL_MS: i64 = 30 * 60 * 1000;

/// Blocking transport to the geospatial database.
pub trait FacilityTransport: Send + Sync {
    fn fetch(&self, query: &str, timeout: Duration) -> Result<QueryResponse, TransportError>;
}

/// Production transport: HTTP POST to an Overpass endpoint.
pub struct OverpassHttp {
    endpoint: String,
}

impl OverpassHttp {
    pub fn new() -> Self {
        Self {
            endpoint: OVERPASS_ENDPOINT.to_string(),
        }
    }

    /// Point at an alternate endpoint (self-hosted mirror).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for OverpassHttp {
    fn default() -> Self {
        Self::new()
    }
}

impl FacilityTransport for OverpassHttp {
    fn fetch(&self, query: &str, timeout: Duration) -> Result<QueryResponse, TransportError> {
        let response = ureq::post(&self.endpoint)
            .set("User-Agent", USER_AGENT)
            .timeout(timeout)
            .send_form(&[("data", query)])
            .map_err(|e| match e {
                ureq::Error::Status(429, _) => TransportError::RateLimited,
                ureq::Error::Status(code, _) => TransportError::Http(code),
                ureq::Error::Transport(t) => {
                    let msg = t.to_string();
                    if msg.contains("timed out") {
                        TransportError::Timeout
                    } else {
                        TransportError::Network(msg)
                    }
                }
            })?;
        response
            .into_json::<QueryResponse>()
            .map_err(|e| TransportError::InvalidBody(e.to_string()))
    }
}

/// The facility search engine.
pub struct FacilitySearchEngine {
    cache: Arc<TtlCache<Vec<Facility>>>,
    transport: Box<dyn FacilityTransport>,
    seed: Option<u64>,
}

impl FacilitySearchEngine {
    pub fn new(cache: Arc<TtlCache<Vec<Facility>>>) -> Self {
        Self {
            cache,
            transport: Box::new(OverpassHttp::new()),
            seed: None,
        }
    }

    /// Replace the transport (alternate endpoints, tests).
    pub fn with_transport(mut self, transport: Box<dyn FacilityTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Pin the rating perturbation and fallback placement.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Finds facilities near `origin`, closest first, at most
    /// `max_results` of them.
    pub fn search(&self, origin: &Location, radius_km: f64, max_results: usize) -> Vec<Facility> {
        let radius_km = radius_km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM);
        let mut rng = self.rng();

        // Bad origins never reach the network. Synthesize around the
        // fixed default region and skip the cache, so a later valid
        // origin rounding to the same key cannot pick this list up.
        if !geo::is_valid_coordinate(origin.latitude, origin.longitude) {
            let center = heuristic_default(None);
            let mut list = fallback::synthetic_facilities(
                center.latitude,
                center.longitude,
                radius_km,
                &mut rng,
            );
            rank(&mut list, max_results);
            return list;
        }

        let key = cache_key(origin.latitude, origin.longitude, radius_km);
        if let Some(mut cached) = self.cache.get(&key) {
            cached.truncate(max_results);
            return cached;
        }

        let mut list = match self.fetch_live(origin, radius_km, &mut rng) {
            Some(live) if !live.is_empty() => live,
            _ => fallback::synthetic_facilities(
                origin.latitude,
                origin.longitude,
                radius_km,
                &mut rng,
            ),
        };

        rank(&mut list, max_results);
        self.cache.set(&key, list.clone(), SEARCH_TTL_MS);
        list
    }

    /// One live query with retry and backoff. `None` means every attempt
    /// failed or nothing usable came back.
    fn fetch_live<R: Rng>(
        &self,
        origin: &Location,
        radius_km: f64,
        rng: &mut R,
    ) -> Option<Vec<Facility>> {
        let query = query::build_query(
            origin.latitude,
            origin.longitude,
            (radius_km * 1000.0).round() as u32,
        );

        for attempt in 0..MAX_ATTEMPTS {
            match self.transport.fetch(&query, HTTP_TIMEOUT) {
                Ok(response) => {
                    if !response.elements.iter().any(|e| e.is_named()) {
                        return None;
                    }
                    let facilities: Vec<Facility> = response
                        .elements
                        .iter()
                        .filter_map(|e| {
                            normalize::normalize_element(e, origin.latitude, origin.longitude, rng)
                        })
                        .collect();
                    return Some(normalize::dedup_facilities(facilities));
                }
                Err(e) if e.is_transient() && attempt + 1 < MAX_ATTEMPTS => {
                    let delay = BACKOFF_BASE_MS << attempt;
                    eprintln!(
                        "  Warning: facility query attempt {}/{} failed ({}), retrying in {}ms",
                        attempt + 1,
                        MAX_ATTEMPTS,
                        e,
                        delay
                    );
                    thread::sleep(Duration::from_millis(delay));
                }
                Err(e) => {
                    eprintln!("  Warning: facility query failed: {}", e);
                    return None;
                }
            }
        }
        None
    }
}

fn rank(list: &mut Vec<Facility>, max_results: usize) {
    list.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    list.truncate(max_results);
}

fn cache_key(latitude: f64, longitude: f64, radius_km: f64) -> String {
    format!(
        "{}:{}:{}",
        geo::round_coord(latitude, 4),
        geo::round_coord(longitude, 4),
        radius_km
    )
}
