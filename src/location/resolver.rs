//! Location resolver — orchestrates the provider cascade.
//!
//! Tier order: device sensor → network-inferred → heuristic default.
//! Each tier is fronted by its own cache slot, and the final tier cannot
//! fail, so `resolve` always produces a usable position.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlCache;

use super::providers::{self, NetworkLocator};
use super::sensor::{DeviceSensor, NoSensor};
use super::types::{AddressDetails, Location, LocationError, LocationSource};

/// Cache slots, one per tier.
const TIER_DEVICE: &str = "device_sensor";
const TIER_NETWORK: &str = "network_inferred";
const TIER_HEURISTIC: &str = "heuristic_default";

/// Device fixes are precise but go stale quickly.
pub const DEVICE_TTL_MS: i64 = 5 * 60 * 1000;

/// IP-derived positions drift slowly.
pub const NETWORK_TTL_MS: i64 = 30 * 60 * 1000;

/// Heuristic defaults only change when the hint changes.
pub const HEURISTIC_TTL_MS: i64 = 30 * 60 * 1000;

/// Upper bound on one device sensor read.
pub const SENSOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on each network provider call.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(8);

const REVERSE_GEOCODE_TIMEOUT: Duration = Duration::from_secs(8);

/// The location resolver with its tiered fallback pipeline.
pub struct LocationResolver {
    cache: Arc<TtlCache<Location>>,
    sensor: Box<dyn DeviceSensor>,
    network: Vec<Box<dyn NetworkLocator>>,
    tz_hint: Option<String>,
    offline: bool,
}

impl LocationResolver {
    /// Resolver with the default providers and no device sensor.
    pub fn new(cache: Arc<TtlCache<Location>>) -> Self {
        Self {
            cache,
            sensor: Box::new(NoSensor),
            network: providers::default_network_providers(),
            tz_hint: None,
            offline: false,
        }
    }

    /// Replace the device sensor (platform integrations, tests).
    pub fn with_sensor(mut self, sensor: Box<dyn DeviceSensor>) -> Self {
        self.sensor = sensor;
        self
    }

    /// Replace the network provider list.
    pub fn with_network(mut self, network: Vec<Box<dyn NetworkLocator>>) -> Self {
        self.network = network;
        self
    }

    /// Configure the timezone hint consulted by the heuristic tier.
    pub fn with_tz_hint(mut self, hint: Option<String>) -> Self {
        self.tz_hint = hint;
        self
    }

    /// Offline mode skips every network call. Cached positions and the
    /// device sensor still work.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Walk the cascade and return the best available position.
    pub fn resolve(&self) -> Location {
        self.resolve_with_hint(None)
    }

    /// Like [`resolve`](Self::resolve), with a per-call timezone hint that
    /// overrides the configured one.
    pub fn resolve_with_hint(&self, tz_hint: Option<&str>) -> Location {
        // Tier 1: device sensor.
        if let Some(loc) = self.cache.get(TIER_DEVICE) {
            return loc;
        }
        match self.device_fix() {
            Ok(loc) => {
                self.cache.set(TIER_DEVICE, loc.clone(), DEVICE_TTL_MS);
                return loc;
            }
            Err(e) => eprintln!("  Warning: device sensor: {}", e),
        }

        // Tier 2: network providers, in priority order.
        if let Some(loc) = self.cache.get(TIER_NETWORK) {
            return loc;
        }
        if !self.offline {
            for provider in &self.network {
                match provider.locate(NETWORK_TIMEOUT) {
                    Ok(loc) => {
                        self.cache.set(TIER_NETWORK, loc.clone(), NETWORK_TTL_MS);
                        return loc;
                    }
                    Err(e) => eprintln!("  Warning: {}: {}", provider.name(), e),
                }
            }
        }

        // Tier 3: heuristic default. Never fails.
        let hint = tz_hint.or(self.tz_hint.as_deref());
        let key = match hint {
            Some(h) => format!("{}:{}", TIER_HEURISTIC, h.to_ascii_lowercase()),
            None => TIER_HEURISTIC.to_string(),
        };
        if let Some(loc) = self.cache.get(&key) {
            return loc;
        }
        let loc = providers::heuristic_default(hint);
        self.cache.set(&key, loc.clone(), HEURISTIC_TTL_MS);
        loc
    }

    /// Human-readable address for a resolved position, when reachable.
    pub fn address_details(&self, location: &Location) -> Option<AddressDetails> {
        if self.offline {
            return None;
        }
        match providers::reverse_geocode(
            location.latitude,
            location.longitude,
            REVERSE_GEOCODE_TIMEOUT,
        ) {
            Ok(details) => Some(details),
            Err(e) => {
                eprintln!("  Warning: reverse geocode: {}", e);
                None
            }
        }
    }

    fn device_fix(&self) -> Result<Location, LocationError> {
        let fix = self.sensor.current_position(SENSOR_TIMEOUT, true)?;
        Ok(
            Location::new(fix.latitude, fix.longitude, LocationSource::DeviceSensor)?
                .with_accuracy(fix.accuracy_m),
        )
    }
}
