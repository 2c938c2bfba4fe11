//! Location resolution subsystem for Care Compass.
//!
//! Provides a tiered provider cascade (device sensor, IP geolocation,
//! heuristic defaults), reverse geocoding, and per-tier caching.

pub mod providers;
pub mod resolver;
pub mod sensor;
pub mod types;

pub use providers::{
    default_network_providers, heuristic_default, is_known_timezone, region_defaults,
    NetworkLocator, RegionDefault,
};
pub use resolver::LocationResolver;
pub use sensor::{DeviceSensor, NoSensor, SensorError, SensorFix};
pub use types::{AddressDetails, Location, LocationError, LocationSource};
