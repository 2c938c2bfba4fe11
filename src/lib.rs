//! Care Compass: location resolution and nearby medical facility discovery.
//!
//! Three layers:
//!
//! - [`location`]: tiered resolver (device sensor, IP geolocation,
//!   regional heuristic default) that always yields a usable position.
//! - [`facility`]: OpenStreetMap facility search with retries, result
//!   cleanup and a synthetic fallback catalogue.
//! - [`discovery`]: the orchestrator tying the two together, shared by
//!   the CLI and the HTTP server.

pub mod cache;
pub mod discovery;
pub mod facility;
pub mod geo;
pub mod location;
pub mod server;
