//! Nearby-facility discovery subsystem for Care Compass.
//!
//! Queries a geospatial database for medical facilities around an
//! origin, normalizes the heterogeneous results, and degrades to a
//! synthetic catalogue when live data is unavailable.

pub mod engine;
pub mod fallback;
pub mod normalize;
pub mod query;
pub mod types;

pub use engine::{FacilitySearchEngine, FacilityTransport, OverpassHttp};
pub use types::{Facility, FacilityType, Ownership, SourceProvenance, TransportError};
