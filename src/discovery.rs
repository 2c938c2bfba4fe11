//! Discovery orchestrator — the façade the presentation layer consumes.
//!
//! Resolves a location, searches around it, and annotates the result
//! with provenance so the UI can render trust signals ("approximate
//! location", "sample data") without re-deriving them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::TtlCache;
use crate::facility::{Facility, FacilitySearchEngine, SourceProvenance};
use crate::location::{AddressDetails, Location, LocationResolver, LocationSource};

/// Combined result of one discovery call.
#[derive(Debug, Clone, Serialize)]
pub struct Discovery {
    pub location: Location,
    pub facilities: Vec<Facility>,
    pub location_source: LocationSource,
    pub used_fallback_data: bool,
    pub generated_at: DateTime<Utc>,
}

/// Owns the resolver and the search engine, along with their caches.
pub struct DiscoveryOrchestrator {
    resolver: LocationResolver,
    engine: FacilitySearchEngine,
}

impl DiscoveryOrchestrator {
    /// Orchestrator with default providers and private caches.
    pub fn new() -> Self {
        Self {
            resolver: LocationResolver::new(Arc::new(TtlCache::new())),
            engine: FacilitySearchEngine::new(Arc::new(TtlCache::new())),
        }
    }

    /// Assemble from preconfigured parts.
    pub fn with_parts(resolver: LocationResolver, engine: FacilitySearchEngine) -> Self {
        Self { resolver, engine }
    }

    /// Resolve the caller's location, then search around it.
    pub fn discover(&self, radius_km: f64, max_results: usize) -> Discovery {
        self.discover_with_hint(None, radius_km, max_results)
    }

    /// Like [`discover`](Self::discover), with a per-call timezone hint
    /// for the heuristic location tier.
    pub fn discover_with_hint(
        &self,
        tz_hint: Option<&str>,
        radius_km: f64,
        max_results: usize,
    ) -> Discovery {
        let location = self.resolver.resolve_with_hint(tz_hint);
        self.discover_from(location, radius_km, max_results)
    }

    /// Search around a caller-supplied origin (manual coordinates).
    pub fn discover_from(&self, origin: Location, radius_km: f64, max_results: usize) -> Discovery {
        let facilities = self.engine.search(&origin, radius_km, max_results);
        let used_fallback_data = facilities
            .iter()
            .any(|f| f.provenance == SourceProvenance::SyntheticFallback);
        Discovery {
            location_source: origin.source,
            location: origin,
            facilities,
            used_fallback_data,
            generated_at: Utc::now(),
        }
    }

    /// Resolve without searching.
    pub fn resolve_location(&self) -> Location {
        self.resolver.resolve()
    }

    /// Resolve without searching, honoring a per-call timezone hint.
    pub fn resolve_location_with_hint(&self, tz_hint: Option<&str>) -> Location {
        self.resolver.resolve_with_hint(tz_hint)
    }

    /// Best-effort address enrichment for a resolved location.
    pub fn address_details(&self, location: &Location) -> Option<AddressDetails> {
        self.resolver.address_details(location)
    }
}

impl Default for DiscoveryOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

const TABLE_WIDTH: usize = 62;

/// Renders a discovery result as a terminal table.
pub fn render_facility_table(discovery: &Discovery) -> String {
    let mut out = String::new();

    if discovery.location_source == LocationSource::HeuristicDefault {
        out.push_str("  Using approximate location (heuristic default)\n");
    }

    out.push_str(&format!("  ╔{}╗\n", "═".repeat(TABLE_WIDTH)));
    push_row(
        &mut out,
        &format!(
            " Nearby medical facilities ({} found)",
            discovery.facilities.len()
        ),
    );
    out.push_str(&format!("  ╠{}╣\n", "═".repeat(TABLE_WIDTH)));

    if discovery.facilities.is_empty() {
        push_row(&mut out, " no facilities found");
    }
    for (index, facility) in discovery.facilities.iter().enumerate() {
        let mut badges = String::new();
        if facility.open_24x7 {
            badges.push_str("  24x7");
        } else if facility.has_emergency {
            badges.push_str("  ER");
        }
        if facility.provenance == SourceProvenance::SyntheticFallback {
            badges.push_str("  *");
        }
        push_row(
            &mut out,
            &format!(
                " {:>2}. {:<30} {:>5.1} km  {:.1}{}",
                index + 1,
                shorten(&facility.name, 30),
                facility.distance_km,
                facility.rating,
                badges,
            ),
        );
    }

    out.push_str(&format!("  ╚{}╝\n", "═".repeat(TABLE_WIDTH)));
    if discovery.used_fallback_data {
        out.push_str("  * sample data: live sources were unavailable\n");
    }
    out
}

fn push_row(out: &mut String, content: &str) {
    let pad = TABLE_WIDTH.saturating_sub(content.chars().count());
    out.push_str("  ║");
    out.push_str(content);
    out.push_str(&" ".repeat(pad));
    out.push_str("║\n");
}

fn shorten(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let mut cut: String = name.chars().take(max - 1).collect();
        cut.push('…');
        cut
    }
}
