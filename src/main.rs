use clap::Parser;
use std::sync::Arc;

use care_compass::cache::TtlCache;
use care_compass::discovery::{DiscoveryOrchestrator, render_facility_table};
use care_compass::facility::FacilitySearchEngine;
use care_compass::location::{self, Location, LocationResolver};
use care_compass::server;

/// Care Compass v0.3 — nearby medical facility discovery.
///
/// Resolves your location through a tiered cascade (device sensor, IP
/// geolocation, regional default) and searches OpenStreetMap for
/// hospitals, clinics and pharmacies nearby. When live sources are
/// unreachable it falls back to a built-in sample catalogue so the
/// output is never empty.
///
/// Examples:
///   compass
///   compass --radius-km 25 --max-results 10
///   compass --lat 30.3747 --lon 76.1434
///   compass --tz-hint Asia/Kolkata --offline
///   compass --serve --port 8080
#[derive(Parser)]
#[command(name = "compass", version, about, long_about = None)]
struct Cli {
    /// Latitude (-90 to 90). Skips location resolution.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude (-180 to 180). Skips location resolution.
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Search radius in kilometres (clamped to 1-50).
    #[arg(long, short = 'r', default_value_t = 10.0)]
    radius_km: f64,

    /// Maximum number of facilities to list.
    #[arg(long, short = 'n', default_value_t = 20)]
    max_results: usize,

    /// IANA timezone hint for the regional default (e.g. Asia/Kolkata).
    #[arg(long)]
    tz_hint: Option<String>,

    /// Offline mode: only use cache and built-in data.
    #[arg(long)]
    offline: bool,

    /// Seed for generated sample data (reproducible output).
    #[arg(long)]
    seed: Option<u64>,

    /// Reverse-geocode the resolved location and print the address.
    #[arg(long)]
    details: bool,

    /// Run the HTTP API server instead of a one-shot search.
    #[arg(long)]
    serve: bool,

    /// Server bind address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port.
    #[arg(long, short = 'p', default_value_t = 8080)]
    port: u16,
}

fn main() {
    let cli = Cli::parse();

    // ── Validate flags ──────────────────────────────────────────

    if let Some(ref hint) = cli.tz_hint {
        if !location::is_known_timezone(hint) {
            eprintln!(
                "Error: Unknown timezone '{}'. Use IANA format (e.g. Asia/Kolkata).",
                hint
            );
            std::process::exit(1);
        }
    }

    // ── Assemble orchestrator ───────────────────────────────────

    let mut resolver =
        LocationResolver::new(Arc::new(TtlCache::new())).with_tz_hint(cli.tz_hint.clone());
    if cli.offline {
        resolver.set_offline(true);
    }

    let mut engine = FacilitySearchEngine::new(Arc::new(TtlCache::new()));
    if let Some(seed) = cli.seed {
        engine = engine.with_seed(seed);
    }

    let orchestrator = DiscoveryOrchestrator::with_parts(resolver, engine);

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start async runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(server::start(&cli.host, cli.port, orchestrator));
        return;
    }

    // ── One-shot discovery ──────────────────────────────────────

    let result = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => {
            let origin = Location::manual(lat, lon).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            orchestrator.discover_from(origin, cli.radius_km, cli.max_results)
        }
        (None, None) => orchestrator.discover(cli.radius_km, cli.max_results),
        _ => {
            eprintln!("Error: Provide both --lat and --lon, or neither.");
            std::process::exit(1);
        }
    };

    // ── Location banner ─────────────────────────────────────────

    eprintln!("  {} {}", "\u{1F4CD}", result.location.display_line());
    if cli.details {
        match orchestrator.address_details(&result.location) {
            Some(address) => eprintln!("     {}", address.display_name),
            None => eprintln!("  Warning: address lookup unavailable"),
        }
    }

    // Facility table to stderr
    eprint!("{}", render_facility_table(&result));

    // JSON to stdout
    println!("{}", serde_json::to_string_pretty(&result).unwrap());
}
