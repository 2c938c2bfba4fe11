use crate::discovery::DiscoveryOrchestrator;

/// Shared across handlers. The orchestrator is internally synchronized
/// (its caches carry their own locks), so no outer mutex is needed.
pub struct AppState {
    pub orchestrator: DiscoveryOrchestrator,
}
