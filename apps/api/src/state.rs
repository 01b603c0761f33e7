use crate::availability::BackendMode;
use crate::identity::SessionId;
use crate::store::Stores;

/// Shared application state injected into all route handlers via Axum extractors.
/// Constructed once in `main`; nothing here is process-global.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub session: SessionId,
    /// Result of the startup availability check. Never re-evaluated.
    pub backend: BackendMode,
}
