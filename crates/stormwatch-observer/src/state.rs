//! Shared application state for the status server.
//!
//! [`AppState`] carries the read-only host handle and the readiness
//! flag the lifecycle manager flips once startup completes. It is
//! wrapped in [`Arc`] and injected into handlers via Axum's `State`
//! extractor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stormwatch_core::host::WorldHost;

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Read-only view of the simulation world.
    pub host: Arc<dyn WorldHost>,
    /// Set by the lifecycle manager when startup completes; until then
    /// the endpoint serves the initializing placeholder.
    pub ready: Arc<AtomicBool>,
    /// Capacity reported when the host has no configured maximum.
    pub default_max_players: u32,
}

impl AppState {
    /// Create application state around a host handle.
    ///
    /// The returned state starts not-ready; the lifecycle manager flips
    /// the shared flag via [`mark_ready`](Self::mark_ready).
    pub fn new(host: Arc<dyn WorldHost>, default_max_players: u32) -> Self {
        Self {
            host,
            ready: Arc::new(AtomicBool::new(false)),
            default_max_players,
        }
    }

    /// Whether startup has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Flip the readiness flag.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ready", &self.is_ready())
            .field("default_max_players", &self.default_max_players)
            .finish_non_exhaustive()
    }
}
