//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use beacon_core::Config;

/// State handle passed to every handler.
pub type SharedState = Arc<AppState>;

/// Immutable server state.
///
/// Readings are per-request, so nothing here needs a lock.
#[derive(Debug)]
pub struct AppState {
    config: Config,
    started_at: Instant,
}

impl AppState {
    /// Create state from loaded configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            started_at: Instant::now(),
        }
    }

    /// Create shared state from loaded configuration.
    #[must_use]
    pub fn shared(config: Config) -> SharedState {
        Arc::new(Self::new(config))
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Seconds since the state was created.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
