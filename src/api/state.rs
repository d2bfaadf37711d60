//! API server state

use std::sync::Arc;

use crate::config::Settings;

/// API server state
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration, read-only for the life of the process
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}
