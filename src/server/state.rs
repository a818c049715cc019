//! Server state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::pipeline::Studio;

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub studio: Arc<Studio>,
}

impl AppState {
    pub fn new(config: ServerConfig, studio: Arc<Studio>) -> Self {
        Self { config, studio }
    }
}
