// Application state module
// Shared by every connection: the loaded config and the request pipeline built from it

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::handler;
use crate::middleware::Pipeline;

/// Application state
pub struct AppState {
    pub config: Config,
    pub pipeline: Pipeline,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let pipeline = handler::build_pipeline(&config);
        Self {
            config,
            pipeline,
            active_connections: AtomicUsize::new(0),
        }
    }
}
