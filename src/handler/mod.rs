//! Request handler module
//!
//! Endpoints behind the middleware chain and the assembly of the full pipeline.

pub mod api;
pub mod router;
pub mod static_files;

pub use api::ApiRoutes;
pub use router::Router;
pub use static_files::StaticFiles;

use crate::config::Config;
use crate::middleware::{AccessLog, Pipeline, SpaFallback};

/// Build the request pipeline: access log, SPA fallback, then the router
pub fn build_pipeline(config: &Config) -> Pipeline {
    let router = Router::new(
        config.spa.api_prefix.clone(),
        ApiRoutes::new(config.spa.api_prefix.clone(), config.http.server_name.clone()),
        StaticFiles::from_config(&config.spa),
    );

    Pipeline::builder()
        .with_if(
            config.logging.access_log,
            AccessLog::new(&config.logging.access_log_format),
        )
        .with_if(config.spa.fallback, SpaFallback::from_config(&config.spa))
        .endpoint(router)
}
