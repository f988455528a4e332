//! Single-page-application fallback
//!
//! Lets the rest of the pipeline run first. When it answers 404 for a path that
//! has no file extension and is outside the API prefix, the request path is
//! rewritten to the index page and the rest of the pipeline runs once more, so
//! client-side routes like `/dashboard` load the application shell. Missing
//! assets (`/app.js`) and API routes (`/api/...`) keep their genuine 404.

use crate::config::SpaConfig;
use crate::http::path::{has_extension, starts_with_ignore_case};
use crate::http::HttpContext;
use crate::logger;
use crate::middleware::pipeline::{BoxFuture, Middleware, Next};
use hyper::StatusCode;
use std::io;

pub const DEFAULT_INDEX_PATH: &str = "/index.html";
pub const DEFAULT_API_PREFIX: &str = "/api/";

#[derive(Debug, Clone)]
pub struct SpaFallback {
    index_path: String,
    api_prefix: String,
}

impl SpaFallback {
    pub fn new() -> Self {
        Self {
            index_path: DEFAULT_INDEX_PATH.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
        }
    }

    pub fn from_config(config: &SpaConfig) -> Self {
        Self {
            index_path: config.index_path.clone(),
            api_prefix: config.api_prefix.clone(),
        }
    }

    #[must_use]
    pub fn with_index_path(mut self, index_path: impl Into<String>) -> Self {
        self.index_path = index_path.into();
        self
    }

    #[must_use]
    pub fn with_api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        self.api_prefix = api_prefix.into();
        self
    }

    /// Whether a response with `status` for `path` should be retried against the index page
    pub fn should_fallback(&self, status: StatusCode, path: &str) -> bool {
        status == StatusCode::NOT_FOUND
            && !has_extension(path)
            && !starts_with_ignore_case(path, &self.api_prefix)
    }
}

impl Default for SpaFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for SpaFallback {
    fn invoke<'a>(
        &'a self,
        ctx: &'a mut HttpContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, io::Result<()>> {
        Box::pin(async move {
            next.run(ctx).await?;

            if self.should_fallback(ctx.response.status, &ctx.request.path) {
                logger::log_spa_fallback(&ctx.request.path, &self.index_path);
                ctx.request.path.clone_from(&self.index_path);
                // Single retry; whatever it produces is final
                next.run(ctx).await?;
            }
            Ok(())
        })
    }
}
