//! Request routing dispatch module
//!
//! Terminal endpoint of the pipeline: API-prefixed paths go to the JSON API,
//! everything else to the static file server.

use crate::handler::api::ApiRoutes;
use crate::handler::static_files::StaticFiles;
use crate::http::path::starts_with_ignore_case;
use crate::http::HttpContext;
use crate::middleware::{BoxFuture, Handler};
use std::io;

pub struct Router {
    api_prefix: String,
    api: ApiRoutes,
    files: StaticFiles,
}

impl Router {
    pub fn new(api_prefix: impl Into<String>, api: ApiRoutes, files: StaticFiles) -> Self {
        Self {
            api_prefix: api_prefix.into(),
            api,
            files,
        }
    }
}

impl Handler for Router {
    fn call<'a>(&'a self, ctx: &'a mut HttpContext) -> BoxFuture<'a, io::Result<()>> {
        if starts_with_ignore_case(&ctx.request.path, &self.api_prefix) {
            self.api.call(ctx)
        } else {
            self.files.call(ctx)
        }
    }
}
