//! API endpoint module
//!
//! Minimal JSON API under the reserved prefix. Unknown routes answer a JSON 404,
//! which the SPA fallback leaves alone.

use crate::http::path::strip_prefix_ignore_case;
use crate::http::{read_body_as_string, response, HttpContext};
use crate::middleware::{BoxFuture, Handler};
use hyper::{Method, StatusCode};
use serde_json::json;
use std::io;

pub struct ApiRoutes {
    prefix: String,
    server_name: String,
}

impl ApiRoutes {
    pub fn new(prefix: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            server_name: server_name.into(),
        }
    }

    async fn dispatch(&self, ctx: &mut HttpContext) -> io::Result<()> {
        let route = strip_prefix_ignore_case(&ctx.request.path, &self.prefix)
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_ascii_lowercase();
        let method = ctx.request.method.clone();

        match (&method, route.as_str()) {
            (&Method::GET | &Method::HEAD, "health") => {
                let body = json!({ "status": "ok", "server": self.server_name });
                response::write_json(&mut ctx.response, StatusCode::OK, &body).await
            }
            (&Method::POST, "echo") => {
                let text = read_body_as_string(&mut ctx.request).await?;
                let body = json!({ "length": text.len(), "body": text });
                response::write_json(&mut ctx.response, StatusCode::OK, &body).await
            }
            (_, "health" | "echo") => {
                let body = json!({ "error": "method not allowed" });
                response::write_json(&mut ctx.response, StatusCode::METHOD_NOT_ALLOWED, &body)
                    .await
            }
            _ => {
                let body = json!({ "error": "not found" });
                response::write_json(&mut ctx.response, StatusCode::NOT_FOUND, &body).await
            }
        }
    }
}

impl Handler for ApiRoutes {
    fn call<'a>(&'a self, ctx: &'a mut HttpContext) -> BoxFuture<'a, io::Result<()>> {
        Box::pin(self.dispatch(ctx))
    }
}
