//! Access log middleware
//!
//! Outermost stage: captures the request as received, times the rest of the
//! pipeline and writes one line per exchange, errors included.

use crate::http::HttpContext;
use crate::logger::{self, AccessLogEntry, LogFormat};
use crate::middleware::pipeline::{BoxFuture, Middleware, Next};
use hyper::{header, StatusCode, Version};
use std::io;
use std::time::{Duration, Instant};

pub struct AccessLog {
    format: LogFormat,
}

impl AccessLog {
    pub fn new(format: &str) -> Self {
        Self {
            format: LogFormat::parse(format),
        }
    }

    /// Snapshot of the request before downstream stages can rewrite it
    fn begin(ctx: &HttpContext) -> AccessLogEntry {
        let remote_addr = ctx
            .remote_addr
            .map_or_else(|| "-".to_string(), |addr| addr.ip().to_string());
        let mut entry = AccessLogEntry::new(
            remote_addr,
            ctx.request.method.to_string(),
            ctx.request.path.clone(),
        );
        entry.query.clone_from(&ctx.request.query);
        entry.http_version = version_label(ctx.request.version).to_string();
        entry.referer = ctx.request.header(header::REFERER.as_str()).map(ToString::to_string);
        entry.user_agent = ctx
            .request
            .header(header::USER_AGENT.as_str())
            .map(ToString::to_string);
        entry
    }

    /// Fill in the outcome once downstream has finished
    ///
    /// A downstream error is logged as 500; the served path is recorded only
    /// when a later stage rewrote the request.
    fn finish(
        mut entry: AccessLogEntry,
        ctx: &HttpContext,
        result: &io::Result<()>,
        elapsed: Duration,
    ) -> AccessLogEntry {
        entry.request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        entry.status = if result.is_ok() {
            ctx.response.status.as_u16()
        } else {
            StatusCode::INTERNAL_SERVER_ERROR.as_u16()
        };
        entry.body_bytes = ctx.response.content_length.unwrap_or(0);
        if ctx.request.path != entry.path {
            entry.served_path = Some(ctx.request.path.clone());
        }
        entry
    }
}

impl Middleware for AccessLog {
    fn invoke<'a>(
        &'a self,
        ctx: &'a mut HttpContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, io::Result<()>> {
        Box::pin(async move {
            let entry = Self::begin(ctx);
            let started = Instant::now();

            let result = next.run(ctx).await;

            let entry = Self::finish(entry, ctx, &result, started.elapsed());
            logger::log_access(&entry, &self.format);

            result
        })
    }
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
