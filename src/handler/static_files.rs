//! Static file serving module
//!
//! Serves the built application from a root directory. A miss answers 404 with
//! an empty body so that the SPA fallback stage can retry against the index page.

use crate::config::SpaConfig;
use crate::http::{cache, mime, response, write_response_body, HttpContext, HttpResponse};
use crate::logger;
use crate::middleware::{BoxFuture, Handler};
use hyper::header::{self, HeaderValue};
use hyper::{Method, StatusCode};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct StaticFiles {
    root: PathBuf,
    index_files: Vec<String>,
}

/// File resolved under the root, ready to send
pub struct LoadedFile {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub content_type: &'static str,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, index_files: Vec<String>) -> Self {
        Self {
            root: root.into(),
            index_files,
        }
    }

    pub fn from_config(config: &SpaConfig) -> Self {
        Self::new(&config.root, config.index_files.clone())
    }

    async fn serve(&self, ctx: &mut HttpContext) -> io::Result<()> {
        let is_head = ctx.request.method == Method::HEAD;
        if !is_head && ctx.request.method != Method::GET {
            return response::method_not_allowed(&mut ctx.response).await;
        }

        let Some(file) = load_from_directory(&self.root, &ctx.request.path, &self.index_files).await
        else {
            return response::not_found(&mut ctx.response).await;
        };

        let etag = cache::generate_etag(&file.content);
        if cache::check_etag_match(ctx.request.header(header::IF_NONE_MATCH.as_str()), &etag) {
            return response::not_modified(&mut ctx.response, &etag).await;
        }

        send_file(&mut ctx.response, &file, &etag, is_head).await
    }
}

impl Handler for StaticFiles {
    fn call<'a>(&'a self, ctx: &'a mut HttpContext) -> BoxFuture<'a, io::Result<()>> {
        Box::pin(self.serve(ctx))
    }
}

async fn send_file(
    resp: &mut HttpResponse,
    file: &LoadedFile,
    etag: &str,
    is_head: bool,
) -> io::Result<()> {
    resp.status = StatusCode::OK;
    resp.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(file.content_type),
    );
    resp.headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache::cache_control_for(file.content_type)),
    );
    if let Ok(value) = HeaderValue::from_str(etag) {
        resp.headers.insert(header::ETAG, value);
    }

    crate::http::clear_body(resp).await?;
    if is_head {
        resp.content_length = Some(file.content.len() as u64);
    } else if file.content.is_empty() {
        resp.content_length = Some(0);
    } else {
        write_response_body(resp, &file.content).await?;
    }
    Ok(())
}

/// Resolve `path` under `root`, trying index files for directories
///
/// Returns `None` for anything missing, unreadable or outside `root`.
pub async fn load_from_directory(
    root: &Path,
    path: &str,
    index_files: &[String],
) -> Option<LoadedFile> {
    let relative = path.trim_start_matches('/');
    let mut file_path = root.join(relative);

    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                root.display()
            ));
            return None;
        }
    };

    if relative.is_empty() || relative.ends_with('/') || is_dir(&file_path).await {
        for index_file in index_files {
            let candidate = file_path.join(index_file);
            if is_file(&candidate).await {
                file_path = candidate;
                break;
            }
        }
    }

    // File not found is common (404), no need to log at warning level
    let Ok(canonical) = fs::canonicalize(&file_path).await else {
        return None;
    };
    if !canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            canonical.display()
        ));
        return None;
    }
    if !is_file(&canonical).await {
        return None;
    }

    let content = match fs::read(&canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                canonical.display()
            ));
            return None;
        }
    };

    Some(LoadedFile {
        content_type: mime::content_type_for(&canonical),
        path: canonical,
        content,
    })
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}
