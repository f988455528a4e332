// Hyper adapter module
// Converts between hyper's wire types and the pipeline's message model

use crate::http::{memory_body, read_body_bytes, response, HttpContext, HttpRequest};
use crate::logger;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::header;
use hyper::{Method, Request, Response};
use std::io;
use std::net::SocketAddr;

/// Buffer an incoming request into a pipeline context
///
/// Bodies larger than `max_body_size` are refused with 413, unreadable ones with 400.
pub async fn into_context<B>(
    req: Request<B>,
    remote_addr: Option<SocketAddr>,
    max_body_size: u64,
) -> Result<HttpContext, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let declared_length = content_length(&req);
    if declared_length.is_some_and(|size| size > max_body_size) {
        logger::log_error(&format!(
            "Request body too large: {} bytes (max: {max_body_size})",
            declared_length.unwrap_or_default()
        ));
        return Err(response::build_413_response());
    }

    let (parts, body) = req.into_parts();
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<http_body_util::LengthLimitError>() => {
            logger::log_error(&format!("Request body exceeded {max_body_size} bytes"));
            return Err(response::build_413_response());
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(response::build_400_response());
        }
    };

    let mut request = HttpRequest::new(parts.method, parts.uri.path());
    request.query = parts.uri.query().map(ToString::to_string);
    request.version = parts.version;
    request.content_length =
        declared_length.or_else(|| (!bytes.is_empty()).then(|| bytes.len() as u64));
    request.headers = parts.headers;
    request.body = memory_body(bytes.to_vec());

    let mut ctx = HttpContext::new(request);
    ctx.remote_addr = remote_addr;
    Ok(ctx)
}

/// Turn the finished pipeline response into a hyper response
pub async fn into_response(
    mut ctx: HttpContext,
    server_name: &str,
) -> io::Result<Response<Full<Bytes>>> {
    let body = read_body_bytes(&mut ctx.response).await?;
    let is_head = ctx.request.method == Method::HEAD;

    let mut resp = Response::new(Full::new(if is_head {
        Bytes::new()
    } else {
        Bytes::from(body)
    }));
    *resp.status_mut() = ctx.response.status;
    *resp.headers_mut() = ctx.response.headers;
    if let Some(len) = ctx.response.content_length {
        resp.headers_mut()
            .insert(header::CONTENT_LENGTH, header::HeaderValue::from(len));
    }
    if let Ok(value) = header::HeaderValue::from_str(server_name) {
        resp.headers_mut().insert(header::SERVER, value);
    }
    Ok(resp)
}

fn content_length<B>(req: &Request<B>) -> Option<u64> {
    let value = req.headers().get(header::CONTENT_LENGTH)?;
    match value.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) => Some(size),
        None => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            None
        }
    }
}
