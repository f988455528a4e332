//! HTTP response building module
//!
//! Two families of builders:
//! - pipeline responses, filled into an [`HttpResponse`] by endpoints
//! - wire responses, built directly for hyper when the pipeline cannot run

use crate::http::body::{clear_body, write_response_body};
use crate::http::message::HttpResponse;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use std::io;

/// Replace the response with a plain-text body
pub async fn write_text(
    response: &mut HttpResponse,
    status: StatusCode,
    text: &str,
) -> io::Result<()> {
    response.status = status;
    response.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    clear_body(response).await?;
    write_response_body(response, text).await?;
    Ok(())
}

/// Replace the response with a JSON body
pub async fn write_json(
    response: &mut HttpResponse,
    status: StatusCode,
    value: &serde_json::Value,
) -> io::Result<()> {
    let payload = serde_json::to_vec(value)?;
    response.status = status;
    response
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    clear_body(response).await?;
    write_response_body(response, payload).await?;
    Ok(())
}

/// 404 with no body, leaving room for a later stage to serve something else
pub async fn not_found(response: &mut HttpResponse) -> io::Result<()> {
    response.status = StatusCode::NOT_FOUND;
    response.headers.remove(header::CONTENT_TYPE);
    response.headers.remove(header::ETAG);
    response.headers.remove(header::CACHE_CONTROL);
    clear_body(response).await
}

/// 405 for anything other than GET/HEAD
pub async fn method_not_allowed(response: &mut HttpResponse) -> io::Result<()> {
    response
        .headers
        .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
    write_text(response, StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed").await
}

/// 304 carrying the validator the client already holds
pub async fn not_modified(response: &mut HttpResponse, etag: &str) -> io::Result<()> {
    response.status = StatusCode::NOT_MODIFIED;
    response.headers.remove(header::CONTENT_TYPE);
    if let Ok(value) = HeaderValue::from_str(etag) {
        response.headers.insert(header::ETAG, value);
    }
    clear_body(response).await
}

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::BAD_REQUEST, "400 Bad Request")
}

/// Build 408 Request Timeout response
pub fn build_408_response() -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::REQUEST_TIMEOUT, "408 Request Timeout")
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn build_plain_response(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CONTENT_LENGTH, text.len())
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            crate::logger::log_error(&format!("Failed to build {status} response: {e}"));
            Response::new(Full::new(Bytes::new()))
        })
}
