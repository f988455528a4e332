//! Body read/write helpers
//!
//! Free functions over a borrowed request or response. Reads always rewind first,
//! because an earlier stage may have consumed part of the stream. Writes replace
//! the whole body: the stream is rewound, overwritten and truncated to the new
//! length, so a shorter second write never leaves stale trailing bytes.

use crate::http::message::{HttpMessage, HttpRequest, HttpResponse};
use hyper::Method;
use std::io::{self, SeekFrom};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Read the whole body, starting from the beginning of the stream
pub async fn read_body_bytes<M: HttpMessage + ?Sized>(message: &mut M) -> io::Result<Vec<u8>> {
    let body = message.body_mut();
    body.seek(SeekFrom::Start(0)).await?;
    let mut buf = Vec::new();
    body.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Read the whole body as UTF-8 text
///
/// Invalid sequences are replaced with U+FFFD instead of failing the read.
pub async fn read_body_as_string<M: HttpMessage + ?Sized>(message: &mut M) -> io::Result<String> {
    let bytes = read_body_bytes(message).await?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Replace the request body with `data`
///
/// GET requests carry no body, so they are returned untouched.
pub async fn write_request_body<'a>(
    request: &'a mut HttpRequest,
    data: impl AsRef<[u8]>,
) -> io::Result<&'a mut HttpRequest> {
    if request.method == Method::GET {
        return Ok(request);
    }
    replace_body(request, data.as_ref()).await?;
    Ok(request)
}

/// Replace the response body with `data`
///
/// Empty data leaves the response untouched.
pub async fn write_response_body<'a>(
    response: &'a mut HttpResponse,
    data: impl AsRef<[u8]>,
) -> io::Result<&'a mut HttpResponse> {
    let data = data.as_ref();
    if data.is_empty() {
        return Ok(response);
    }
    replace_body(response, data).await?;
    Ok(response)
}

/// Like [`write_response_body`], with `None` treated as "nothing to write"
pub async fn write_response_body_opt<'a, D: AsRef<[u8]>>(
    response: &'a mut HttpResponse,
    data: Option<D>,
) -> io::Result<&'a mut HttpResponse> {
    match data {
        Some(data) => write_response_body(response, data).await,
        None => Ok(response),
    }
}

/// Drop any body content and reset the content length
pub async fn clear_body<M: HttpMessage + ?Sized>(message: &mut M) -> io::Result<()> {
    message.set_content_length(None);
    let body = message.body_mut();
    body.seek(SeekFrom::Start(0)).await?;
    body.truncate(0)
}

/// True when the response status lies in `200..=299`
pub fn is_success(response: &HttpResponse) -> bool {
    is_success_status(response.status.as_u16())
}

pub const fn is_success_status(status: u16) -> bool {
    status >= 200 && status <= 299
}

async fn replace_body<M: HttpMessage + ?Sized>(message: &mut M, data: &[u8]) -> io::Result<()> {
    message.set_content_length(Some(data.len() as u64));
    let body = message.body_mut();
    body.seek(SeekFrom::Start(0)).await?;
    body.write_all(data).await?;
    body.flush().await?;
    body.truncate(data.len() as u64)
}
