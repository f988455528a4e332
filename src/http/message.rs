//! HTTP message model
//!
//! Request, response and per-exchange context as seen by the middleware pipeline.
//! Bodies are seekable byte streams so that helpers can rewind and rewrite them
//! after earlier stages have already touched them.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::{Method, StatusCode, Version};
use std::io::{self, Cursor};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite};

/// Byte stream backing a message body
pub trait BodyStream: AsyncRead + AsyncWrite + AsyncSeek + Unpin + Send {
    /// Cut the stream down to `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl BodyStream for Cursor<Vec<u8>> {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let new_len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "body length overflow"))?;
        self.get_mut().truncate(new_len);
        if self.position() > len {
            self.set_position(len);
        }
        Ok(())
    }
}

/// Owned body stream of a request or response
pub type MessageBody = Box<dyn BodyStream>;

/// Build an in-memory body holding `bytes`, positioned at the start
pub fn memory_body(bytes: impl Into<Vec<u8>>) -> MessageBody {
    Box::new(Cursor::new(bytes.into()))
}

/// Common surface of requests and responses used by the body helpers
pub trait HttpMessage {
    fn body_mut(&mut self) -> &mut MessageBody;
    fn content_length(&self) -> Option<u64>;
    fn set_content_length(&mut self, len: Option<u64>);
}

/// Incoming request as seen by pipeline stages
pub struct HttpRequest {
    pub method: Method,
    /// Request path without the query string; stages may rewrite it
    pub path: String,
    pub query: Option<String>,
    pub version: Version,
    pub headers: HeaderMap,
    pub content_length: Option<u64>,
    pub body: MessageBody,
}

impl HttpRequest {
    /// Create a request with an empty body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            content_length: None,
            body: memory_body(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: MessageBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Header value as a string, if present and visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl HttpMessage for HttpRequest {
    fn body_mut(&mut self) -> &mut MessageBody {
        &mut self.body
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn set_content_length(&mut self, len: Option<u64>) {
        self.content_length = len;
    }
}

/// Outgoing response under construction
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub content_length: Option<u64>,
    pub body: MessageBody,
}

impl HttpResponse {
    /// Fresh response: 200 with no headers and an empty body
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            content_length: None,
            body: memory_body(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: MessageBody) -> Self {
        self.body = body;
        self
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpMessage for HttpResponse {
    fn body_mut(&mut self) -> &mut MessageBody {
        &mut self.body
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn set_content_length(&mut self, len: Option<u64>) {
        self.content_length = len;
    }
}

/// One request/response exchange flowing through the pipeline
pub struct HttpContext {
    pub request: HttpRequest,
    pub response: HttpResponse,
    pub remote_addr: Option<SocketAddr>,
}

impl HttpContext {
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request,
            response: HttpResponse::new(),
            remote_addr: None,
        }
    }

    #[must_use]
    pub const fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }
}
