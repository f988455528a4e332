//! HTTP layer module
//!
//! Message model, body helpers and response builders shared by the middleware
//! and the endpoints. Nothing here knows about sockets.

pub mod body;
pub mod cache;
pub mod message;
pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used types
pub use body::{
    clear_body, is_success, read_body_as_string, read_body_bytes, write_request_body,
    write_response_body, write_response_body_opt,
};
pub use message::{memory_body, BodyStream, HttpContext, HttpMessage, HttpRequest, HttpResponse};
