//! SPA fallback server
//!
//! Body helpers for pipeline messages, a middleware that serves the index page
//! for client-side routes, and a small hyper server wiring them together.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod server;

#[cfg(test)]
mod testing;
