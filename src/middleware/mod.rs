//! Middleware module
//!
//! The request pipeline and the stages the server installs on it.

pub mod access_log;
pub mod pipeline;
pub mod spa;

pub use access_log::AccessLog;
pub use pipeline::{BoxFuture, Handler, Middleware, Next, Pipeline, PipelineBuilder};
pub use spa::SpaFallback;
