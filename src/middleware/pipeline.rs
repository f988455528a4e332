//! Request pipeline
//!
//! A chain of [`Middleware`] stages ending in a terminal [`Handler`]. Each stage
//! receives a [`Next`] that runs the rest of the chain; `Next` is `Copy`, so a
//! stage may run downstream more than once.

use crate::http::HttpContext;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Terminal request handler
pub trait Handler: Send + Sync {
    fn call<'a>(&'a self, ctx: &'a mut HttpContext) -> BoxFuture<'a, io::Result<()>>;
}

/// Pipeline stage wrapping the rest of the chain
pub trait Middleware: Send + Sync {
    fn invoke<'a>(
        &'a self,
        ctx: &'a mut HttpContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, io::Result<()>>;
}

/// Remainder of the pipeline after the current stage
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Handler,
}

impl<'a> Next<'a> {
    /// Run the remaining stages and the endpoint against `ctx`
    pub fn run<'b>(self, ctx: &'b mut HttpContext) -> BoxFuture<'b, io::Result<()>>
    where
        'a: 'b,
    {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.invoke(
                ctx,
                Next {
                    stages: rest,
                    endpoint: self.endpoint,
                },
            ),
            None => self.endpoint.call(ctx),
        }
    }
}

/// Configured middleware chain plus endpoint
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Middleware>>,
    endpoint: Arc<dyn Handler>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder { stages: Vec::new() }
    }

    /// Run the whole chain, outermost stage first
    pub async fn handle(&self, ctx: &mut HttpContext) -> io::Result<()> {
        let next = Next {
            stages: &self.stages,
            endpoint: self.endpoint.as_ref(),
        };
        next.run(ctx).await
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    /// Append a stage; stages run in the order they are added
    #[must_use]
    pub fn with(mut self, stage: impl Middleware + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Append a stage only when `enabled`
    #[must_use]
    pub fn with_if(self, enabled: bool, stage: impl Middleware + 'static) -> Self {
        if enabled {
            self.with(stage)
        } else {
            self
        }
    }

    pub fn endpoint(self, endpoint: impl Handler + 'static) -> Pipeline {
        Pipeline {
            stages: self.stages,
            endpoint: Arc::new(endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{write_response_body, HttpRequest};
    use hyper::{Method, StatusCode};
    use std::sync::Mutex;

    /// Records its tag before and after running downstream
    struct Tag {
        name: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    impl Tag {
        fn new(name: &'static str, trace: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                trace: Arc::clone(trace),
            }
        }
    }

    impl Middleware for Tag {
        fn invoke<'a>(
            &'a self,
            ctx: &'a mut HttpContext,
            next: Next<'a>,
        ) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async move {
                self.trace.lock().unwrap().push(format!("{}:in", self.name));
                next.run(ctx).await?;
                self.trace.lock().unwrap().push(format!("{}:out", self.name));
                Ok(())
            })
        }
    }

    /// Runs downstream twice
    struct Twice;

    impl Middleware for Twice {
        fn invoke<'a>(
            &'a self,
            ctx: &'a mut HttpContext,
            next: Next<'a>,
        ) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async move {
                next.run(ctx).await?;
                next.run(ctx).await
            })
        }
    }

    struct Echo {
        trace: Arc<Mutex<Vec<String>>>,
    }

    impl Handler for Echo {
        fn call<'a>(&'a self, ctx: &'a mut HttpContext) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async move {
                self.trace.lock().unwrap().push(format!("endpoint:{}", ctx.request.path));
                ctx.response.status = StatusCode::ACCEPTED;
                write_response_body(&mut ctx.response, ctx.request.path.clone()).await?;
                Ok(())
            })
        }
    }

    struct Fail;

    impl Handler for Fail {
        fn call<'a>(&'a self, _ctx: &'a mut HttpContext) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async { Err::<(), _>(io::Error::other("downstream failed")) })
        }
    }

    fn context(path: &str) -> HttpContext {
        HttpContext::new(HttpRequest::new(Method::GET, path))
    }

    #[tokio::test]
    async fn test_stages_run_in_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .with(Tag::new("outer", &trace))
            .with(Tag::new("inner", &trace))
            .endpoint(Echo { trace: Arc::clone(&trace) });
        assert_eq!(pipeline.len(), 2);

        let mut ctx = context("/hello");
        pipeline.handle(&mut ctx).await.unwrap();

        assert_eq!(ctx.response.status, StatusCode::ACCEPTED);
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["outer:in", "inner:in", "endpoint:/hello", "inner:out", "outer:out"]
        );
    }

    #[tokio::test]
    async fn test_next_can_run_twice() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .with(Twice)
            .endpoint(Echo { trace: Arc::clone(&trace) });

        let mut ctx = context("/again");
        pipeline.handle(&mut ctx).await.unwrap();
        assert_eq!(trace.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_stage_is_skipped() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .with_if(false, Twice)
            .endpoint(Echo { trace: Arc::clone(&trace) });
        assert!(pipeline.is_empty());

        pipeline.handle(&mut context("/")).await.unwrap();
        assert_eq!(trace.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_endpoint_error_propagates() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .with(Tag::new("outer", &trace))
            .endpoint(Fail);

        let err = pipeline.handle(&mut context("/")).await.unwrap_err();
        assert_eq!(err.to_string(), "downstream failed");
        assert_eq!(*trace.lock().unwrap(), vec!["outer:in"]);
    }
}
