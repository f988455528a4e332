// Connection handling module
// Accepts TCP connections and serves HTTP/1.1 requests through the pipeline

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioIo, TokioTimer};

use crate::config::{AppState, PerformanceConfig};
use crate::http::response;
use crate::logger;
use crate::server::adapter;

/// Accept and process a connection, checking the connection limit
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Serve one connection on a local task, releasing its slot when done
fn handle_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(performance.keep_alive_timeout > 0)
            .header_read_timeout(header_timeout(performance));

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handle_request(req, peer_addr, Arc::clone(&service_state))),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

/// How long a connection may wait for the next request's headers
///
/// Between keep-alive requests this is the idle timeout; with keep-alive off
/// it bounds the single request's header read.
fn header_timeout(performance: &PerformanceConfig) -> Duration {
    if performance.keep_alive_timeout > 0 {
        Duration::from_secs(performance.keep_alive_timeout)
    } else {
        Duration::from_secs(performance.read_timeout)
    }
}

/// Upper bound for reading one request body and producing its response
fn request_timeout(performance: &PerformanceConfig) -> Duration {
    Duration::from_secs(std::cmp::max(
        performance.read_timeout,
        performance.write_timeout,
    ))
}

/// Run one request through the pipeline
///
/// Pipeline failures become a 500 and overruns a 408; neither tears down the connection.
pub async fn handle_request(
    req: Request<Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(serve_within(req, peer_addr, &state).await)
}

async fn serve_within<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let limit = request_timeout(&state.config.performance);
    let path = req.uri().path().to_string();
    match tokio::time::timeout(limit, serve(req, peer_addr, state)).await {
        Ok(resp) => resp,
        Err(_) => {
            logger::log_warning(&format!(
                "Request {path} from {peer_addr} timed out after {} seconds",
                limit.as_secs()
            ));
            response::build_408_response()
        }
    }
}

async fn serve<B>(req: Request<B>, peer_addr: SocketAddr, state: &AppState) -> Response<Full<Bytes>>
where
    B: hyper::body::Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let mut ctx =
        match adapter::into_context(req, Some(peer_addr), state.config.http.max_body_size).await {
            Ok(ctx) => ctx,
            Err(resp) => return resp,
        };

    if let Err(e) = state.pipeline.handle(&mut ctx).await {
        logger::log_error(&format!(
            "Pipeline failed for {} {}: {e}",
            ctx.request.method, ctx.request.path
        ));
        return response::build_500_response();
    }

    match adapter::into_response(ctx, &state.config.http.server_name).await {
        Ok(resp) => resp,
        Err(e) => {
            logger::log_error(&format!("Failed to read response body: {e}"));
            response::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TempDir;
    use http_body_util::BodyExt;
    use hyper::body::Frame;
    use hyper::{Method, StatusCode};
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Request body whose client never sends anything
    struct Stalled;

    impl hyper::body::Body for Stalled {
        type Data = Bytes;
        type Error = std::io::Error;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Self::Error>>> {
            Poll::Pending
        }
    }

    fn state(site: &TempDir) -> AppState {
        AppState::new(site.config())
    }

    fn get(path: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_serve_through_pipeline() {
        let site = TempDir::new("conn");
        site.file("index.html", "<main></main>");
        let state = state(&site);
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();

        let resp = serve_within(get("/profile?id=3"), peer, &state).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["server"], "spa-fallback");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<main></main>");

        let resp = serve_within(get("/api/nothing"), peer, &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = serve_within(get("/logo.png"), peer, &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_timeouts_from_config() {
        let mut performance = PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 45,
            max_connections: None,
        };
        assert_eq!(header_timeout(&performance), Duration::from_secs(75));
        assert_eq!(request_timeout(&performance), Duration::from_secs(45));

        performance.keep_alive_timeout = 0;
        assert_eq!(header_timeout(&performance), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_stalled_body_is_408() {
        let site = TempDir::new("conn-stall");
        let mut config = site.config();
        config.performance.read_timeout = 0;
        config.performance.write_timeout = 0;
        let state = AppState::new(config);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/echo")
            .body(Stalled)
            .unwrap();
        let resp = serve_within(req, "127.0.0.1:5000".parse().unwrap(), &state).await;
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
