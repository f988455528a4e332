// Server module entry point
// Listener setup, accept loop and per-connection serving

pub mod adapter;
pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_listener;

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Accept connections until `shutdown` resolves
///
/// Must run inside a `LocalSet`: connections are served on local tasks.
/// In-flight connections keep running after the loop exits.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_info("Accept loop stopped");
                return Ok(());
            }
        }
    }
}
