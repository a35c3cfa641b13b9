// Connection handling module
// Accepts a single TCP connection and serves HTTP/1.1 on it

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::handler;
use crate::logger;
use crate::state::AppState;

/// Take ownership of an accepted socket, or drop it when
/// `performance.max_connections` is already reached.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    active: &Arc<AtomicUsize>,
) {
    // Reserve a slot before checking the limit
    let in_flight = active.fetch_add(1, Ordering::SeqCst);
    let limit = state
        .config
        .performance
        .max_connections
        .map(|max| usize::try_from(max).unwrap_or(usize::MAX));

    if let Some(max) = limit {
        if in_flight >= max {
            active.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Connection limit {max} reached, dropping {peer_addr}"
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(active),
    );
}

/// Serve one connection in a spawned task.
///
/// The counter is decremented when the connection closes or times out.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    active: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let mut http = http1::Builder::new();
        http.keep_alive(state.config.performance.keep_alive);
        let timeout = state
            .config
            .performance
            .connection_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let service_state = Arc::clone(&state);
        let conn = http.serve_connection(
            TokioIo::new(stream),
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
        );

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, conn).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => logger::log_connection_error(&err),
                Err(_) => logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    limit.as_secs()
                )),
            },
            None => {
                if let Err(err) = conn.await {
                    logger::log_connection_error(&err);
                }
            }
        }

        active.fetch_sub(1, Ordering::SeqCst);
    });
}
