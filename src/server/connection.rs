// 连接处理模块
// 处理单个 TCP 连接的接受和服务

use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, StatusCode};
use hyper_util::rt::{TokioIo, TokioTimer};
use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppState;
use crate::handler;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Accept a connection, enforcing the connection limit
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Serve one connection in a spawned task.
///
/// With `keep_alive_timeout > 0` the connection stays open between requests
/// and is closed after that many idle seconds; with `0` every response
/// closes it. The active connection counter is decremented when the task ends.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let keep_alive = performance.keep_alive_timeout > 0;
        let header_timeout = if keep_alive {
            performance.keep_alive_timeout
        } else {
            performance.read_timeout
        };

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(keep_alive)
            .header_read_timeout(Duration::from_secs(header_timeout));

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve_request(req, peer_addr, Arc::clone(&service_state))),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Run one request through the router and write its access log line
async fn serve_request(
    req: Request<Incoming>,
    peer_addr: std::net::SocketAddr,
    state: Arc<AppState>,
) -> Result<hyper::Response<http_body_util::Full<hyper::body::Bytes>>, Infallible> {
    let started = Instant::now();
    let mut entry = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(peer_addr, &req));

    // Each request (body read included) is bounded by max(read, write) timeout
    let performance = &state.config.performance;
    let request_timeout = Duration::from_secs(std::cmp::max(
        performance.read_timeout,
        performance.write_timeout,
    ));
    let response = match tokio::time::timeout(
        request_timeout,
        handler::handle_request(req, Arc::clone(&state)),
    )
    .await
    {
        Ok(response) => response?,
        Err(_) => {
            logger::log_warning(&format!(
                "Request from {peer_addr} timed out after {} seconds",
                request_timeout.as_secs()
            ));
            http::build_text_response(StatusCode::REQUEST_TIMEOUT, "408 Request Timeout", false)
        }
    };

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(entry, &state.config.logging.access_log_format);
    }
    Ok(response)
}
