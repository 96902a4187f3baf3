// Server loop module
// Accepts connections until shutdown is requested, then drains in-flight ones

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Accept connections until `signals` requests shutdown.
///
/// After shutdown the listener is closed and in-flight connections get up to
/// `max(read_timeout, write_timeout)` to finish.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) {
    // Registered once so a shutdown between iterations is never missed
    let shutdown = signals.shutdown.notified();
    tokio::pin!(shutdown);
    shutdown.as_mut().enable();

    while !signals.is_shutdown_requested() {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_info("Listener closed, waiting for in-flight connections");

    let performance = &state.config.performance;
    let drain_timeout = Duration::from_secs(std::cmp::max(
        performance.read_timeout,
        performance.write_timeout,
    ));
    let drained = drain_connections(&state, drain_timeout).await;
    if drained {
        logger::log_info("Shutdown complete");
    } else {
        logger::log_warning(&format!(
            "Shutdown with {} connection(s) still open after {}s",
            state.active_connections.load(Ordering::SeqCst),
            drain_timeout.as_secs()
        ));
    }
}

/// Wait until no connections are active or `timeout` elapses.
///
/// Returns `true` if every connection finished.
async fn drain_connections(state: &AppState, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if state.active_connections.load(Ordering::SeqCst) == 0 {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
