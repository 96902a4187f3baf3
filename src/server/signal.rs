// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Signal handler state
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    pub shutdown: Notify,
    /// Whether shutdown has been requested
    pub shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Notify::new(),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Mark shutdown as requested and wake every waiter
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix only)
///
/// Spawns a background task that waits for SIGTERM or SIGINT and then
/// requests shutdown.
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        logger::log_debug(&format!(
            "[SIGNAL] SIGTERM/SIGINT handlers registered (pid {})",
            std::process::id()
        ));

        tokio::select! {
            _ = sigterm.recv() => logger::log_info("[SIGNAL] SIGTERM received, shutting down"),
            _ = sigint.recv() => logger::log_info("[SIGNAL] SIGINT received, shutting down"),
        }
        handler.request_shutdown();
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_info("[SIGNAL] Ctrl+C received, shutting down");
            handler.request_shutdown();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_request_shutdown_wakes_waiter() {
        let handler = Arc::new(SignalHandler::new());
        let notified = handler.shutdown.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        handler.request_shutdown();

        assert!(handler.is_shutdown_requested());
        tokio::time::timeout(Duration::from_secs(1), notified)
            .await
            .expect("waiter should be woken");
    }
}
