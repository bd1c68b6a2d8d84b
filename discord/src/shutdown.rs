//! Stop signal for the bot.
//!
//! Once a stop is requested the interactions server finishes in-flight
//! requests and returns from [`Bot::run`](crate::Bot::run). Verify tasks
//! already spawned keep running on the runtime until it is dropped.

use std::future::Future;

use tokio::signal;
use tokio::sync::watch;

/// Latching stop flag. A waiter that subscribes after the stop was
/// requested still sees it.
pub struct ShutdownController {
    stop: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (stop, _) = watch::channel(false);
        Self { stop }
    }

    /// Ask the bot to stop. Repeated calls are harmless.
    pub fn request_stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_stopping(&self) -> bool {
        *self.stop.borrow()
    }

    /// Resolves once a stop has been requested.
    pub fn stopped(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.stop.subscribe();
        async move {
            loop {
                if *rx.borrow_and_update() {
                    return;
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    }

    /// Request a stop on the first SIGINT or SIGTERM.
    pub async fn stop_on_signal(&self) {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "SIGTERM handler unavailable, only SIGINT stops the bot");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let signal = tokio::select! {
            _ = signal::ctrl_c() => "SIGINT",
            _ = terminate => "SIGTERM",
        };
        tracing::info!(signal, "stopping interactions endpoint");
        self.request_stop();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
