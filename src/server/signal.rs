// Signal handling module
//
// Supported signals:
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGTERM: Graceful shutdown (Unix only)

/// Shutdown signal listener.
///
/// Handlers are installed by [`ShutdownSignal::register`], so a signal that
/// arrives while a request is in flight is delivered on the next
/// [`ShutdownSignal::recv`] instead of killing the process.
#[cfg(unix)]
pub struct ShutdownSignal {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    /// Install the handlers. Must be called from within a tokio runtime.
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for SIGINT or SIGTERM
    pub async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigint.recv() => crate::logger::log_debug("SIGINT received"),
            _ = self.sigterm.recv() => crate::logger::log_debug("SIGTERM received"),
        }
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub struct ShutdownSignal(());

#[cfg(not(unix))]
impl ShutdownSignal {
    pub fn register() -> std::io::Result<Self> {
        Ok(Self(()))
    }

    pub async fn recv(&mut self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            crate::logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
