// Signal handling module
//
// - SIGTERM: graceful shutdown
// - SIGINT:  graceful shutdown (Ctrl+C)

/// Resolve once a shutdown signal arrives
///
/// If a handler cannot be registered the error is logged and that signal is
/// ignored; the other one still works.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to register SIGTERM handler: {e}"));
            None
        }
    };

    let terminate = async {
        match sigterm.as_mut() {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
        () = ctrl_c() => tracing::info!("SIGINT received, shutting down"),
    }
}

/// Non-unix fallback, only Ctrl+C is supported
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
    tracing::info!("Ctrl+C received, shutting down");
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        crate::logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}
