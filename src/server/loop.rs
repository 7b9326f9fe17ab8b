// Server loop module
// Accepts connections until shutdown, then drains active connections

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Interval at which the drain phase re-checks the connection counter
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` resolves.
///
/// After shutdown the listener is closed, readiness starts failing, and
/// active connections get up to `performance.write_timeout` to finish.
pub async fn run_server<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicU64::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    state.start_draining();
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));

    let grace = Duration::from_secs(state.config.performance.write_timeout);
    if tokio::time::timeout(grace, wait_for_drain(&active_connections))
        .await
        .is_err()
    {
        logger::log_warning(&format!(
            "{} connections still active after {}s, exiting anyway",
            active_connections.load(Ordering::SeqCst),
            grace.as_secs()
        ));
    }
}

async fn wait_for_drain(active_connections: &AtomicU64) {
    while active_connections.load(Ordering::SeqCst) > 0 {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
