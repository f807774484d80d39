//! OS signal handling.
//!
//! SIGINT or SIGTERM triggers graceful shutdown. A second signal is not
//! waited for; tasks are expected to stop promptly.

use crate::lifecycle::Shutdown;

/// Wait for a termination signal, then trigger `shutdown`.
pub async fn wait_for_signal(shutdown: Shutdown) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received ctrl-c"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    shutdown.trigger();
}
