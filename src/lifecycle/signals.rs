//! OS signal handling.
//!
//! Ctrl+C is translated into a cancellation so that an in-flight retry wait or
//! status poll returns `Cancelled` instead of the process dying mid-request.

use crate::lifecycle::cancel::Cancellation;

/// Cancel `cancellation` on the first Ctrl+C.
///
/// Returns the task handle; dropping it leaves the watcher running.
pub fn cancel_on_ctrl_c(cancellation: Cancellation) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, cancelling");
                cancellation.cancel();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            }
        }
    })
}
