//! # OS shutdown signals.
//!
//! Desktop builds usually stop a device script on Ctrl-C. [`cancel_on_shutdown_signal`]
//! waits for a termination signal and sets a runner's cancel flag, so the run
//! drains like any other cancellation.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT` (and Ctrl-C).
//! **Other platforms:** Ctrl-C via [`tokio::signal::ctrl_c`].

use crate::core::CancelHandle;

/// Completes when the process receives a termination signal.
///
/// Each call creates independent signal listeners. Fails if a listener cannot
/// be registered.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Completes when the process receives a termination signal.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Cancels `handle` once a termination signal arrives.
///
/// Meant to be polled next to [`Runner::run`](crate::Runner::run), for example
/// in a `tokio::select!` or a spawned task. A signal arriving before the run
/// starts is lost, because `run()` resets the flag.
pub async fn cancel_on_shutdown_signal(handle: CancelHandle) -> std::io::Result<()> {
    wait_for_shutdown_signal().await?;
    tracing::info!("shutdown signal received; cancelling runner");
    handle.cancel();
    Ok(())
}
