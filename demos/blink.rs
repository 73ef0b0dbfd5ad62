//! # Example: blink
//!
//! A status LED blinking at 2 Hz next to a tight button-polling loop, stopped
//! after a few seconds or on Ctrl-C.
//!
//! Shows how to:
//! - Wrap work in [`Periodic`] and [`Looped`] with [`Runner::terminate_on_cancel`].
//! - Stop a run from the callback.
//! - Cancel on OS signals with [`signals::cancel_on_shutdown_signal`].
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example blink
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use coopvisor::{signals, ActivityError, Looped, Periodic, Runner, RunnerConfig};
use futures::future::ready;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let runner = Runner::new(RunnerConfig {
        restart_on_completion: false,
        ..RunnerConfig::default()
    })?;

    let led = Arc::new(AtomicBool::new(false));
    let lit = led.clone();
    runner.add(Periodic::new("led", 2.0, runner.terminate_on_cancel(), move || {
        let on = !lit.fetch_xor(true, Ordering::Relaxed);
        println!("[led] {}", if on { "on" } else { "off" });
        ready(Ok::<_, ActivityError>(()))
    })?);

    let polls = Arc::new(AtomicU64::new(0));
    let counted = polls.clone();
    runner.add(
        Looped::new("button-poll", runner.terminate_on_cancel(), move || {
            counted.fetch_add(1, Ordering::Relaxed);
            ready(Ok::<_, ActivityError>(()))
        })
        .with_tick(Duration::from_millis(20)),
    );

    let signal = tokio::spawn(signals::cancel_on_shutdown_signal(runner.cancel_handle()));

    let started = Instant::now();
    let report = runner
        .run(|cancel| {
            if started.elapsed() >= Duration::from_secs(3) {
                cancel.cancel();
            }
            Ok(())
        })
        .await?;
    signal.abort();

    println!(
        "[done] reason={} button polls={} states={:?}",
        report.cancel_reason,
        polls.load(Ordering::Relaxed),
        report.states
    );
    Ok(())
}
