//! # Example: button_buzzer
//!
//! A simulated push button drives a buzzer. Each press plays one non-overlapping
//! beep; a startup jingle plays three jittered beeps once; a flaky sensor
//! fails now and then and is restarted with backoff.
//!
//! Shows how to:
//! - Connect a [`Trigger`] to a [`TriggeredSequence`].
//! - Build an [`OnOffCycle`] with randomized phase durations.
//! - Use `restart_on_exception` with a custom [`BackoffPolicy`].
//! - Stop on Ctrl-C by racing `run()` against [`signals::cancel_on_shutdown_signal`].
//!
//! ## Flow
//! ```text
//! button (Periodic 5 Hz) ── random press ──► Trigger
//!                                              │
//!                                              ▼
//! buzzer (TriggeredSequence 120ms): start ─► run* ─► stop
//! jingle (OnOffCycle x3): on ─ sleep ─ off ─ sleep ... finish
//! sensor (Periodic 4 Hz): fails ~1 in 4 reads ─► restart after backoff
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example button_buzzer
//! ```

use std::time::Duration;

use coopvisor::schedule::jittered;
use coopvisor::{
    signals, ActivityError, BackoffPolicy, JitterPolicy, OnOffCycle, Periodic,
    Runner, RunnerConfig, Trigger, TriggeredSequence,
};
use futures::future::ready;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let runner = Runner::new(RunnerConfig {
        restart_on_exception: true,
        restart_on_completion: false,
        restart_backoff: BackoffPolicy {
            first: Duration::from_millis(50),
            max: Duration::from_millis(400),
            factor: 2.0,
            jitter: JitterPolicy::Full,
        },
        ..RunnerConfig::default()
    })?;

    let button = Trigger::new();
    let press = button.clone();
    runner.add(Periodic::new("button", 5.0, runner.terminate_on_cancel(), move || {
        if rand::random_bool(0.3) {
            println!("[button] pressed");
            press.fire();
        }
        ready(Ok::<_, ActivityError>(()))
    })?);

    let buzzer = TriggeredSequence::builder("buzzer", button, Duration::from_millis(120))
        .on_start(|| {
            println!("[buzzer] beep");
            Ok(())
        })
        .on_stop(|| {
            println!("[buzzer] quiet");
            Ok(())
        })
        .build()?;
    runner.add(buzzer.into_activity(runner.terminate_on_cancel()));

    let jingle = OnOffCycle::builder("jingle", 3)
        .on_duration(jittered(Duration::from_millis(150), JitterPolicy::Equal))
        .off_duration(jittered(Duration::from_millis(100), JitterPolicy::Equal))
        .on(|| {
            println!("[jingle] on");
            Ok(())
        })
        .off(|| {
            println!("[jingle] off");
            Ok(())
        })
        .finish(|| {
            println!("[jingle] done");
            Ok(())
        })
        .build()?;
    runner.add(jingle);

    let mut reads = 0u32;
    runner.add(Periodic::new("sensor", 4.0, runner.terminate_on_cancel(), move || {
        reads += 1;
        let n = reads;
        ready(if rand::random_bool(0.25) {
            Err(ActivityError::fail(format!("read {n}: checksum mismatch")))
        } else {
            println!("[sensor] read {n}: ok");
            Ok(())
        })
    })?);

    let started = Instant::now();
    let run = runner.run(|cancel| {
        if started.elapsed() >= Duration::from_secs(5) {
            cancel.cancel();
        }
        Ok(())
    });

    tokio::pin!(run);
    let report = tokio::select! {
        report = &mut run => report?,
        res = signals::cancel_on_shutdown_signal(runner.cancel_handle()) => {
            res?;
            run.await?
        }
    };

    println!("[done] reason={}", report.cancel_reason);
    for (name, state) in &report.states {
        println!("  {name:<8} {state}");
    }
    Ok(())
}
