//! # Example: light_show
//!
//! A pixel strip plays a short color script twice. The script is a
//! [`TimedEvents`] timeline started by a [`Trigger`]; the runner callback
//! presses "play" and decides when the evening is over.
//!
//! Shows how to:
//! - Drive a [`TimedEvents`] timeline from a [`Looped`] activity.
//! - Start a timeline from a trigger with [`TimedEvents::start_on`].
//! - Observe the runner with a custom [`Subscribe`] instead of the built-in log writer.
//!
//! ## Flow
//! ```text
//! callback ── t=0s, t=1.5s ──► play (Trigger)
//!                                  │ start_on
//!                                  ▼
//! strip (Looped, 10ms tick): run() ─► colors due by now
//!   0ms red · 200ms green · 400ms blue · 400ms white · 800ms off
//!
//! Runner ── Event ──► Tally (custom Subscribe)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example light_show
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use coopvisor::{
    ActivityError, Event, EventKind, Looped, Runner, RunnerConfig, Subscribe, TimedEvents,
    Trigger,
};
use futures::future::ready;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug)]
enum Color {
    Red,
    Green,
    Blue,
    White,
    Off,
}

/// Counts lifecycle events and prints the terminal ones.
#[derive(Default)]
struct Tally {
    events: AtomicUsize,
}

impl Subscribe for Tally {
    fn on_event(&self, ev: &Event) {
        self.events.fetch_add(1, Ordering::Relaxed);
        match ev.kind {
            EventKind::RunStarted => {
                println!("[tally] run started with {} activities", ev.count.unwrap_or(0));
            }
            EventKind::CancelRequested => {
                println!("[tally] cancel requested: {}", ev.reason.as_deref().unwrap_or("-"));
            }
            EventKind::ActivityCancelled | EventKind::ActivityRemoved => {
                println!("[tally] {:?} {}", ev.kind, ev.activity.as_deref().unwrap_or("?"));
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "tally"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let tally = Arc::new(Tally::default());
    let runner = Runner::builder(RunnerConfig {
        callback_frequency: 20.0,
        ..RunnerConfig::default()
    })
    .with_subscriber(tally.clone())
    .without_logging()
    .build()?;

    let mut script = TimedEvents::new();
    script
        .add_event(Duration::ZERO, Color::Red)
        .add_event(Duration::from_millis(200), Color::Green)
        .add_event(Duration::from_millis(400), Color::Blue)
        .add_event(Duration::from_millis(400), Color::White)
        .add_event(Duration::from_millis(800), Color::Off);

    let play = Trigger::new();
    let pressed = play.clone();
    let show_start = Instant::now();
    runner.add(
        Looped::new("strip", runner.terminate_on_cancel(), move || {
            if script.start_on(&pressed) {
                println!("[strip] show starts");
            }
            for color in script.run() {
                println!("[strip] {:>5}ms {color:?}", show_start.elapsed().as_millis());
            }
            ready(Ok::<_, ActivityError>(()))
        })
        .with_tick(Duration::from_millis(10)),
    );

    let started = Instant::now();
    let mut plays = 0;
    let report = runner
        .run(|cancel| {
            let t = started.elapsed();
            let due = match plays {
                0 => true,
                1 => t >= Duration::from_millis(1500),
                _ => false,
            };
            if due {
                plays += 1;
                play.fire();
            }
            if t >= Duration::from_millis(2800) {
                cancel.cancel();
            }
            Ok(())
        })
        .await?;

    println!(
        "[done] {} events observed, strip ended {}",
        tally.events.load(Ordering::Relaxed),
        report
            .state_of("strip")
            .map(|s| s.to_string())
            .unwrap_or_default()
    );
    Ok(())
}
