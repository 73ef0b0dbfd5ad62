//! # Activity trait.
//!
//! An [`Activity`] is one registered, repeatable unit of work. The runner owns
//! it and invokes [`run`](Activity::run) once per attempt; between attempts the
//! activity keeps its own state (`&mut self`), so a restarted activity continues
//! where it left off.
//!
//! Activities are cooperative: they must reach an `.await` on a timer
//! regularly, otherwise every other activity of the runner starves.

use async_trait::async_trait;

use crate::error::ActivityError;

/// Boxed activity, as stored by a [`Runner`](crate::Runner).
pub type ActivityRef = Box<dyn Activity>;

/// # Asynchronous, repeatable unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use coopvisor::{Activity, ActivityError};
///
/// struct Heartbeat {
///     beats: u64,
/// }
///
/// #[async_trait]
/// impl Activity for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&mut self) -> Result<(), ActivityError> {
///         self.beats += 1;
///         tokio::time::sleep(std::time::Duration::from_millis(500)).await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Activity: Send + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Runs one invocation.
    ///
    /// `Ok(())` is a normal completion; `Err` is a failure the runner applies
    /// its failure policy to.
    async fn run(&mut self) -> Result<(), ActivityError>;
}

#[async_trait]
impl<A: Activity + ?Sized> Activity for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn run(&mut self) -> Result<(), ActivityError> {
        (**self).run().await
    }
}
