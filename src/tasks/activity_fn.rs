//! # Closure-backed activity (`ActivityFn`)
//!
//! [`ActivityFn`] wraps `F: FnMut() -> Fut`; each invocation creates a fresh
//! future. State shared across invocations lives in the closure's captures.
//!
//! ## Example
//! ```rust
//! use coopvisor::{Activity, ActivityError, ActivityFn};
//!
//! let mut reads = 0u32;
//! let poll = ActivityFn::new("sensor", move || {
//!     reads += 1;
//!     async move { Ok::<_, ActivityError>(()) }
//! });
//!
//! assert_eq!(poll.name(), "sensor");
//! ```

use std::borrow::Cow;
use std::future::Future;

use async_trait::async_trait;

use crate::error::ActivityError;
use crate::tasks::activity::Activity;

/// Function-backed activity.
pub struct ActivityFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ActivityFn<F> {
    /// Creates a new function-backed activity.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F, Fut> Activity for ActivityFn<F>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ActivityError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&mut self) -> Result<(), ActivityError> {
        (self.f)().await
    }
}
