//! Host timer facility seam.
//!
//! A [`Debounced`](crate::Debounced) controller never sleeps itself. It asks a
//! [`TimerFacility`] to run a callback after a duration and keeps the returned
//! [`TimerHandle`] so the callback can be cancelled through the facility's own
//! primitive.
//!
//! Shipped facilities:
//!
//! - [`ManualClock`](crate::ManualClock): virtual time, driven by explicit `advance` calls
//! - [`TokioTimer`](crate::TokioTimer): `tokio` feature
//! - [`SmolTimer`](crate::SmolTimer): `smol` feature

use std::{fmt, time::Duration};

/// Callback scheduled on a [`TimerFacility`].
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// "Schedule callback after duration" plus "cancel scheduled callback".
///
/// Implementations must run `task` at most once, and never after the returned
/// handle's [`TimerHandle::cancel`] has returned unless the task had already
/// started running.
pub trait TimerFacility: Send + Sync {
    /// Run `task` once `after` has elapsed.
    fn schedule(&self, after: Duration, task: TimerTask) -> TimerHandle;
}

/// Cancellation handle for a scheduled [`TimerTask`].
///
/// Call [`TimerHandle::cancel`] to cancel. Dropping the handle without cancelling
/// may or may not cancel the task depending on the facility: [`ManualClock`](crate::ManualClock)
/// and the tokio facility keep it scheduled, the smol facility cancels it with the
/// owned task. Only drop a handle uncancelled once its task has fired.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TimerHandle {
    /// Wrap the facility-specific cancellation primitive.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the scheduled task. Idempotent with respect to an already-fired task.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}
