#[cfg(any(feature = "tokio", feature = "smol"))]
use std::time::Duration;

#[cfg(any(feature = "tokio", feature = "smol"))]
use crate::{TimerFacility, TimerHandle, TimerTask};

/// [`TimerFacility`] backed by tokio tasks.
///
/// Each scheduled callback is a spawned task that sleeps and then runs; cancellation
/// aborts the task. Works with paused time (`tokio::time::pause`).
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
#[derive(Clone, Debug)]
pub struct TokioTimer {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioTimer {
    /// Spawn timers on the given runtime.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Spawn timers on the runtime the caller is running in.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like [`tokio::spawn`].
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    /// Same as [`TokioTimer::current`], returning `None` outside a runtime.
    pub fn try_current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

#[cfg(feature = "tokio")]
impl TimerFacility for TokioTimer {
    fn schedule(&self, after: Duration, task: TimerTask) -> TimerHandle {
        let join = self.handle.spawn(async move {
            tokio::time::sleep(after).await;
            task();
        });

        TimerHandle::new(move || join.abort())
    }
}

/// [`TimerFacility`] backed by smol's global executor.
///
/// Cancellation drops the [`smol::Task`], which cancels it.
#[cfg(feature = "smol")]
#[cfg_attr(docsrs, doc(cfg(feature = "smol")))]
#[derive(Clone, Copy, Debug, Default)]
pub struct SmolTimer;

#[cfg(feature = "smol")]
impl TimerFacility for SmolTimer {
    fn schedule(&self, after: Duration, task: TimerTask) -> TimerHandle {
        let spawned = smol::spawn(async move {
            smol::Timer::after(after).await;
            task();
        });

        TimerHandle::new(move || drop(spawned))
    }
}
