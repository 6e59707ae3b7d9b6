use std::{
    collections::BTreeMap,
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::Mutex;

use crate::{TimerFacility, TimerHandle, TimerTask};

/// Deterministic virtual-time [`TimerFacility`].
///
/// Time only moves when [`ManualClock::advance`] is called. Due callbacks run on the
/// advancing thread, one at a time, ordered by deadline and then by scheduling order.
/// Callbacks scheduled while advancing (including zero-delay ones) run in the same
/// `advance` if their deadline falls inside it.
///
/// Useful as the event loop of a single-threaded host, and for tests.
///
/// ```
/// use std::{sync::{Arc, atomic::{AtomicUsize, Ordering}}, time::Duration};
/// use quiescent::{Debounced, DebouncePolicy, ManualClock};
///
/// let clock = ManualClock::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counter = hits.clone();
/// let debounced = Debounced::new(
///     move |_: ()| { counter.fetch_add(1, Ordering::SeqCst); },
///     DebouncePolicy::new(Duration::from_millis(100)),
///     clock.clone(),
/// )
/// .unwrap();
///
/// debounced.call(());
/// clock.advance(Duration::from_millis(50));
/// debounced.call(());
/// clock.advance(Duration::from_millis(100));
///
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<ClockState>>,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), TimerTask>,
}

impl ManualClock {
    /// Clock at virtual time zero with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.inner.lock().now
    }

    /// Number of callbacks scheduled and not yet fired or cancelled.
    pub fn pending_timers(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Move time forward by `by`, running every callback that falls due.
    ///
    /// Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let mut fired = 0;

        loop {
            let next = {
                let mut state = self.inner.lock();
                match state.queue.first_key_value() {
                    Some((&(deadline, _), _)) if deadline <= target => {
                        state.now = deadline;
                        state.queue.pop_first()
                    }
                    _ => None,
                }
            };

            // run outside the lock: callbacks may schedule or cancel
            let Some((_, task)) = next else {
                break;
            };

            task();
            fired += 1;
        }

        let mut state = self.inner.lock();
        if state.now < target {
            state.now = target;
        }

        fired
    } // end method advance
}

impl TimerFacility for ManualClock {
    fn schedule(&self, after: Duration, task: TimerTask) -> TimerHandle {
        let mut state = self.inner.lock();
        let key = (state.now.saturating_add(after), state.next_seq);
        state.next_seq += 1;
        state.queue.insert(key, task);

        let clock: Weak<Mutex<ClockState>> = Arc::downgrade(&self.inner);
        TimerHandle::new(move || {
            if let Some(clock) = clock.upgrade() {
                clock.lock().queue.remove(&key);
            }
        })
    }
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("ManualClock")
            .field("now", &state.now)
            .field("pending_timers", &state.queue.len())
            .finish()
    }
}
