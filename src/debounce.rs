//! Debounce controller.
//!
//! [`Debounced`] wraps a target function with a [`DebouncePolicy`] and a
//! [`TimerFacility`]. Calls go through [`Debounced::call`] (or
//! [`Debounced::call_with`] to carry a calling context) and are deferred,
//! coalesced or forwarded according to the policy.
//!
//! # Per-burst state machine
//!
//! ```text
//! IDLE    --call--> (leading? invoke, then) arm timers --> PENDING
//! PENDING --call--> PENDING (args replaced, quiet timer re-armed, max-wait timer kept)
//! PENDING --quiet timer, trailing--> invoke --> IDLE
//! PENDING --quiet timer, !trailing--> IDLE
//! PENDING --max-wait timer--> invoke --> IDLE
//! PENDING --cancel()--> IDLE
//! PENDING --flush()--> invoke --> IDLE
//! ```
//!
//! # Thread Safety
//!
//! All mutable state sits behind one [`parking_lot::Mutex`]. Timer callbacks carry
//! the token of the timer they belong to and are discarded under that lock when
//! the controller no longer has that timer armed, so a timer cancelled by
//! [`Debounced::cancel`], [`Debounced::flush`] or a re-arm never acts afterwards,
//! even if the facility's own cancellation lost a race with the firing.
//!
//! The target always runs with the lock released. Pending state and timers are
//! settled first, and a leading call arms its timers only after the target
//! returns, so a panicking target leaves the controller idle. Replaced or
//! discarded arguments are dropped outside the lock as well, so neither a target
//! nor an argument's `Drop` deadlocks by calling back into the controller.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::{DebouncePolicy, QuiescentError, TimerFacility, TimerHandle};

type Target<A, R, C> = dyn Fn(Option<C>, A) -> R + Send + Sync;

/// Latest call's arguments and calling context. Set and cleared together.
struct Pending<A, C> {
    args: A,
    context: Option<C>,
}

struct ArmedTimer {
    token: u64,
    handle: TimerHandle,
}

impl ArmedTimer {
    fn cancel(self) {
        self.handle.cancel();
    }
}

struct State<A, C> {
    pending: Option<Pending<A, C>>,
    quiet_timer: Option<ArmedTimer>,
    max_wait_timer: Option<ArmedTimer>,
    force_leading: bool,
    next_token: u64,
}

impl<A, C> State<A, C> {
    fn next_token(&mut self) -> u64 {
        self.next_token = self.next_token.wrapping_add(1);
        self.next_token
    }

    fn cancel_timers(&mut self) {
        if let Some(timer) = self.quiet_timer.take() {
            timer.cancel();
        }
        if let Some(timer) = self.max_wait_timer.take() {
            timer.cancel();
        }
    }
}

struct Inner<A, R, C> {
    target: Box<Target<A, R, C>>,
    policy: DebouncePolicy,
    timer: Arc<dyn TimerFacility>,
    state: Mutex<State<A, C>>,
}

/// Handle to a debounced target function.
///
/// Cloning yields another handle to the same controller. When the last handle is
/// dropped, outstanding timers are cancelled and nothing pending is invoked.
///
/// `A` is the argument type (use a tuple for several arguments), `R` the target's
/// return type and `C` an opaque calling context handed back to the target as-is.
///
/// # Examples
///
/// ```
/// use std::{sync::{Arc, Mutex}, time::Duration};
/// use quiescent::{Debounced, DebouncePolicy, ManualClock};
///
/// let clock = ManualClock::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = seen.clone();
/// let search = Debounced::new(
///     move |query: String| sink.lock().unwrap().push(query),
///     DebouncePolicy::new(Duration::from_millis(100)),
///     clock.clone(),
/// )
/// .unwrap();
///
/// search.call("r".to_string());
/// search.call("ru".to_string());
/// search.call("rust".to_string());
/// clock.advance(Duration::from_millis(100));
///
/// assert_eq!(*seen.lock().unwrap(), vec!["rust".to_string()]);
/// ```
pub struct Debounced<A, R, C = ()> {
    inner: Arc<Inner<A, R, C>>,
}

impl<A, R, C> Clone for Debounced<A, R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A, R> Debounced<A, R, ()>
where
    A: Send + 'static,
    R: 'static,
{
    /// Debounce a context-free target.
    ///
    /// Fails with [`QuiescentError::InvalidPolicy`] when `max_wait` is shorter than `wait`.
    pub fn new<F, T>(target: F, policy: DebouncePolicy, timer: T) -> Result<Self, QuiescentError>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        T: TimerFacility + 'static,
    {
        Self::with_context(move |_: Option<()>, args: A| target(args), policy, timer)
    }
}

impl<A, R, C> Debounced<A, R, C>
where
    A: Send + 'static,
    R: 'static,
    C: Send + 'static,
{
    /// Debounce a target that receives the calling context of the call being invoked.
    ///
    /// The context is `Some` exactly when that call was made through
    /// [`Debounced::call_with`].
    pub fn with_context<F, T>(
        target: F,
        policy: DebouncePolicy,
        timer: T,
    ) -> Result<Self, QuiescentError>
    where
        F: Fn(Option<C>, A) -> R + Send + Sync + 'static,
        T: TimerFacility + 'static,
    {
        if let Err(err) = policy.validate() {
            tracing::warn!(error = %err, "debounce.policy.rejected");
            return Err(err);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                target: Box::new(target),
                policy,
                timer: Arc::new(timer),
                state: Mutex::new(State {
                    pending: None,
                    quiet_timer: None,
                    max_wait_timer: None,
                    force_leading: false,
                    next_token: 0,
                }),
            }),
        })
    } // end constructor

    /// Call without a calling context.
    ///
    /// Returns the target's result when this call was a leading call (leading edge
    /// with no quiet period outstanding, or forced by [`Debounced::force_next`]);
    /// `None` when the invocation was deferred.
    pub fn call(&self, args: A) -> Option<R> {
        self.inner.call(None, args)
    }

    /// Call with a calling context that the target receives back unchanged.
    pub fn call_with(&self, context: C, args: A) -> Option<R> {
        self.inner.call(Some(context), args)
    }

    /// Cancel both timers and, if a call is pending, invoke the target with it now.
    ///
    /// Returns `None` when nothing was pending.
    pub fn flush(&self) -> Option<R> {
        self.inner.flush()
    }

    /// Cancel both timers and discard any pending call without invoking. Idempotent.
    pub fn cancel(&self) {
        let discarded = {
            let mut state = self.inner.state.lock();
            state.cancel_timers();
            state.pending.take()
        };

        if discarded.is_some() {
            tracing::debug!("debounce.cancel, pending call discarded");
        }
    }

    /// Make exactly the next call a leading call, whatever the policy says.
    ///
    /// Does not invoke anything or touch the timers.
    pub fn force_next(&self) {
        self.inner.state.lock().force_leading = true;
    }

    /// Whether a call is waiting for a trailing, max-wait or flush invocation.
    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().pending.is_some()
    }

    /// The policy this controller was built with.
    pub fn policy(&self) -> &DebouncePolicy {
        &self.inner.policy
    }
} // end of impl

/// Shorthand for [`Debounced::new`].
pub fn debounce<A, R, F, T>(
    target: F,
    policy: DebouncePolicy,
    timer: T,
) -> Result<Debounced<A, R>, QuiescentError>
where
    A: Send + 'static,
    R: 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
    T: TimerFacility + 'static,
{
    Debounced::new(target, policy, timer)
}

impl<A, R, C> Inner<A, R, C>
where
    A: Send + 'static,
    R: 'static,
    C: Send + 'static,
{
    fn call(self: &Arc<Self>, context: Option<C>, args: A) -> Option<R> {
        let call = Pending { args, context };

        let (leading, replaced) = {
            let mut state = self.state.lock();

            let is_leading_call = (self.policy.is_leading() && state.quiet_timer.is_none())
                || state.force_leading;

            if is_leading_call {
                state.force_leading = false;
                (Some(call), state.pending.take())
            } else {
                let replaced = state.pending.replace(call);
                self.arm_timers(&mut state);
                (None, replaced)
            }
        };

        // older call's values are dropped outside the lock
        drop(replaced);

        let call = leading?;
        let result = self.invoke(call, "leading");

        // armed only once the target returned: a panicking leading call leaves no
        // quiet period behind, so the next call leads again
        self.arm_timers(&mut self.state.lock());

        Some(result)
    } // end method call

    fn arm_timers(self: &Arc<Self>, state: &mut State<A, C>) {
        if let Some(timer) = state.quiet_timer.take() {
            timer.cancel();
        }

        let token = state.next_token();
        let controller = Arc::downgrade(self);
        let handle = self.timer.schedule(
            self.policy.wait(),
            Box::new(move || {
                if let Some(controller) = Weak::upgrade(&controller) {
                    controller.on_quiet_period_elapsed(token);
                }
            }),
        );
        state.quiet_timer = Some(ArmedTimer { token, handle });
        tracing::trace!(token, wait = ?self.policy.wait(), "debounce.quiet_timer.armed");

        if let Some(max_wait) = self.policy.max_wait_ceiling()
            && state.max_wait_timer.is_none()
        {
            let token = state.next_token();
            let controller = Arc::downgrade(self);
            let handle = self.timer.schedule(
                max_wait,
                Box::new(move || {
                    if let Some(controller) = Weak::upgrade(&controller) {
                        controller.on_max_wait_elapsed(token);
                    }
                }),
            );
            state.max_wait_timer = Some(ArmedTimer { token, handle });
            tracing::trace!(token, ?max_wait, "debounce.max_wait_timer.armed");
        }
    } // end method arm_timers

    fn on_quiet_period_elapsed(&self, token: u64) {
        let (due, discarded) = {
            let mut state = self.state.lock();

            if state.quiet_timer.as_ref().map(|timer| timer.token) != Some(token) {
                tracing::trace!(token, "debounce.quiet_timer.stale");
                return;
            }

            // fired; nothing left to cancel for this one
            state.quiet_timer = None;
            if let Some(timer) = state.max_wait_timer.take() {
                timer.cancel();
            }

            let pending = state.pending.take();
            if self.policy.is_trailing() {
                (pending, None)
            } else {
                (None, pending)
            }
        };

        if discarded.is_some() {
            tracing::trace!("debounce.quiet_timer.elapsed, pending call dropped");
        }
        drop(discarded);

        if let Some(call) = due {
            let _result = self.invoke(call, "trailing");
            tracing::trace!("debounce.trailing.result_discarded");
        }
    } // end method on_quiet_period_elapsed

    fn on_max_wait_elapsed(&self, token: u64) {
        let due = {
            let mut state = self.state.lock();

            if state.max_wait_timer.as_ref().map(|timer| timer.token) != Some(token) {
                tracing::trace!(token, "debounce.max_wait_timer.stale");
                return;
            }

            state.max_wait_timer = None;
            if let Some(timer) = state.quiet_timer.take() {
                timer.cancel();
            }

            state.pending.take()
        };

        if let Some(call) = due {
            let _result = self.invoke(call, "max_wait");
            tracing::trace!("debounce.max_wait.result_discarded");
        }
    } // end method on_max_wait_elapsed

    fn flush(&self) -> Option<R> {
        let due = {
            let mut state = self.state.lock();
            state.cancel_timers();
            state.pending.take()
        };

        due.map(|call| self.invoke(call, "flush"))
    }

    fn invoke(&self, call: Pending<A, C>, edge: &'static str) -> R {
        tracing::debug!(edge, "debounce.invoke");
        (self.target)(call.context, call.args)
    }
}

impl<A, R, C> Drop for Inner<A, R, C> {
    fn drop(&mut self) {
        self.state.get_mut().cancel_timers();
    }
}
