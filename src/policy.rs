use std::time::Duration;

use crate::QuiescentError;

/// Timing policy for a [`Debounced`](crate::Debounced) controller.
///
/// - `wait`: quiet period. Calls are coalesced until this much time passes with no new call.
/// - `leading`: the first call of a burst invokes the target immediately.
/// - `trailing`: the last call of a burst invokes the target once the quiet period elapses.
/// - `max_wait`: ceiling on how long a burst may defer invocation, measured from the
///   first pending call of the burst. Never reset by later calls.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use quiescent::DebouncePolicy;
///
/// let policy = DebouncePolicy::new(Duration::from_millis(50))
///     .leading(true)
///     .max_wait(Duration::from_millis(200));
///
/// assert!(policy.is_leading());
/// assert!(policy.is_trailing());
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebouncePolicy {
    wait: Duration,
    leading: bool,
    trailing: bool,
    max_wait: Option<Duration>,
}

impl DebouncePolicy {
    /// Trailing-only policy with the given quiet period.
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: false,
            trailing: true,
            max_wait: None,
        }
    }

    /// Invoke on the leading edge of a burst.
    pub fn leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    /// Invoke on the trailing edge of a burst.
    pub fn trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    /// Force an invocation at most `max_wait` after the first pending call of a burst.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Quiet period.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Whether leading-edge invocation is enabled.
    pub fn is_leading(&self) -> bool {
        self.leading
    }

    /// Whether trailing-edge invocation is enabled.
    pub fn is_trailing(&self) -> bool {
        self.trailing
    }

    /// Max-wait ceiling, if configured.
    pub fn max_wait_ceiling(&self) -> Option<Duration> {
        self.max_wait
    }

    /// Reject a `max_wait` shorter than the quiet period.
    pub fn validate(&self) -> Result<(), QuiescentError> {
        match self.max_wait {
            Some(max_wait) if max_wait < self.wait => Err(QuiescentError::InvalidPolicy(format!(
                "max_wait ({}ms) must not be shorter than wait ({}ms)",
                max_wait.as_millis(),
                self.wait.as_millis()
            ))),
            _ => Ok(()),
        }
    }
}

/// Raw, millisecond-based options as a host would hand them over.
///
/// Unset flags take the [`DebouncePolicy`] defaults. Convert with
/// [`DebouncePolicy::try_from`], which rejects negative durations and a
/// `max_wait_ms` below `wait_ms`.
///
/// ```
/// use quiescent::{DebounceOptions, DebouncePolicy};
///
/// let policy = DebouncePolicy::try_from(DebounceOptions {
///     wait_ms: 100,
///     leading: Some(true),
///     trailing: Some(false),
///     max_wait_ms: None,
/// })
/// .unwrap();
///
/// assert!(policy.is_leading());
/// assert!(!policy.is_trailing());
///
/// assert!(DebouncePolicy::try_from(DebounceOptions::with_wait_ms(-1)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebounceOptions {
    /// Quiet period in milliseconds.
    pub wait_ms: i64,
    /// Leading-edge invocation. Defaults to `false`.
    pub leading: Option<bool>,
    /// Trailing-edge invocation. Defaults to `true`.
    pub trailing: Option<bool>,
    /// Max-wait ceiling in milliseconds.
    pub max_wait_ms: Option<i64>,
}

impl DebounceOptions {
    /// Options with only the quiet period set.
    pub fn with_wait_ms(wait_ms: i64) -> Self {
        Self {
            wait_ms,
            ..Self::default()
        }
    }
}

fn non_negative_ms(name: &str, value: i64) -> Result<Duration, QuiescentError> {
    u64::try_from(value)
        .map(Duration::from_millis)
        .map_err(|_| QuiescentError::InvalidPolicy(format!("{name} must not be negative")))
}

impl TryFrom<DebounceOptions> for DebouncePolicy {
    type Error = QuiescentError;

    fn try_from(options: DebounceOptions) -> Result<Self, Self::Error> {
        let mut policy = DebouncePolicy::new(non_negative_ms("wait", options.wait_ms)?);

        if let Some(leading) = options.leading {
            policy = policy.leading(leading);
        }

        if let Some(trailing) = options.trailing {
            policy = policy.trailing(trailing);
        }

        if let Some(max_wait_ms) = options.max_wait_ms {
            policy = policy.max_wait(non_negative_ms("max_wait", max_wait_ms)?);
        }

        policy.validate()?;

        Ok(policy)
    }
}
