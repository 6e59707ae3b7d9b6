/// Error type for this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuiescentError {
    /// The debounce policy is not usable (negative durations, `max_wait < wait`).
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// A record with the same identifier is already stored.
    #[error("record with id \"{0}\" already exists")]
    DuplicateKey(String),

    /// The record store is full.
    #[error("storage limit of {0} records exceeded")]
    CapacityExceeded(usize),
}
