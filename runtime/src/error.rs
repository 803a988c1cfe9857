use std::time::Duration;
use thiserror::Error;

/// Failures of the store itself, as opposed to failures inside effects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// [`Store::shutdown`](crate::Store::shutdown) was called; no further
    /// actions are reduced.
    #[error("store is shut down")]
    ShutdownInProgress,

    /// Effects were still running when the shutdown deadline passed.
    #[error("{0} effects still running after shutdown deadline")]
    ShutdownTimeout(usize),

    /// No matching action (or effect completion) within the given time.
    #[error("no result within {0:?}")]
    Timeout(Duration),

    /// Every broadcast sender is gone.
    #[error("action broadcast closed")]
    ChannelClosed,
}
