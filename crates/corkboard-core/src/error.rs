use thiserror::Error;

/// Errors surfaced by the message store.
///
/// Subscription errors are rendered inline in place of the list; write
/// errors come back over the worker's status channel. Neither is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The live query failed to establish or was interrupted.
    #[error("subscription failed: {0}")]
    Subscription(String),
    /// An append call was rejected.
    #[error("write rejected: {0}")]
    Write(String),
}
