use thiserror::Error;

/// Errors from using a store capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store behind a [`Context`](super::Context) has been dropped.
    #[error("store has been dropped")]
    Dropped,
}
