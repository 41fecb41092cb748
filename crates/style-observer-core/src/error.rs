//! Error types for observer construction.

use thiserror::Error;

/// Result type for observer construction.
pub type Result<T> = std::result::Result<T, ObserverError>;

/// Errors that can occur while building a [`StyleObserver`](crate::StyleObserver).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObserverError {
    /// The options did not name any property to track.
    #[error("at least one property must be tracked")]
    NoProperties,
}
