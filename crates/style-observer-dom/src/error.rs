//! Error types for document operations.

use thiserror::Error;

use super::document::ElementId;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DomError>;

/// Errors that can occur when manipulating a [`Document`](crate::Document).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The id does not belong to this document.
    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    /// Appending would make an element its own ancestor.
    #[error("cannot append {child} under {parent}: would create a cycle")]
    CyclicAppend {
        /// The intended parent.
        parent: ElementId,
        /// The element being appended.
        child: ElementId,
    },
}
