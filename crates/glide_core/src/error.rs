//! Error types for glide_core

use crate::document::ElementId;
use thiserror::Error;

/// Errors raised by document and viewport queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// The handle refers to an element that was removed
    #[error("unknown element {0:?}")]
    UnknownElement(ElementId),

    /// No element carries the requested class
    #[error("no element matches class `{0}`")]
    NoMatch(String),
}

/// Result type for glide_core operations
pub type Result<T> = std::result::Result<T, CoreError>;
