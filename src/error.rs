//! Error types for the stash caches
//!
//! Provides unified error handling using thiserror. A missing key is never an
//! error: lookups report absence through `Option`/`bool`.

use thiserror::Error;

// == Stash Error Enum ==
/// Unified error type raised across the host boundary.
///
/// Every variant carries the human-readable message shown to script authors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StashError {
    /// Constructor called with a non-positive capacity or TTL
    #[error("{0}")]
    Validation(String),

    /// Argument of the wrong host type, or the wrong number of arguments
    #[error("{0}")]
    Type(String),

    /// Object used before its storage was initialized
    #[error("{0}")]
    InvalidState(String),

    /// Import of a class the registry does not define
    #[error("{0}")]
    UnknownClass(String),

    /// Method or property that the class does not define
    #[error("{0}")]
    UnknownMember(String),

    /// Operation on the abstract STASH class
    #[error("{0}")]
    NotImplemented(String),
}

// == Result Type Alias ==
/// Convenience Result type for the stash caches.
pub type Result<T> = std::result::Result<T, StashError>;
