//! # Error Types
//!
//! Errors raised while constructing core identifiers. Higher layers wrap
//! these into their own error enums via `#[from]`.

use thiserror::Error;

/// Error constructing a core identifier or value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A revision string is not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid revision {value:?}: expected YYYY-MM-DD")]
    InvalidRevision {
        /// The rejected input.
        value: String,
    },

    /// A local name does not follow the YANG identifier grammar.
    #[error("invalid YANG identifier {value:?}")]
    InvalidIdentifier {
        /// The rejected input.
        value: String,
    },

    /// A namespace URI is empty.
    #[error("namespace must not be empty")]
    EmptyNamespace,
}
