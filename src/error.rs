//! Error types for cache entries
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Entry Error Enum ==
/// Unified error type for building, encoding and decoding cache entries.
#[derive(Error, Debug)]
pub enum EntryError {
    /// The raw TTL could not be turned into an expiration
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// The decoded entry is well-formed JSON but not a valid entry
    #[error("Invalid entry format: {0}")]
    InvalidEntryFormat(String),

    /// The input text is not well-formed JSON
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The value could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cache entry operations.
pub type Result<T> = std::result::Result<T, EntryError>;
