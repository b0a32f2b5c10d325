//! Error types for rosterdb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using RosterError
pub type Result<T> = std::result::Result<T, RosterError>;

/// Unified error type for rosterdb operations
#[derive(Debug, Error)]
pub enum RosterError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// File length is not a slot multiple, a slot carries an unknown
    /// tombstone byte, or a field does not decode.
    #[error("Corrupt store: {0}")]
    CorruptStore(String),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Missing required input: {0}")]
    NullRecord(String),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Field '{field}' is {len} bytes, slot capacity is {capacity}")]
    FieldOverflow {
        field: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Mutation Errors
    // -------------------------------------------------------------------------
    #[error("A live record with id {0} already exists")]
    DuplicateId(i32),

    #[error("Record identifiers cannot be changed by update")]
    ImmutableId,

    #[error("Record {0} is already deleted")]
    AlreadyDeleted(i32),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for RosterError {
    fn from(e: bincode::Error) -> Self {
        RosterError::Serialization(e.to_string())
    }
}
