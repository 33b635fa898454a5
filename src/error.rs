// In: src/error.rs

//! This module defines the single, unified error type for the statdump library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant except the external wrappers is fatal for the single dump being
//! processed. Unknown identifiers and missing variables are never errors.

use thiserror::Error;

use crate::types::StatKind;

#[derive(Error, Debug)]
pub enum StatsError {
    // =========================================================================
    // === Construction-time Errors
    // =========================================================================
    /// A variable configuration is unusable (missing parameter, unknown type,
    /// duplicate id, zero repeat, empty variable set).
    #[error("Configuration error for '{id}': {reason}")]
    ConfigurationError { id: String, reason: String },

    // =========================================================================
    // === Per-Dump Data Errors
    // =========================================================================
    /// The tag observed in a dump disagrees with the declared variable type.
    #[error("Variable type mismatch - Expected: {expected} Found: {found} ID: {id}")]
    ProtocolMismatchError {
        id: String,
        expected: StatKind,
        found: String,
    },

    /// More samples were accumulated for a key than `repeat` allows.
    #[error(
        "{id}: entry '{key}' has more values than expected. Length: {len}, Repeat: {repeat}"
    )]
    AggregationOverflowError {
        id: String,
        key: String,
        len: usize,
        repeat: u32,
    },

    /// A numeric accumulator received a value that does not parse as a number.
    #[error("{id}: value non-convertible to number. Key: {key}, Value: '{value}'")]
    ValueCoercionError {
        id: String,
        key: String,
        value: String,
    },

    /// A Distribution with configured bounds received an integer bucket outside them.
    #[error("{id}: bucket {bucket} out of range [{minimum}, {maximum}]")]
    BucketOutOfRangeError {
        id: String,
        bucket: i64,
        minimum: i64,
        maximum: i64,
    },

    // =========================================================================
    // === Programming Errors (lifecycle misuse)
    // =========================================================================
    #[error("{id}: cannot {operation} while {phase}")]
    IllegalStateError {
        id: String,
        operation: &'static str,
        phase: &'static str,
    },

    #[error("{id}: no reduced value for entry '{key}'")]
    UnknownEntryError { id: String, key: String },

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while decoding a configuration.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl StatsError {
    pub(crate) fn config(id: impl Into<String>, reason: impl Into<String>) -> Self {
        StatsError::ConfigurationError {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
