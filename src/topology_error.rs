//! TopologyError: unified error type for stream-topo public APIs
//!
//! Only fatal conditions are represented here (schema, parameters, storage).
//! Per-reach data problems never surface as errors; the detectors log them
//! and skip the offending reach.

use thiserror::Error;

use crate::topology::reach::ReachId;

/// Unified error type for stream-topo operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Attempted to construct a ReachId with a zero value (0 means "no reach").
    #[error("ReachId must be non-zero (0 is reserved for \"no upstream reach\")")]
    InvalidReachId,
    /// Two reaches share the same identifier.
    #[error("duplicate reach id `{0}` in network")]
    DuplicateReachId(ReachId),
    /// The configured outlet reach does not exist in the network.
    #[error("outflow reach `{0}` not found in network")]
    UnknownOutflow(ReachId),
    /// A run parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A required field or column is absent from the input schema.
    #[error("required field `{0}` missing from input schema")]
    MissingField(String),
    /// The input does not match the expected dataset schema.
    #[error("schema error: {0}")]
    Schema(String),
    /// A value could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// Underlying storage failure.
    #[error("I/O error: {0}")]
    Io(String),
    /// A structural invariant of the network or code table does not hold.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<std::io::Error> for TopologyError {
    fn from(err: std::io::Error) -> Self {
        TopologyError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => TopologyError::Io(err.to_string()),
            _ => TopologyError::Schema(err.to_string()),
        }
    }
}
