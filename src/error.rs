//! Error types shared by every container engine.
//!
//! All failures are recoverable outcomes: an operation that fails leaves the
//! container exactly as it was before the call.

use std::fmt;

use thiserror::Error;

/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an `update(old, new)` request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRejection {
    /// The replacement value is already stored in the container.
    TargetExists,
    /// The replacement value falls outside the strict bounds imposed by the
    /// ancestors of the node being updated.
    OutOfOrder,
}

impl fmt::Display for UpdateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateRejection::TargetExists => f.write_str("new value already exists"),
            UpdateRejection::OutOfOrder => {
                f.write_str("new value would violate ordering relative to its ancestors")
            }
        }
    }
}

/// Primary error type for container operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The value, or hash table key, is already stored.
    #[error("duplicate value: already present")]
    DuplicateKey,

    /// The value, or hash table key, is not stored.
    #[error("value not found")]
    NotFound,

    /// An update was refused before anything changed.
    #[error("invalid update target: {reason}")]
    InvalidUpdateTarget {
        /// Which update rule was violated.
        reason: UpdateRejection,
    },

    /// Every slot on the probe sequence of an open-addressed table is taken.
    #[error("table is full (capacity {capacity})")]
    CapacityExhausted {
        /// Number of slots in the table.
        capacity: usize,
    },

    /// A list index past the end of the list.
    #[error("position {position} is out of range for length {len}")]
    InvalidPosition {
        /// Requested index.
        position: usize,
        /// Length of the list at the time of the request.
        len: usize,
    },

    /// A request other than `balance` or `traverse` arrived without a value.
    #[error("request requires a value")]
    MissingValue,

    /// An `update` request arrived without a replacement value.
    #[error("update requires a new value")]
    MissingNewValue,

    /// The container does not implement the requested operation.
    #[error("{operation} is not supported by {container}")]
    Unsupported {
        /// Wire name of the operation.
        operation: &'static str,
        /// Wire name of the container.
        container: &'static str,
    },

    /// Construction parameters were rejected.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with them.
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            reason: reason.into(),
        }
    }
}
