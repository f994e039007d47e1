//! Error types for tessera.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`TopologyError`].
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors that can occur while building, querying or mutating a topology.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// An index lies outside the valid range of the collection it addresses.
    #[error("{what} index {index} is out of range (length {len})")]
    OutOfRange {
        /// What kind of element was addressed.
        what: &'static str,
        /// The offending index.
        index: usize,
        /// The number of valid elements.
        len: usize,
    },

    /// Malformed input, such as a face with fewer than three vertices.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A fixed-capacity container was asked to hold more than it was sized for.
    #[error("{what} capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// The exhausted resource.
        what: &'static str,
        /// The capacity chosen at construction.
        capacity: usize,
    },

    /// An operation was requested whose preconditions do not hold.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The half-edges cannot be paired into a consistent manifold.
    #[error("malformed topology: {details}")]
    MalformedTopology {
        /// Description of the inconsistency.
        details: String,
    },

    /// Invalid state for the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl TopologyError {
    /// Create an out-of-range error.
    pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        TopologyError::OutOfRange { what, index, len }
    }

    /// Create a malformed topology error.
    pub fn malformed(details: impl Into<String>) -> Self {
        TopologyError::MalformedTopology {
            details: details.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        TopologyError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TopologyError::out_of_range("face", 7, 3);
        assert_eq!(err.to_string(), "face index 7 is out of range (length 3)");

        let err = TopologyError::invalid_param("frequency", 1.5, "must be within [0, 1]");
        assert_eq!(
            err.to_string(),
            "invalid parameter: frequency = 1.5 (must be within [0, 1])"
        );
    }
}
