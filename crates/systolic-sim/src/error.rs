// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for systolic array simulation

use thiserror::Error;

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur while building or running a simulation
///
/// Every variant is fatal to the current run; the engine never returns
/// partial results.
#[derive(Debug, Error)]
pub enum SimError {
    /// Factor-matrix / array dimension contract violated at construction
    #[error("Dimension mismatch: {reason}")]
    DimensionMismatch {
        /// Which contract was violated
        reason: String,
    },

    /// A PE fold saw an operand pair that does not extend the running sum
    #[error("Inconsistent accumulation: {reason}")]
    InconsistentAccumulation {
        /// Description of the mismatch
        reason: String,
    },

    /// A PE saw operands that are neither both elements nor effectively zero
    #[error("Invalid operand pair: x = {x}, w = {w}")]
    InvalidOperandPair {
        /// Rendered X operand
        x: String,
        /// Rendered W operand
        w: String,
    },

    /// A delay triangle received a vector of the wrong length
    #[error("Length mismatch: got {got} values, expected {expected}")]
    LengthMismatch {
        /// Required vector length
        expected: usize,
        /// Supplied vector length
        got: usize,
    },

    /// A memory access fell outside the memory's extent
    #[error("Out of bounds: row {row}, columns {col_offset}..{col_end} on {rows}x{cols} memory")]
    OutOfBounds {
        /// Requested row
        row: usize,
        /// First requested column
        col_offset: usize,
        /// One past the last requested column
        col_end: usize,
        /// Memory rows
        rows: usize,
        /// Memory columns
        cols: usize,
    },

    /// I/O error while reading a config or writing a trace
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed
    #[error("Serialization error: {source}")]
    Serialization {
        /// Underlying serde_json error
        #[from]
        source: serde_json::Error,
    },
}

impl SimError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(reason: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            reason: reason.into(),
        }
    }

    /// Create an inconsistent accumulation error
    pub fn inconsistent_accumulation(reason: impl Into<String>) -> Self {
        Self::InconsistentAccumulation {
            reason: reason.into(),
        }
    }

    /// Create an invalid operand pair error from the offending operands
    pub fn invalid_operand_pair(x: impl ToString, w: impl ToString) -> Self {
        Self::InvalidOperandPair {
            x: x.to_string(),
            w: w.to_string(),
        }
    }

    /// Create a length mismatch error
    pub const fn length_mismatch(expected: usize, got: usize) -> Self {
        Self::LengthMismatch { expected, got }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = SimError::length_mismatch(3, 2);
        assert_eq!(e.to_string(), "Length mismatch: got 2 values, expected 3");

        let e = SimError::dimension_mismatch("array must be square");
        assert!(e.to_string().contains("array must be square"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: SimError = io.into();
        assert!(matches!(e, SimError::Io { .. }));
    }
}
