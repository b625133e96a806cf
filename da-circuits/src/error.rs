//! Error types for the da-circuits crate.

use thiserror::Error;

/// Result type alias using DaError
pub type Result<T> = std::result::Result<T, DaError>;

/// Errors that can occur while committing, opening or folding.
#[derive(Error, Debug)]
pub enum DaError {
    /// Polynomial has more coefficients than the SRS has G1 powers
    #[error("Polynomial with {coefficients} coefficients exceeds SRS capacity of {capacity}")]
    DegreeTooLarge { coefficients: usize, capacity: usize },

    /// SRS without any G1 powers
    #[error("SRS must contain at least one G1 power")]
    EmptySrs,

    /// Bytes do not decode to a valid curve point
    #[error("Invalid curve point: {0}")]
    InvalidPoint(String),

    /// Bytes do not decode to a canonical scalar
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),

    /// Parallel arrays of commitments and proofs differ in length
    #[error("Length mismatch: {commitments} commitments, {proofs} proofs")]
    LengthMismatch { commitments: usize, proofs: usize },

    /// Bisection index outside the partition
    #[error("Partition index {index} out of range for {slices} slices")]
    InvalidPartitionIndex { index: usize, slices: usize },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error while reading or writing an SRS file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ark_serialize::SerializationError> for DaError {
    fn from(err: ark_serialize::SerializationError) -> Self {
        DaError::Serialization(err.to_string())
    }
}

impl From<hex::FromHexError> for DaError {
    fn from(err: hex::FromHexError) -> Self {
        DaError::Serialization(format!("hex decode: {}", err))
    }
}
