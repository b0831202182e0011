//! Error types for the succinct map and point index.

use thiserror::Error;

/// Error variants for encoding and building.
///
/// Precondition violations (reading through a cursor that is `done()`,
/// feeding an unsorted sequence to an encoder) are programmer errors and
/// panic instead of surfacing here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An index was provided that is out of the structure's bounds.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// A selection query was performed for a rank that does not exist.
    #[error("invalid selection: rank {0} not found")]
    InvalidSelection(usize),

    /// The declared universe does not cover the largest key.
    #[error("invalid universe: {universe} does not exceed max key {max_key}")]
    InvalidUniverse {
        /// Declared exclusive upper bound.
        universe: u64,
        /// Largest key in the input.
        max_key: u64,
    },

    /// `max_key + 1` is not representable as a universe bound.
    #[error("universe overflow: max key {max_key} leaves no exclusive bound")]
    UniverseOverflow {
        /// Largest key in the input.
        max_key: u64,
    },
}

/// A specialized Result type for succinct operations.
pub type Result<T> = std::result::Result<T, Error>;
