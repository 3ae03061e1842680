//! Error types for nth-prime queries

use thiserror::Error;

/// Result type alias for sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Errors surfaced by [`crate::IncrementalSieve`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SieveError {
    /// Ranks are 0-indexed and must be non-negative
    #[error("rank must be non-negative, got {0}")]
    NegativeRank(i64),

    /// The estimated bound for this rank does not fit a signed 64-bit index
    #[error("upper bound for rank {rank} exceeds the representable range")]
    BoundOverflow {
        /// Requested rank
        rank: u64,
    },

    /// The sieve was sized too small to contain the requested rank
    #[error("rank {rank} not found below bound {upper_bound}: only {found} primes sieved")]
    Underprovisioned {
        /// Requested rank
        rank: u64,
        /// Bound the sieve was grown to
        upper_bound: u64,
        /// Primes found below the bound
        found: usize,
    },

    /// The bit-array could not grow to the requested size
    #[error("failed to allocate sieve of {bits} bits")]
    AllocationFailed {
        /// Requested size in bits
        bits: usize,
    },
}
