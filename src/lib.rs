//! Incremental nth-prime engine
//!
//! A bit-packed Sieve of Eratosthenes that keeps its marks between queries.
//! Each call sizes the sieve with a Rosser's-theorem upper bound and only
//! sieves the stretch past what earlier calls already covered.
//!
//! ```
//! let mut sieve = nth_sieve::new_sieve();
//! assert_eq!(sieve.nth_prime(0).unwrap(), 2);
//! assert_eq!(sieve.nth_prime(99).unwrap(), 541);
//! assert_eq!(sieve.nth_prime(19).unwrap(), 71); // served from the existing sieve
//! ```

pub mod bitset;
pub mod bound;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod sieve;

pub use bitset::BitSet;
pub use bound::upper_bound;
pub use config::SieveConfig;
pub use diagnostics::{DiagnosticSink, SieveSnapshot, TracingSink};
pub use error::{Result, SieveError};
pub use sieve::{IncrementalSieve, MarkPass, NthPrime, SieveStats};

/// Fresh engine with no precomputed state and diagnostics off.
pub fn new_sieve() -> IncrementalSieve {
    IncrementalSieve::new()
}
