//! Per-query diagnostic dump of sieve state.

use tracing::debug;

use crate::bitset::BitSet;

/// Internal state captured at the end of a query.
#[derive(Debug, Clone, Copy)]
pub struct SieveSnapshot<'a> {
    /// Candidate bits over `[0, frontier]`.
    pub flags: &'a BitSet,
    pub rank: u64,
    pub frontier: u64,
    pub upper_bound: u64,
    /// Every prime below the frontier, ascending.
    pub primes: &'a [u64],
}

impl SieveSnapshot<'_> {
    /// Number of set bits in the flag array, 0 and 1 included.
    pub fn candidate_count(&self) -> usize {
        self.flags.count_ones(0, self.flags.len())
    }
}

/// Receiver for [`SieveSnapshot`]s. Must not influence query results.
pub trait DiagnosticSink {
    fn record(&self, snapshot: &SieveSnapshot<'_>);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&SieveSnapshot<'_>),
{
    fn record(&self, snapshot: &SieveSnapshot<'_>) {
        self(snapshot)
    }
}

/// Default sink: one `tracing` debug event per query with summary fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, s: &SieveSnapshot<'_>) {
        debug!(
            rank = s.rank,
            frontier = s.frontier,
            upper_bound = s.upper_bound,
            flag_bits = s.flags.len(),
            candidates = s.candidate_count(),
            primes = s.primes.len(),
            last_prime = ?s.primes.last(),
            "sieve snapshot"
        );
    }
}
