//! Incremental Sieve of Eratosthenes answering nth-prime queries.
//!
//! State is a value-indexed candidate bit-array plus a frontier: every index
//! in `[2, frontier]` is set iff it is prime. A query only sieves the delta
//! between the old frontier and the new upper bound, so walking ranks upward
//! costs roughly one sieve of the largest bound seen.
//!
//! Optimisations:
//! - Only 2 and odd indices are ever candidates; even bits stay clear
//! - Base primes strike odd multiples only (step `2p`)
//! - Each base resumes past the old frontier, never below `p²`
//! - Rank selection skips whole words by popcount

use std::fmt;

use tracing::{debug, error, trace};

use crate::bitset::BitSet;
use crate::bound::{ceil_sqrt, upper_bound};
use crate::config::SieveConfig;
use crate::diagnostics::{DiagnosticSink, SieveSnapshot, TracingSink};
use crate::error::{Result, SieveError};

/// Anything that can answer "which prime sits at this rank".
pub trait NthPrime {
    /// Prime at 0-indexed `rank`: 0 → 2, 1 → 3, 2 → 5, ...
    fn nth_prime(&mut self, rank: i64) -> Result<u64>;
}

/// Summary of one marking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkPass {
    pub old_frontier: u64,
    pub new_frontier: u64,
    /// Clear operations performed, repeats included.
    pub marked: u64,
    /// Smallest index cleared during the pass.
    pub lowest_marked: Option<u64>,
}

/// Counters accumulated over the lifetime of an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SieveStats {
    pub queries: u64,
    pub cold_starts: u64,
    pub extensions: u64,
    pub reuses: u64,
    pub bits_marked: u64,
    /// `None` when the latest query reused the existing sieve.
    pub last_pass: Option<MarkPass>,
}

/// The incremental nth-prime engine.
///
/// Not internally synchronised: `nth_prime` takes `&mut self`, so share an
/// instance across threads behind a `Mutex`. Memory grows with the largest
/// rank queried and is only released by dropping the engine.
pub struct IncrementalSieve {
    flags: BitSet,
    frontier: u64,
    stats: SieveStats,
    sink: Option<Box<dyn DiagnosticSink + Send>>,
}

impl IncrementalSieve {
    /// Empty engine with diagnostics off.
    pub fn new() -> Self {
        Self {
            flags: BitSet::new(),
            frontier: 0,
            stats: SieveStats::default(),
            sink: None,
        }
    }

    /// Empty engine; `config.debug` installs [`TracingSink`].
    pub fn with_config(config: SieveConfig) -> Self {
        let mut sieve = Self::new();
        if config.debug {
            sieve.sink = Some(Box::new(TracingSink));
        }
        sieve
    }

    /// Install a custom diagnostic sink, enabling per-query snapshots.
    pub fn with_sink<S>(mut self, sink: S) -> Self
    where
        S: DiagnosticSink + Send + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Highest index fully sieved so far; 0 before the first query.
    #[inline]
    pub fn frontier(&self) -> u64 {
        self.frontier
    }

    #[inline]
    pub fn stats(&self) -> SieveStats {
        self.stats
    }

    /// Bytes held by the candidate bit-array.
    pub fn flag_bytes(&self) -> usize {
        self.flags.words().len() * std::mem::size_of::<u64>()
    }

    /// True iff `value` is set in the candidate array and lies in `[2, frontier]`.
    pub fn is_candidate(&self, value: u64) -> bool {
        value >= 2 && value <= self.frontier && self.flags.test(value as usize)
    }

    /// Primes below the frontier, ascending.
    pub fn primes(&self) -> impl Iterator<Item = u64> + '_ {
        self.flags
            .iter_ones(2, self.frontier as usize)
            .map(|i| i as u64)
    }

    /// Number of primes below the frontier.
    pub fn prime_count(&self) -> usize {
        self.flags.count_ones(2, self.frontier as usize)
    }

    /// Prime at 0-indexed `rank`, growing the sieve if needed.
    ///
    /// Negative ranks fail with `NegativeRank`. A bound too small to hold the
    /// rank fails with `Underprovisioned` rather than returning a wrong prime.
    pub fn nth_prime(&mut self, rank: i64) -> Result<u64> {
        if rank < 0 { return Err(SieveError::NegativeRank(rank)); }
        let rank = rank as u64;
        let upper = upper_bound(rank)?;
        self.stats.queries += 1;
        self.ensure_sieved(rank, upper)?;

        let found = self.locate(rank, upper);
        if let Some(sink) = &self.sink {
            let primes: Vec<u64> = self.primes().collect();
            sink.record(&SieveSnapshot {
                flags: &self.flags,
                rank,
                frontier: self.frontier,
                upper_bound: upper,
                primes: &primes,
            });
        }
        found
    }

    // ─── Marking / extension ───────────────────────────────────────────────

    fn ensure_sieved(&mut self, rank: u64, upper: u64) -> Result<()> {
        let old = self.frontier;
        if upper <= old {
            self.stats.reuses += 1;
            self.stats.last_pass = None;
            trace!(rank, upper, frontier = old, "reusing sieve");
            return Ok(());
        }

        let bits = usize::try_from(upper + 1).map_err(|_| SieveError::BoundOverflow { rank })?;
        self.flags.resize(bits)?;

        if old == 0 {
            self.flags.set(2);
            self.flags.set_range(3, bits, 2);
            self.stats.cold_starts += 1;
            debug!(rank, upper, "cold sieve");
        } else {
            let first_odd = ((old + 1) | 1) as usize;
            self.flags.set_range(first_odd, bits, 2);
            self.stats.extensions += 1;
            debug!(rank, upper, frontier = old, "extending sieve");
        }

        let pass = self.mark(old, upper);
        trace!(
            marked = pass.marked,
            lowest = ?pass.lowest_marked,
            "marking pass done"
        );
        self.stats.bits_marked += pass.marked;
        self.stats.last_pass = Some(pass);
        self.frontier = upper;
        Ok(())
    }

    /// Strike odd composites in `(old, upper]` with every odd base prime up
    /// to `ceil(sqrt(upper))`. Bits at or below `old` are final and untouched.
    fn mark(&mut self, old: u64, upper: u64) -> MarkPass {
        let base_limit = ceil_sqrt(upper);
        let mut marked = 0u64;
        let mut lowest: Option<u64> = None;

        let mut p = 3u64;
        while p <= base_limit {
            if self.flags.test(p as usize) {
                let mut start = p * p;
                if old > 0 {
                    start = start.max((old / p + 1) * p);
                }
                if start % 2 == 0 { start += p; }

                if start <= upper {
                    lowest = Some(lowest.map_or(start, |l| l.min(start)));
                }
                let step = 2 * p;
                let mut j = start;
                while j <= upper {
                    self.flags.clear(j as usize);
                    marked += 1;
                    j += step;
                }
            }
            p += 2;
        }

        MarkPass {
            old_frontier: old,
            new_frontier: upper,
            marked,
            lowest_marked: lowest,
        }
    }

    // ─── Extraction ────────────────────────────────────────────────────────

    /// Select `rank` among set bits in `[2, frontier)`.
    fn locate(&self, rank: u64, upper: u64) -> Result<u64> {
        let end = self.frontier as usize;
        usize::try_from(rank)
            .ok()
            .and_then(|k| self.flags.select(2, end, k))
            .map(|i| i as u64)
            .ok_or_else(|| {
                let found = self.prime_count();
                error!(rank, upper, found, "upper bound too small for rank");
                SieveError::Underprovisioned { rank, upper_bound: upper, found }
            })
    }
}

impl Default for IncrementalSieve {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IncrementalSieve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalSieve")
            .field("frontier", &self.frontier)
            .field("flag_bits", &self.flags.len())
            .field("stats", &self.stats)
            .field("diagnostics", &self.sink.is_some())
            .finish()
    }
}

impl NthPrime for IncrementalSieve {
    fn nth_prime(&mut self, rank: i64) -> Result<u64> {
        IncrementalSieve::nth_prime(self, rank)
    }
}
