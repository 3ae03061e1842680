//! Upper-bound estimation for the prime at a given rank.
//!
//! Uses Rosser's theorem, `p_n < n (ln n + ln ln n)`, padded by 5% plus a
//! constant. The 0-indexed rank goes straight into the formula; the padding
//! must keep every prime of that rank strictly below the bound. Do not change
//! the slack constants without re-running the known-prime checks below.

use crate::error::{Result, SieveError};

/// Bound used for ranks 0 and 1, covering 2 and 3.
pub const SMALL_RANK_BOUND: u64 = 6;

const SLACK_FACTOR: f64 = 1.05;
const SLACK_TERM: f64 = 10.0;

/// Integer square root, safe for all u64 values.
#[inline]
pub fn isqrt(n: u64) -> u64 {
    if n == 0 { return 0; }
    let mut x = (n as f64).sqrt() as u64;
    while x > 0 && x.checked_mul(x).map_or(true, |sq| sq > n) { x -= 1; }
    while (x + 1).checked_mul(x + 1).map_or(false, |sq| sq <= n) { x += 1; }
    x
}

/// Smallest `r` with `r * r >= n`.
#[inline]
pub fn ceil_sqrt(n: u64) -> u64 {
    let r = isqrt(n);
    if r * r == n { r } else { r + 1 }
}

/// Upper bound `U` such that every prime of rank `<= rank` lies below `U`.
///
/// Fails with `BoundOverflow` when `U` would not fit a signed 64-bit value.
pub fn upper_bound(rank: u64) -> Result<u64> {
    if rank <= 1 { return Ok(SMALL_RANK_BOUND); }

    let n = rank as f64;
    let rosser = (n * (n.ln() + n.ln().ln())).ceil();
    let bound = rosser * SLACK_FACTOR + SLACK_TERM;

    if !bound.is_finite() || bound >= i64::MAX as f64 {
        return Err(SieveError::BoundOverflow { rank });
    }
    Ok(bound as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_ranks_use_fixed_bound() {
        assert_eq!(upper_bound(0).unwrap(), 6);
        assert_eq!(upper_bound(1).unwrap(), 6);
    }

    #[test]
    fn test_known_bounds() {
        assert_eq!(upper_bound(2).unwrap(), 11);
        assert_eq!(upper_bound(19).unwrap(), 90);
        assert_eq!(upper_bound(99).unwrap(), 646);
        assert_eq!(upper_bound(500).unwrap(), 4_232);
        assert_eq!(upper_bound(2_000).unwrap(), 20_231);
        assert_eq!(upper_bound(1_000_000).unwrap(), 17_263_378);
    }

    #[test]
    fn test_bound_exceeds_target_prime() {
        // (rank, prime at rank)
        let known = [
            (2, 5), (3, 7), (4, 11), (5, 13), (6, 17), (9, 29), (19, 71),
            (99, 541), (500, 3_581), (986, 7_793), (2_000, 17_393),
            (9_999, 104_729), (1_000_000, 15_485_867),
            (10_000_000, 179_424_691), (100_000_000, 2_038_074_751),
        ];
        for (rank, p) in known {
            assert!(upper_bound(rank).unwrap() > p, "bound too small at rank {}", rank);
        }
    }

    #[test]
    fn test_bound_is_monotonic() {
        let mut prev = 0;
        for rank in 0..5_000 {
            let u = upper_bound(rank).unwrap();
            assert!(u >= prev, "bound shrank at rank {}", rank);
            prev = u;
        }
    }

    #[test]
    fn test_overflowing_rank_is_rejected() {
        assert!(matches!(
            upper_bound(u64::MAX),
            Err(SieveError::BoundOverflow { .. })
        ));
        assert!(upper_bound(i64::MAX as u64 / 8).is_err());
    }

    #[test]
    fn test_isqrt_safety() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
        assert_eq!(isqrt(1 << 52), 1 << 26);
    }

    #[test]
    fn test_ceil_sqrt() {
        assert_eq!(ceil_sqrt(0), 0);
        assert_eq!(ceil_sqrt(25), 5);
        assert_eq!(ceil_sqrt(26), 6);
        assert_eq!(ceil_sqrt(6), 3);
    }
}
