//! Growable bit-array backed by `u64` words.
//!
//! Bit `i` lives in word `i >> 6` at position `i & 63`. Bits past `len` are
//! always zero, so word-level popcounts never see stale data.

use crate::error::{Result, SieveError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

#[inline]
fn words_for(bits: usize) -> usize {
    bits.div_ceil(64)
}

impl BitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw backing words. The tail beyond `len()` is zero.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Grow or shrink to `bits`. New bits are clear.
    ///
    /// Growth reserves fallibly so an oversized bound surfaces as
    /// `SieveError::AllocationFailed` instead of aborting the process.
    pub fn resize(&mut self, bits: usize) -> Result<()> {
        let need = words_for(bits);
        if need > self.words.len() {
            self.words
                .try_reserve_exact(need - self.words.len())
                .map_err(|_| SieveError::AllocationFailed { bits })?;
        }
        self.words.resize(need, 0);
        self.len = bits;
        self.mask_tail();
        Ok(())
    }

    #[inline]
    pub fn test(&self, i: usize) -> bool {
        i < self.len && (self.words[i >> 6] >> (i & 63)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize) {
        debug_assert!(i < self.len, "bit {} out of range {}", i, self.len);
        self.words[i >> 6] |= 1u64 << (i & 63);
    }

    #[inline]
    pub fn clear(&mut self, i: usize) {
        debug_assert!(i < self.len, "bit {} out of range {}", i, self.len);
        self.words[i >> 6] &= !(1u64 << (i & 63));
    }

    /// Set every bit in `[start, end)` whose index is congruent to `start`
    /// modulo `step`. `step == 1` fills whole words at a time.
    pub fn set_range(&mut self, start: usize, end: usize, step: usize) {
        let end = end.min(self.len);
        if start >= end || step == 0 { return; }

        if step == 1 {
            let (first, last) = (start >> 6, (end - 1) >> 6);
            let lo_mask = !0u64 << (start & 63);
            let hi_mask = !0u64 >> (63 - ((end - 1) & 63));
            if first == last {
                self.words[first] |= lo_mask & hi_mask;
            } else {
                self.words[first] |= lo_mask;
                for w in &mut self.words[first + 1..last] { *w = !0u64; }
                self.words[last] |= hi_mask;
            }
            return;
        }

        let mut i = start;
        while i < end {
            self.words[i >> 6] |= 1u64 << (i & 63);
            i += step;
        }
    }

    /// Number of set bits in `[start, end)`.
    pub fn count_ones(&self, start: usize, end: usize) -> usize {
        let end = end.min(self.len);
        if start >= end { return 0; }
        let (first, last) = (start >> 6, (end - 1) >> 6);
        let lo_mask = !0u64 << (start & 63);
        let hi_mask = !0u64 >> (63 - ((end - 1) & 63));
        if first == last {
            return (self.words[first] & lo_mask & hi_mask).count_ones() as usize;
        }
        let mut total = (self.words[first] & lo_mask).count_ones() as usize;
        total += self.words[first + 1..last]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum::<usize>();
        total + (self.words[last] & hi_mask).count_ones() as usize
    }

    /// Index of the `k`-th (0-based) set bit in `[start, end)`, if any.
    ///
    /// Skips whole words by popcount, then walks the final word with
    /// Kernighan's lowest-bit clearing.
    pub fn select(&self, start: usize, end: usize, mut k: usize) -> Option<usize> {
        let end = end.min(self.len);
        if start >= end { return None; }
        let (first, last) = (start >> 6, (end - 1) >> 6);

        for wi in first..=last {
            let mut w = self.words[wi];
            if wi == first { w &= !0u64 << (start & 63); }
            if wi == last { w &= !0u64 >> (63 - ((end - 1) & 63)); }

            let ones = w.count_ones() as usize;
            if k >= ones {
                k -= ones;
                continue;
            }
            for _ in 0..k { w &= w - 1; }
            return Some((wi << 6) + w.trailing_zeros() as usize);
        }
        None
    }

    /// Iterate set bits in `[start, end)` in increasing order.
    pub fn iter_ones(&self, start: usize, end: usize) -> Ones<'_> {
        let end = end.min(self.len);
        let (wi, cur) = if start < end {
            (start >> 6, self.words[start >> 6] & (!0u64 << (start & 63)))
        } else {
            (0, 0)
        };
        Ones { set: self, wi, cur, end: if start < end { end } else { 0 } }
    }

    fn mask_tail(&mut self) {
        let tail = self.len & 63;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

/// Iterator over set bit indices, produced by [`BitSet::iter_ones`].
pub struct Ones<'a> {
    set: &'a BitSet,
    wi: usize,
    cur: u64,
    end: usize,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.cur != 0 {
                let tz = self.cur.trailing_zeros() as usize;
                let idx = (self.wi << 6) + tz;
                if idx >= self.end {
                    self.cur = 0;
                    return None;
                }
                self.cur &= self.cur - 1;
                return Some(idx);
            }
            self.wi += 1;
            if (self.wi << 6) >= self.end { return None; }
            self.cur = self.set.words[self.wi];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clear_test() {
        let mut b = BitSet::new();
        b.resize(130).unwrap();
        assert_eq!(b.len(), 130);
        assert!(!b.test(0));
        b.set(0);
        b.set(64);
        b.set(129);
        assert!(b.test(0) && b.test(64) && b.test(129));
        b.clear(64);
        assert!(!b.test(64));
        assert!(!b.test(500));
    }

    #[test]
    fn test_resize_keeps_prefix_and_clears_new_bits() {
        let mut b = BitSet::new();
        b.resize(10).unwrap();
        b.set_range(0, 10, 1);
        b.resize(200).unwrap();
        assert_eq!(b.count_ones(0, 200), 10);
        assert!(!b.test(10));
    }

    #[test]
    fn test_shrink_masks_tail() {
        let mut b = BitSet::new();
        b.resize(128).unwrap();
        b.set_range(0, 128, 1);
        b.resize(70).unwrap();
        assert_eq!(b.words()[1], (1u64 << 6) - 1);
        b.resize(128).unwrap();
        assert_eq!(b.count_ones(0, 128), 70);
    }

    #[test]
    fn test_set_range_contiguous() {
        let mut b = BitSet::new();
        b.resize(300).unwrap();
        b.set_range(5, 5, 1);
        assert_eq!(b.count_ones(0, 300), 0);
        b.set_range(3, 7, 1);
        assert_eq!(b.count_ones(0, 300), 4);
        b.set_range(60, 200, 1);
        assert_eq!(b.count_ones(0, 300), 4 + 140);
        assert!(!b.test(59) && b.test(60) && b.test(199) && !b.test(200));
    }

    #[test]
    fn test_set_range_strided() {
        let mut b = BitSet::new();
        b.resize(100).unwrap();
        b.set_range(3, 100, 2);
        assert_eq!(b.count_ones(0, 100), 49);
        assert!(b.test(3) && b.test(99) && !b.test(4));
    }

    #[test]
    fn test_select_and_iter_agree() {
        let mut b = BitSet::new();
        b.resize(1_000).unwrap();
        for i in (0..1_000).filter(|i| i % 7 == 3 || i % 64 == 0) {
            b.set(i);
        }
        let ones: Vec<usize> = b.iter_ones(10, 900).collect();
        assert_eq!(ones.len(), b.count_ones(10, 900));
        for (k, &idx) in ones.iter().enumerate() {
            assert_eq!(b.select(10, 900, k), Some(idx));
        }
        assert_eq!(b.select(10, 900, ones.len()), None);
    }

    #[test]
    fn test_unaddressable_size_is_rejected() {
        let mut b = BitSet::new();
        b.resize(100).unwrap();
        b.set(42);
        assert_eq!(
            b.resize(usize::MAX - 3),
            Err(SieveError::AllocationFailed { bits: usize::MAX - 3 })
        );
        assert_eq!(b.len(), 100);
        assert!(b.test(42));
        b.set_range(0, 10, 1);
        assert_eq!(b.count_ones(0, 100), 11);
    }

    #[test]
    fn test_words_for_near_usize_max() {
        assert_eq!(words_for(0), 0);
        assert_eq!(words_for(64), 1);
        assert_eq!(words_for(65), 2);
        assert_eq!(words_for(usize::MAX), usize::MAX / 64 + 1);
    }

    #[test]
    fn test_empty_ranges() {
        let b = BitSet::new();
        assert!(b.is_empty());
        assert_eq!(b.count_ones(0, 10), 0);
        assert_eq!(b.select(0, 10, 0), None);
        assert_eq!(b.iter_ones(0, 10).count(), 0);
    }
}
