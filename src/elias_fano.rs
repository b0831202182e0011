//! Elias-Fano encoding for monotone sequences.
//!
//! Provides near-optimal space for sorted integers while allowing
//! $O(1)$ random access to any element and fast successor queries.
//!
//! # Theory
//!
//! For $n$ sorted integers in range $[0, U)$, Elias-Fano uses:
//! - $L = \lfloor \log_2(U/n) \rfloor$ bits for each "lower" part.
//! - A bit vector of length $n + \lfloor U/2^L \rfloor + 1$ for "upper" parts:
//!   element $i$ with upper part $h_i$ sets bit $h_i + i$.
//!
//! Total space is $n \lfloor \log_2(U/n) \rfloor + 2n + o(n)$ bits.
//!
//! # Queries
//!
//! - `decode(i)`: `select1(i) - i` recovers $h_i$; the packed lower array
//!   supplies the rest.
//! - `successor(x)`: the $(h_x - 1)$-th zero of the upper bits closes the
//!   bucket just below $h_x$, so `select0` lands directly on the first
//!   element whose upper part is $\ge h_x$. Within the bucket of equal upper
//!   parts the lower parts are sorted, so a binary search finishes the job.
//!
//! Duplicates are allowed: equal keys occupy consecutive positions.

use crate::bitvec::{BitVector, BitVectorBuilder};
use crate::error::{Error, Result};
use crate::packed::{low_mask, PackedInts};

/// Elias-Fano encoding structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EliasFano {
    upper_bits: BitVector,
    lower_bits: PackedInts,
    l: usize,
    n: usize,
    universe: u64,
}

impl EliasFano {
    /// Encode a non-decreasing sequence whose values all lie in `[0, universe)`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUniverse`] if the last value is not below `universe`,
    /// [`Error::UniverseOverflow`] if the upper-bits length is not addressable.
    ///
    /// # Panics
    ///
    /// Panics if `values` is not sorted; the encoder never re-sorts.
    pub fn new(values: &[u64], universe: u64) -> Result<Self> {
        assert!(
            values.windows(2).all(|w| w[0] <= w[1]),
            "Elias-Fano input must be non-decreasing"
        );
        let n = values.len();
        let Some(&max_key) = values.last() else {
            return Ok(Self {
                universe,
                ..Self::default()
            });
        };
        if max_key >= universe {
            return Err(Error::InvalidUniverse { universe, max_key });
        }

        // L = floor(log2(U/n))
        let ratio = universe / n as u64;
        let l = if ratio > 0 {
            (63 - ratio.leading_zeros()) as usize
        } else {
            0
        };

        let lower_bits = PackedInts::from_fn(n, l, |i| values[i]);

        // Upper bits: n ones and U/2^L + 1 zeros.
        let upper_len = usize::try_from(universe >> l)
            .ok()
            .and_then(|buckets| buckets.checked_add(n + 1))
            .ok_or(Error::UniverseOverflow { max_key })?;
        let mut upper = BitVectorBuilder::with_len(upper_len);
        for (i, &v) in values.iter().enumerate() {
            upper.set((v >> l) as usize + i);
        }
        let upper_bits = upper.build();

        tracing::debug!(
            n,
            universe,
            low_bits = l,
            encoded_bits = upper_bits.len() + lower_bits.encoded_bits(),
            "encoded elias-fano sequence"
        );

        Ok(Self {
            upper_bits,
            lower_bits,
            l,
            n,
            universe,
        })
    }

    /// Return the number of elements.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the sequence has 0 elements.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Exclusive upper bound the encoding was sized for.
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Width of the packed lower parts.
    pub fn low_bits(&self) -> usize {
        self.l
    }

    /// Logical size of the encoding: upper bit vector plus packed lower parts.
    pub fn encoded_bits(&self) -> usize {
        self.upper_bits.len() + self.lower_bits.encoded_bits()
    }

    /// Heap memory usage in bytes, rank/select indexes included.
    pub fn heap_bytes(&self) -> usize {
        self.upper_bits.heap_bytes() + self.lower_bits.heap_bytes()
    }

    /// Return the value at index `i`.
    pub fn get(&self, i: usize) -> Result<u64> {
        if i >= self.n {
            return Err(Error::IndexOutOfBounds(i));
        }
        let pos = self
            .upper_bits
            .select1(i)
            .ok_or(Error::InvalidSelection(i))?;
        let high = (pos - i) as u64;
        Ok((high << self.l) | self.lower_bits.get_unchecked(i))
    }

    /// Return the value at index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn decode(&self, i: usize) -> u64 {
        match self.get(i) {
            Ok(v) => v,
            Err(e) => panic!("decode past the end of a sequence of {}: {e}", self.n),
        }
    }

    /// Smallest position whose value is `>= x`, or `len()` if there is none.
    pub fn successor(&self, x: u64) -> usize {
        if self.n == 0 || x >= self.universe {
            return self.n;
        }
        let hx = (x >> self.l) as usize;
        let lx = x & low_mask(self.l);

        // Elements with upper part < hx.
        let start = if hx == 0 {
            0
        } else {
            match self.upper_bits.select0(hx - 1) {
                Some(z) => z - (hx - 1),
                None => return self.n,
            }
        };
        // Elements with upper part <= hx.
        let end = match self.upper_bits.select0(hx) {
            Some(z) => z - hx,
            None => self.n,
        };

        let (mut lo, mut hi) = (start, end);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.lower_bits.get_unchecked(mid) < lx {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Sequential decoder over all values, in order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ef: self,
            pos: 0,
            bit: 0,
        }
    }
}

impl<'a> IntoIterator for &'a EliasFano {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential Elias-Fano decoder.
///
/// Walks the upper bits word by word instead of issuing a `select1` per element.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    ef: &'a EliasFano,
    pos: usize,
    bit: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.pos >= self.ef.n {
            return None;
        }
        let bit = self.ef.upper_bits.next_one(self.bit)?;
        let high = (bit - self.pos) as u64;
        let value = (high << self.ef.l) | self.ef.lower_bits.get_unchecked(self.pos);
        self.pos += 1;
        self.bit = bit + 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ef.n - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elias_fano_basic() {
        let values = vec![10, 20, 30, 100, 1000];
        let ef = EliasFano::new(&values, 2000).unwrap();

        assert_eq!(ef.len(), 5);
        assert_eq!(ef.get(0).unwrap(), 10);
        assert_eq!(ef.get(1).unwrap(), 20);
        assert_eq!(ef.get(2).unwrap(), 30);
        assert_eq!(ef.get(3).unwrap(), 100);
        assert_eq!(ef.get(4).unwrap(), 1000);
        assert_eq!(ef.get(5), Err(Error::IndexOutOfBounds(5)));
        assert_eq!(ef.low_bits(), 8);
    }

    #[test]
    fn duplicates_survive() {
        let values = vec![1, 3, 3, 7, 9];
        let ef = EliasFano::new(&values, 10).unwrap();
        assert_eq!(ef.iter().collect::<Vec<_>>(), values);
        assert_eq!(ef.successor(3), 1);
        assert_eq!(ef.successor(4), 3);
        assert_eq!(ef.decode(3), 7);
    }

    #[test]
    fn successor_bounds() {
        let values = vec![5, 6, 64, 64, 64, 200, 4000];
        let ef = EliasFano::new(&values, 4001).unwrap();
        assert_eq!(ef.successor(0), 0);
        assert_eq!(ef.successor(5), 0);
        assert_eq!(ef.successor(7), 2);
        assert_eq!(ef.successor(64), 2);
        assert_eq!(ef.successor(65), 5);
        assert_eq!(ef.successor(4000), 6);
        assert_eq!(ef.successor(4001), 7);
        assert_eq!(ef.successor(u64::MAX), 7);
    }

    #[test]
    fn empty_sequence() {
        let ef = EliasFano::new(&[], 0).unwrap();
        assert!(ef.is_empty());
        assert_eq!(ef.universe(), 0);
        assert_eq!(ef.encoded_bits(), 0);
        assert_eq!(ef.successor(0), 0);
        assert_eq!(ef.iter().next(), None);
        assert!(ef.get(0).is_err());
    }

    #[test]
    fn universe_must_cover_max() {
        assert_eq!(
            EliasFano::new(&[1, 10], 10),
            Err(Error::InvalidUniverse {
                universe: 10,
                max_key: 10
            })
        );
    }

    #[test]
    fn dense_sequence_has_no_lower_bits() {
        let values: Vec<u64> = (0..100).map(|i| i / 3).collect();
        let ef = EliasFano::new(&values, 34).unwrap();
        assert_eq!(ef.low_bits(), 0);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(ef.decode(i), v);
        }
        assert_eq!(ef.successor(10), 30);
    }

    #[test]
    fn wide_keys() {
        let values = vec![0, 1 << 40, u64::MAX - 7, u64::MAX - 1];
        let ef = EliasFano::new(&values, u64::MAX).unwrap();
        assert_eq!(ef.iter().collect::<Vec<_>>(), values);
        assert_eq!(ef.successor(2), 1);
        assert_eq!(ef.successor(u64::MAX - 6), 3);
    }

    #[test]
    #[should_panic(expected = "non-decreasing")]
    fn unsorted_input_panics() {
        let _ = EliasFano::new(&[3, 1], 10);
    }

    #[test]
    #[should_panic(expected = "decode past the end")]
    fn decode_past_end_panics() {
        let ef = EliasFano::new(&[3], 10).unwrap();
        ef.decode(1);
    }
}
