//! Pluggable succinct backends for the key column of a [`CompressedMap`].
//!
//! A backend stores a sorted multiset of `u64` keys and answers positional
//! decode and successor queries. The map never touches the encoding itself,
//! so switching between flat and partitioned Elias–Fano is a type parameter.
//!
//! [`CompressedMap`]: crate::map::CompressedMap

use crate::elias_fano::EliasFano;
use crate::error::Result;
use crate::partitioned_elias_fano::PartitionedEliasFano;

/// A static, sorted sequence of `u64` keys with successor search.
///
/// `Default` must produce the empty sequence.
pub trait KeySequence: Default {
    /// Encode a non-decreasing sequence whose values all lie in `[0, universe)`.
    fn encode(keys: &[u64], universe: u64) -> Result<Self>;

    /// Number of keys, duplicates included.
    fn len(&self) -> usize;

    /// Return true if no keys are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exclusive upper bound the encoding was sized for.
    fn universe(&self) -> u64;

    /// Key at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    fn key(&self, position: usize) -> u64;

    /// Smallest position whose key is `>= key`, or `len()` if there is none.
    fn successor(&self, key: u64) -> usize;

    /// Logical encoding size in bits.
    fn encoded_bits(&self) -> usize;

    /// Heap memory usage in bytes.
    fn heap_bytes(&self) -> usize;
}

impl KeySequence for EliasFano {
    fn encode(keys: &[u64], universe: u64) -> Result<Self> {
        EliasFano::new(keys, universe)
    }

    fn len(&self) -> usize {
        EliasFano::len(self)
    }

    fn universe(&self) -> u64 {
        EliasFano::universe(self)
    }

    fn key(&self, position: usize) -> u64 {
        self.decode(position)
    }

    fn successor(&self, key: u64) -> usize {
        EliasFano::successor(self, key)
    }

    fn encoded_bits(&self) -> usize {
        EliasFano::encoded_bits(self)
    }

    fn heap_bytes(&self) -> usize {
        EliasFano::heap_bytes(self)
    }
}

impl KeySequence for PartitionedEliasFano {
    fn encode(keys: &[u64], universe: u64) -> Result<Self> {
        PartitionedEliasFano::new(keys, universe, Self::DEFAULT_BLOCK_SIZE)
    }

    fn len(&self) -> usize {
        PartitionedEliasFano::len(self)
    }

    fn universe(&self) -> u64 {
        PartitionedEliasFano::universe(self)
    }

    fn key(&self, position: usize) -> u64 {
        match self.get(position) {
            Ok(key) => key,
            Err(e) => panic!("key position {position} out of {}: {e}", self.len()),
        }
    }

    fn successor(&self, key: u64) -> usize {
        PartitionedEliasFano::successor(self, key)
    }

    fn encoded_bits(&self) -> usize {
        PartitionedEliasFano::encoded_bits(self)
    }

    fn heap_bytes(&self) -> usize {
        PartitionedEliasFano::heap_bytes(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_backend<S: KeySequence>() {
        let keys = [2, 2, 5, 9, 9, 9, 40];
        let seq = S::encode(&keys, 41).unwrap();
        assert_eq!(seq.len(), keys.len());
        assert_eq!(seq.universe(), 41);
        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(seq.key(i), k);
        }
        for x in 0..45 {
            assert_eq!(seq.successor(x), keys.partition_point(|&k| k < x), "x = {x}");
        }
        assert!(S::default().is_empty());
    }

    #[test]
    fn flat_backend() {
        check_backend::<EliasFano>();
    }

    #[test]
    fn partitioned_backend() {
        check_backend::<PartitionedEliasFano>();
    }
}
