//! Partitioned Elias–Fano for clustered monotone sequences.
//!
//! Intuition: plain Elias–Fano chooses a single `L = floor(log2(U/n))` based on the *global*
//! universe size. Spatial keys are rarely uniform: points cluster around cities and
//! coastlines, so long runs of keys share most of their high bits. Partitioned Elias–Fano
//! splits the sequence into blocks and encodes each block with its own local universe,
//! improving compression while preserving fast random access via per-block decoding.
//!
//! This implementation is intentionally simple:
//! - blocks are encoded as independent `EliasFano` structures over values shifted by the block base
//! - access is `O(1)` block indexing + `O(1)` `EliasFano::decode`
//! - successor is a binary search over block bases + one in-block successor
//!
//! It assumes the input values are sorted (monotone) and all `< universe`.

use crate::elias_fano::EliasFano;
use crate::error::{Error, Result};

/// Partitioned Elias–Fano encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedEliasFano {
    universe: u64,
    block_size: usize,
    n: usize,
    bases: Vec<u64>,
    blocks: Vec<EliasFano>,
}

impl PartitionedEliasFano {
    /// Block size used when the structure is built as a map backend.
    pub const DEFAULT_BLOCK_SIZE: usize = 128;

    /// Build a partitioned Elias–Fano structure from a sorted sequence.
    ///
    /// `block_size` is the maximum number of items per block (clamped to >= 1; values 64–256 are
    /// typical engineering choices).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUniverse`] if the last value is not below `universe`.
    ///
    /// # Panics
    ///
    /// Panics if `values` is not sorted.
    pub fn new(values: &[u64], universe: u64, block_size: usize) -> Result<Self> {
        assert!(
            values.windows(2).all(|w| w[0] <= w[1]),
            "partitioned Elias-Fano input must be non-decreasing"
        );
        let n = values.len();
        let block_size = block_size.max(1);
        if let Some(&max_key) = values.last() {
            if max_key >= universe {
                return Err(Error::InvalidUniverse { universe, max_key });
            }
        }

        let mut bases = Vec::with_capacity(n.div_ceil(block_size));
        let mut blocks = Vec::with_capacity(n.div_ceil(block_size));
        for chunk in values.chunks(block_size) {
            let base = chunk[0];
            let local_universe = chunk[chunk.len() - 1] - base + 1;
            let rel: Vec<u64> = chunk.iter().map(|&v| v - base).collect();
            bases.push(base);
            blocks.push(EliasFano::new(&rel, local_universe)?);
        }
        tracing::trace!(n, block_size, blocks = blocks.len(), "partitioned key sequence");

        Ok(Self {
            universe,
            block_size,
            n,
            bases,
            blocks,
        })
    }

    /// Return the universe size used to build this structure.
    #[must_use]
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Return the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Maximum number of values per block.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks.
    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Logical size: every block's encoding plus one 64-bit base per block.
    #[must_use]
    pub fn encoded_bits(&self) -> usize {
        self.blocks.iter().map(EliasFano::encoded_bits).sum::<usize>() + self.bases.len() * 64
    }

    /// Heap memory usage in bytes.
    #[must_use]
    pub fn heap_bytes(&self) -> usize {
        self.blocks.iter().map(EliasFano::heap_bytes).sum::<usize>()
            + self.blocks.capacity() * std::mem::size_of::<EliasFano>()
            + self.bases.capacity() * 8
    }

    /// Return the value at index `i`.
    pub fn get(&self, i: usize) -> Result<u64> {
        if i >= self.n {
            return Err(Error::IndexOutOfBounds(i));
        }
        let b = i / self.block_size;
        let rel = self.blocks[b].get(i % self.block_size)?;
        Ok(self.bases[b] + rel)
    }

    /// Smallest position whose value is `>= x`, or `len()` if there is none.
    pub fn successor(&self, x: u64) -> usize {
        // Blocks starting strictly below x; the answer is inside the last of
        // them or at the start of the block that follows.
        let below = self.bases.partition_point(|&base| base < x);
        if below == 0 {
            return 0;
        }
        let b = below - 1;
        let in_block = self.blocks[b].successor(x - self.bases[b]);
        let pos = if in_block < self.blocks[b].len() {
            b * self.block_size + in_block
        } else {
            (b + 1) * self.block_size
        };
        pos.min(self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitioned_roundtrip_basic() {
        let values = vec![10, 20, 30, 31, 32, 100, 1000];
        let pef = PartitionedEliasFano::new(&values, 2000, 3).unwrap();
        assert_eq!(pef.len(), values.len());
        assert_eq!(pef.num_blocks(), 3);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(pef.get(i).unwrap(), v);
        }
    }

    #[test]
    fn partitioned_single_element() {
        let pef = PartitionedEliasFano::new(&[42], 100, 64).unwrap();
        assert_eq!(pef.len(), 1);
        assert_eq!(pef.get(0).unwrap(), 42);
        assert_eq!(pef.successor(42), 0);
        assert_eq!(pef.successor(43), 1);
    }

    #[test]
    fn partitioned_empty() {
        let pef = PartitionedEliasFano::new(&[], 100, 64).unwrap();
        assert!(pef.is_empty());
        assert!(pef.get(0).is_err());
        assert_eq!(pef.successor(0), 0);
    }

    #[test]
    fn partitioned_block_boundary() {
        // block_size=3, 6 elements = exactly 2 full blocks.
        let values = vec![0, 1, 2, 10, 11, 12];
        let pef = PartitionedEliasFano::new(&values, 20, 3).unwrap();
        assert_eq!(pef.num_blocks(), 2);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(pef.get(i).unwrap(), v);
        }
        assert_eq!(pef.successor(3), 3);
        assert_eq!(pef.successor(12), 5);
        assert_eq!(pef.successor(13), 6);
    }

    #[test]
    fn partitioned_block_size_larger_than_n() {
        let values = vec![5, 10, 15];
        let pef = PartitionedEliasFano::new(&values, 20, 100).unwrap();
        assert_eq!(pef.num_blocks(), 1);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(pef.get(i).unwrap(), v);
        }
        assert_eq!(pef.successor(11), 2);
        assert_eq!(pef.successor(16), 3);
    }

    #[test]
    fn duplicate_run_spanning_blocks() {
        let values = vec![4, 7, 7, 7, 7, 7, 7, 9];
        let pef = PartitionedEliasFano::new(&values, 10, 3).unwrap();
        assert_eq!(pef.successor(7), 1);
        assert_eq!(pef.successor(5), 1);
        assert_eq!(pef.successor(8), 7);
    }

    #[test]
    fn partitioned_rejects_small_universe() {
        assert!(PartitionedEliasFano::new(&[10, 20, 30], 30, 2).is_err());
    }
}
