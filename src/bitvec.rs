//! Cache-friendly succinct bit vector with rank/select support.
//!
//! Implements the Rank9 indexing scheme with an interleaved (blocked) layout
//! for cache locality.
//!
//! # Layout
//!
//! Each 512-bit block is stored as 10 x 64-bit words:
//! - Word 0: Absolute rank (number of 1s before this block)
//! - Word 1: Relative ranks (7 x 9-bit cumulative counts within the block)
//! - Word 2-9: Raw data (512 bits)
//!
//! A trailing sentinel block carries the total rank so that `rank1(len)` and
//! the select searches never index past the storage.
//!
//! Two coarse hint arrays (one entry per 512 ones, one per 512 zeros) narrow
//! the block search for `select1` / `select0` to a short binary search.

const BLOCK_BITS: usize = 512;
const BLOCK_WORDS: usize = 10;
const DATA_OFFSET: usize = 2;

/// Mutable bit buffer used to assemble a [`BitVector`].
///
/// Bits are either set at explicit positions inside a pre-sized buffer or
/// appended at the end; `build` freezes the buffer and computes the indexes.
#[derive(Debug, Clone, Default)]
pub struct BitVectorBuilder {
    words: Vec<u64>,
    len: usize,
}

impl BitVectorBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder holding `len` zero bits.
    pub fn with_len(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(64)],
            len,
        }
    }

    /// Number of bits currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if no bits are held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set the bit at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= len()`.
    pub fn set(&mut self, pos: usize) {
        assert!(pos < self.len, "bit {pos} outside builder of {} bits", self.len);
        self.words[pos / 64] |= 1u64 << (pos % 64);
    }

    /// Append a single bit.
    pub fn push(&mut self, bit: bool) {
        if self.len % 64 == 0 {
            self.words.push(0);
        }
        if bit {
            self.words[self.len / 64] |= 1u64 << (self.len % 64);
        }
        self.len += 1;
    }

    /// Freeze into an indexed [`BitVector`].
    pub fn build(self) -> BitVector {
        BitVector::new(&self.words, self.len)
    }
}

/// A succinct bit vector with constant-time rank and near-constant select.
#[derive(Clone, PartialEq, Eq)]
pub struct BitVector {
    /// Interleaved data: [abs_rank, rel_ranks, data0, ..., data7, ...]
    storage: Vec<u64>,
    /// Block index for every 512th one-bit.
    select1_hints: Vec<u32>,
    /// Block index for every 512th zero-bit.
    select0_hints: Vec<u32>,
    len: usize,
    ones: usize,
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len)
            .field("ones", &self.ones)
            .finish()
    }
}

impl Default for BitVector {
    fn default() -> Self {
        Self::new(&[], 0)
    }
}

impl BitVector {
    /// Create a new BitVector from packed words; bits at or beyond `len` are ignored.
    pub fn new(bits: &[u64], len: usize) -> Self {
        let num_blocks = len.div_ceil(BLOCK_BITS);
        let mut storage = vec![0u64; (num_blocks + 1) * BLOCK_WORDS];
        let mut select1_hints = Vec::new();
        let mut select0_hints = Vec::new();

        let mut total_ones = 0usize;
        let mut next_one_hint = 0usize;
        let mut next_zero_hint = 0usize;

        for block in 0..=num_blocks {
            let base = block * BLOCK_WORDS;
            storage[base] = total_ones as u64;

            let zeros_before = block * BLOCK_BITS - total_ones;
            while total_ones >= next_one_hint {
                select1_hints.push(block as u32);
                next_one_hint += BLOCK_BITS;
            }
            while zeros_before >= next_zero_hint {
                select0_hints.push(block as u32);
                next_zero_hint += BLOCK_BITS;
            }
            if block == num_blocks {
                break;
            }

            let mut relative = 0u64;
            let mut in_block = 0u64;
            for sub in 0..8 {
                let bit_start = block * BLOCK_BITS + sub * 64;
                let word = Self::masked_word(bits, bit_start / 64, bit_start, len);
                storage[base + DATA_OFFSET + sub] = word;
                if sub > 0 {
                    relative |= in_block << (9 * (sub - 1));
                }
                in_block += u64::from(word.count_ones());
            }
            storage[base + 1] = relative;
            total_ones += in_block as usize;
        }

        Self {
            storage,
            select1_hints,
            select0_hints,
            len,
            ones: total_ones,
        }
    }

    fn masked_word(bits: &[u64], idx: usize, bit_start: usize, len: usize) -> u64 {
        if bit_start >= len {
            return 0;
        }
        let word = bits.get(idx).copied().unwrap_or(0);
        let valid = len - bit_start;
        if valid >= 64 {
            word
        } else {
            word & ((1u64 << valid) - 1)
        }
    }

    /// Return the total number of bits in the vector.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if the bit-vector has length 0.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Number of unset bits.
    pub fn count_zeros(&self) -> usize {
        self.len - self.ones
    }

    /// Approximate heap memory usage in bytes, indexes included.
    pub fn heap_bytes(&self) -> usize {
        self.storage.capacity() * 8 + (self.select1_hints.capacity() + self.select0_hints.capacity()) * 4
    }

    #[inline]
    fn abs_rank(&self, block: usize) -> usize {
        self.storage[block * BLOCK_WORDS] as usize
    }

    #[inline]
    fn rel_rank(&self, block: usize, sub: usize) -> usize {
        if sub == 0 {
            return 0;
        }
        ((self.storage[block * BLOCK_WORDS + 1] >> (9 * (sub - 1))) & 0x1FF) as usize
    }

    #[inline]
    fn word(&self, block: usize, sub: usize) -> u64 {
        self.storage[block * BLOCK_WORDS + DATA_OFFSET + sub]
    }

    /// Return true if the bit at index `i` is set.
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        let word = self.word(i / BLOCK_BITS, (i % BLOCK_BITS) / 64);
        (word >> (i % 64)) & 1 == 1
    }

    /// Return the number of set bits in the range [0, i).
    pub fn rank1(&self, i: usize) -> usize {
        let i = i.min(self.len);
        let block = i / BLOCK_BITS;
        let sub = (i % BLOCK_BITS) / 64;
        let offset = i % 64;

        let mut rank = self.abs_rank(block) + self.rel_rank(block, sub);
        if offset > 0 {
            rank += (self.word(block, sub) & ((1u64 << offset) - 1)).count_ones() as usize;
        }
        rank
    }

    /// Return the number of unset bits in the range [0, i).
    pub fn rank0(&self, i: usize) -> usize {
        let i = i.min(self.len);
        i - self.rank1(i)
    }

    /// Return the position of the $k$-th set bit (0-indexed).
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }
        let target = k + 1;
        let block = self.find_block(&self.select1_hints, k, |b| self.abs_rank(b), target);

        let mut remaining = target - self.abs_rank(block);
        let mut sub = 0;
        while sub < 7 && self.rel_rank(block, sub + 1) < remaining {
            sub += 1;
        }
        remaining -= self.rel_rank(block, sub);

        let pos = select_in_word(self.word(block, sub), remaining - 1);
        Some(block * BLOCK_BITS + sub * 64 + pos)
    }

    /// Return the position of the $k$-th unset bit (0-indexed).
    pub fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.count_zeros() {
            return None;
        }
        let target = k + 1;
        let zeros_before = |b: usize| b * BLOCK_BITS - self.abs_rank(b);
        let block = self.find_block(&self.select0_hints, k, zeros_before, target);

        let mut remaining = target - zeros_before(block);
        let rel_zeros = |sub: usize| sub * 64 - self.rel_rank(block, sub);
        let mut sub = 0;
        while sub < 7 && rel_zeros(sub + 1) < remaining {
            sub += 1;
        }
        remaining -= rel_zeros(sub);

        let pos = select_in_word(!self.word(block, sub), remaining - 1);
        Some(block * BLOCK_BITS + sub * 64 + pos)
    }

    /// Locate the block holding the `target`-th counted bit, where
    /// `counted_before(b)` is the number of counted bits before block `b`.
    fn find_block(
        &self,
        hints: &[u32],
        k: usize,
        counted_before: impl Fn(usize) -> usize,
        target: usize,
    ) -> usize {
        let hint = k / BLOCK_BITS;
        let mut lo = hints[hint] as usize;
        let mut hi = match hints.get(hint + 1) {
            Some(&next) => next as usize + 1,
            None => self.storage.len() / BLOCK_WORDS,
        };
        // First block whose prefix count reaches the target, minus one.
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if counted_before(mid) < target {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo - 1
    }

    /// Return the position of the first set bit at or after `pos`.
    pub fn next_one(&self, pos: usize) -> Option<usize> {
        if pos >= self.len {
            return None;
        }
        let mut word_idx = pos / 64;
        let mut word = self.word(word_idx / 8, word_idx % 8) & (!0u64 << (pos % 64));
        let last_word = (self.len - 1) / 64;
        loop {
            if word != 0 {
                let found = word_idx * 64 + word.trailing_zeros() as usize;
                return (found < self.len).then_some(found);
            }
            word_idx += 1;
            if word_idx > last_word {
                return None;
            }
            word = self.word(word_idx / 8, word_idx % 8);
        }
    }
}

/// Position of the `k`-th (0-indexed) set bit of `word`. `word` must have more than `k` ones.
#[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
#[inline]
fn select_in_word(word: u64, k: usize) -> usize {
    // SAFETY: the `bmi2` target feature is statically enabled for this build.
    let deposited = unsafe { core::arch::x86_64::_pdep_u64(1u64 << k, word) };
    deposited.trailing_zeros() as usize
}

/// Position of the `k`-th (0-indexed) set bit of `word`. `word` must have more than `k` ones.
#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
#[inline]
fn select_in_word(mut word: u64, k: usize) -> usize {
    for _ in 0..k {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}
