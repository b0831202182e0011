//! Fixed-width packed integer array.
//!
//! Stores `n` integers of `width` bits each back to back in 64-bit words,
//! so entry `i` occupies bits `[i * width, (i + 1) * width)`. Entries may
//! straddle a word boundary. `width == 0` stores nothing.

/// Packed array of `width`-bit unsigned integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedInts {
    words: Vec<u64>,
    width: usize,
    len: usize,
}

impl PackedInts {
    /// Pack the low `width` bits of each value.
    ///
    /// # Panics
    ///
    /// Panics if `width > 64`.
    pub fn from_fn(len: usize, width: usize, mut value_at: impl FnMut(usize) -> u64) -> Self {
        assert!(width <= 64, "packed width {width} exceeds 64 bits");
        let mask = low_mask(width);
        let mut words = Vec::with_capacity((len * width).div_ceil(64));
        let mut current = 0u64;
        let mut offset = 0usize;

        if width > 0 {
            for i in 0..len {
                let v = value_at(i) & mask;
                current |= v << offset;
                offset += width;
                if offset >= 64 {
                    words.push(current);
                    offset -= 64;
                    // Carry the bits that did not fit in the finished word.
                    current = if offset == 0 { 0 } else { v >> (width - offset) };
                }
            }
            if offset > 0 {
                words.push(current);
            }
        }

        Self { words, width, len }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits per entry.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Logical size: `len * width` bits.
    pub fn encoded_bits(&self) -> usize {
        self.len * self.width
    }

    /// Heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.words.capacity() * 8
    }

    /// Entry `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<u64> {
        (i < self.len).then(|| self.get_unchecked(i))
    }

    /// Entry `i`; the caller guarantees `i < len()`.
    #[inline]
    pub(crate) fn get_unchecked(&self, i: usize) -> u64 {
        if self.width == 0 {
            return 0;
        }
        let start = i * self.width;
        let word = start / 64;
        let offset = start % 64;

        let mut v = self.words[word] >> offset;
        if offset + self.width > 64 {
            v |= self.words[word + 1] << (64 - offset);
        }
        v & low_mask(self.width)
    }
}

/// Mask selecting the low `width` bits.
#[inline]
pub(crate) fn low_mask(width: usize) -> u64 {
    if width >= 64 {
        !0u64
    } else {
        (1u64 << width) - 1
    }
}
