//! Immutable ordered map over a succinct key column.
//!
//! Keys live in a [`KeySequence`] backend (Elias–Fano by default); values
//! live in a plain `Vec` aligned by position, so `values[i]` belongs to the
//! `i`-th decoded key. Duplicate keys are kept in the order they were given.
//!
//! The only way to populate a map is [`CompressedMap::from_sorted`]; there is
//! no incremental insert.
//!
//! Zero-sized value types cost nothing per entry: a `Vec` of a zero-sized
//! type never allocates and `bytes_used` charges `size_of::<V>() == 0`.

use std::fmt;
use std::marker::PhantomData;

use crate::backend::KeySequence;
use crate::elias_fano::EliasFano;
use crate::error::{Error, Result};
use crate::key::MapKey;

/// Read-only ordered multimap with Elias–Fano-compressed keys.
#[derive(Clone)]
pub struct CompressedMap<K, V, S = EliasFano> {
    keys: S,
    values: Vec<V>,
    _key: PhantomData<fn() -> K>,
}

impl<K, V, S: KeySequence> Default for CompressedMap<K, V, S> {
    fn default() -> Self {
        Self {
            keys: S::default(),
            values: Vec::new(),
            _key: PhantomData,
        }
    }
}

impl<K: MapKey, V, S: KeySequence> CompressedMap<K, V, S> {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs sorted by key. The universe is `max key + 1`.
    ///
    /// # Errors
    ///
    /// [`Error::UniverseOverflow`] if the largest key is `u64::MAX`.
    ///
    /// # Panics
    ///
    /// Panics if the pairs are not sorted by key.
    pub fn from_sorted(pairs: Vec<(K, V)>) -> Result<Self> {
        let universe = match pairs.last() {
            None => 0,
            Some((max, _)) => {
                let max_key = max.to_u64();
                max_key
                    .checked_add(1)
                    .ok_or(Error::UniverseOverflow { max_key })?
            }
        };
        Self::from_sorted_with_universe(pairs, universe)
    }

    /// Build from pairs sorted by key with an explicit universe bound.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUniverse`] if a key is not below `universe`.
    ///
    /// # Panics
    ///
    /// Panics if the pairs are not sorted by key.
    pub fn from_sorted_with_universe(pairs: Vec<(K, V)>, universe: u64) -> Result<Self> {
        let raw: Vec<u64> = pairs.iter().map(|(k, _)| k.to_u64()).collect();
        let keys = S::encode(&raw, universe)?;
        let values = pairs.into_iter().map(|(_, v)| v).collect();
        let map = Self {
            keys,
            values,
            _key: PhantomData,
        };
        if cfg!(debug_assertions) {
            map.verify();
        }
        Ok(map)
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Exclusive upper bound of the key encoding.
    pub fn universe(&self) -> u64 {
        self.keys.universe()
    }

    /// Cursor at the first entry.
    pub fn begin(&self) -> Cursor<'_, K, V, S> {
        Cursor { map: self, pos: 0 }
    }

    /// Cursor one past the last entry.
    pub fn end(&self) -> Cursor<'_, K, V, S> {
        Cursor {
            map: self,
            pos: self.len(),
        }
    }

    /// Cursor at the first entry whose key is `>= key`, or [`end`](Self::end).
    pub fn lower_bound(&self, key: K) -> Cursor<'_, K, V, S> {
        Cursor {
            map: self,
            pos: self.keys.successor(key.to_u64()),
        }
    }

    /// Entry at `position`, or `None` past the end.
    pub fn get(&self, position: usize) -> Option<(K, &V)> {
        let value = self.values.get(position)?;
        Some((K::from_u64(self.keys.key(position)), value))
    }

    /// Key at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    pub fn key_at(&self, position: usize) -> K {
        K::from_u64(self.keys.key(position))
    }

    /// Value at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position >= len()`.
    pub fn value_at(&self, position: usize) -> &V {
        &self.values[position]
    }

    /// Forward iterator over `(key, &value)` in key order.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            map: self,
            pos: 0,
        }
    }

    /// Keys in order, duplicates included.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Values in key order.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Encoded key bits rounded up to bytes, plus the values array.
    pub fn bytes_used(&self) -> usize {
        self.keys.encoded_bits().div_ceil(8) + self.values.len() * std::mem::size_of::<V>()
    }

    /// Actual heap allocation, succinct indexes included.
    pub fn heap_bytes(&self) -> usize {
        self.keys.heap_bytes() + self.values.capacity() * std::mem::size_of::<V>()
    }

    /// Exchange contents with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Check that keys and values are aligned and keys decode in order.
    ///
    /// # Panics
    ///
    /// Panics on any inconsistency.
    pub fn verify(&self) {
        assert_eq!(
            self.keys.len(),
            self.values.len(),
            "key and value columns disagree in length"
        );
        let mut prev = None;
        for pos in 0..self.len() {
            let key = self.keys.key(pos);
            assert!(key < self.keys.universe(), "key {key} outside universe");
            assert!(prev <= Some(key), "keys decode out of order at {pos}");
            prev = Some(key);
        }
    }
}

impl<K: MapKey, V: PartialEq, S: KeySequence> PartialEq for CompressedMap<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: MapKey, V: Eq, S: KeySequence> Eq for CompressedMap<K, V, S> {}

impl<K: MapKey + fmt::Debug, V: fmt::Debug, S: KeySequence> fmt::Debug for CompressedMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K: MapKey, V, S: KeySequence> IntoIterator for &'a CompressedMap<K, V, S> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A position within a [`CompressedMap`].
///
/// Cursors are plain indices: copying one is free, and two cursors over the
/// same map compare equal when they sit at the same position.
pub struct Cursor<'a, K, V, S = EliasFano> {
    map: &'a CompressedMap<K, V, S>,
    pos: usize,
}

impl<K, V, S> Clone for Cursor<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for Cursor<'_, K, V, S> {}

impl<K, V, S> PartialEq for Cursor<'_, K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.map, other.map) && self.pos == other.pos
    }
}

impl<K, V, S> Eq for Cursor<'_, K, V, S> {}

impl<K, V, S> fmt::Debug for Cursor<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("pos", &self.pos).finish()
    }
}

impl<'a, K: MapKey, V, S: KeySequence> Cursor<'a, K, V, S> {
    /// Index of the current entry; equals `len()` at the end.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return true past the last entry.
    pub fn is_end(&self) -> bool {
        self.pos >= self.map.len()
    }

    /// Current key.
    ///
    /// # Panics
    ///
    /// Panics at the end.
    pub fn key(&self) -> K {
        assert!(!self.is_end(), "cursor dereferenced at end");
        self.map.key_at(self.pos)
    }

    /// Current value.
    ///
    /// # Panics
    ///
    /// Panics at the end.
    pub fn value(&self) -> &'a V {
        assert!(!self.is_end(), "cursor dereferenced at end");
        self.map.value_at(self.pos)
    }

    /// Current `(key, value)` pair.
    ///
    /// # Panics
    ///
    /// Panics at the end.
    pub fn entry(&self) -> (K, &'a V) {
        (self.key(), self.value())
    }

    /// Step to the next entry.
    ///
    /// # Panics
    ///
    /// Panics at the end.
    pub fn advance(&mut self) {
        assert!(!self.is_end(), "cursor advanced past end");
        self.pos += 1;
    }
}

/// Forward iterator over a [`CompressedMap`].
pub struct Iter<'a, K, V, S = EliasFano> {
    map: &'a CompressedMap<K, V, S>,
    pos: usize,
}

impl<'a, K: MapKey, V, S: KeySequence> Iterator for Iter<'a, K, V, S> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.map.get(self.pos)?;
        self.pos += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.map.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl<K: MapKey, V, S: KeySequence> ExactSizeIterator for Iter<'_, K, V, S> {}
