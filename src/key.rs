//! Keys accepted by [`CompressedMap`](crate::map::CompressedMap).
//!
//! The map stores every key as a `u64` inside a succinct backend; a
//! [`MapKey`] is any totally ordered type with an order-preserving,
//! lossless mapping to and from `u64`.

use std::fmt;

/// Key type of a compressed map.
///
/// `to_u64` must be monotone (`a <= b` iff `a.to_u64() <= b.to_u64()`) and
/// `from_u64(k.to_u64()) == k`.
pub trait MapKey: Copy + Ord {
    /// Order-preserving integer form.
    fn to_u64(self) -> u64;

    /// Inverse of [`MapKey::to_u64`].
    fn from_u64(raw: u64) -> Self;
}

impl MapKey for u64 {
    fn to_u64(self) -> u64 {
        self
    }

    fn from_u64(raw: u64) -> Self {
        raw
    }
}

impl MapKey for u32 {
    fn to_u64(self) -> u64 {
        u64::from(self)
    }

    fn from_u64(raw: u64) -> Self {
        raw as u32
    }
}

/// Position of a point along the hierarchical space-filling curve.
///
/// Cell ids order points so that nearby points tend to have nearby ids;
/// points falling in the same leaf cell share an id. The derivation of an
/// id from a location lives with the location type (see
/// [`Location`](crate::point_index::Location)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u64);

impl CellId {
    /// Wrap a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl From<u64> for CellId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<CellId> for u64 {
    fn from(cell: CellId) -> Self {
        cell.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl MapKey for CellId {
    fn to_u64(self) -> u64 {
        self.0
    }

    fn from_u64(raw: u64) -> Self {
        Self(raw)
    }
}
