//! Static spatial point index.
//!
//! A [`SpatialPointIndex`] maps the [`CellId`] of each indexed point to the
//! point itself plus a client payload. Points are collected by a [`Builder`]
//! and frozen in one step; afterwards the index is read-only for the rest of
//! its life and can be shared across threads without locking.
//!
//! ```
//! use sindex::{Builder, CellId, Location, SpatialPointIndex};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Leaf(u64);
//!
//! impl Location for Leaf {
//!     fn cell_id(&self) -> CellId {
//!         CellId::new(self.0)
//!     }
//! }
//!
//! let mut builder = Builder::new();
//! builder.add(Leaf(30), "c");
//! builder.add(Leaf(10), "a");
//! builder.add(Leaf(20), "b");
//!
//! let mut index: SpatialPointIndex<Leaf, &str> = SpatialPointIndex::new();
//! builder.build(&mut index).unwrap();
//!
//! let mut it = index.iter_points();
//! it.seek(CellId::new(15));
//! assert_eq!(*it.data(), "b");
//! ```

use std::fmt;

use crate::backend::KeySequence;
use crate::elias_fano::EliasFano;
use crate::error::Result;
use crate::key::CellId;
use crate::map::{self, CompressedMap};

/// A location that can be placed on the space-filling curve.
///
/// Points that fall in the same leaf cell may share a `CellId`; the index
/// keeps every one of them.
pub trait Location: Clone {
    /// Curve position of this location.
    fn cell_id(&self) -> CellId;
}

/// An indexed point and its client payload.
///
/// A zero-sized `D` adds nothing to the size of a `PointData`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointData<P, D = ()> {
    point: P,
    data: D,
}

impl<P, D> PointData<P, D> {
    /// Pair a point with its payload.
    pub fn new(point: P, data: D) -> Self {
        Self { point, data }
    }

    /// The point.
    pub fn point(&self) -> &P {
        &self.point
    }

    /// The payload.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Split into point and payload.
    pub fn into_parts(self) -> (P, D) {
        (self.point, self.data)
    }
}

type PointMap<P, D, S> = CompressedMap<CellId, PointData<P, D>, S>;

/// Immutable point index backed by a [`CompressedMap`].
pub struct SpatialPointIndex<P, D = (), S = EliasFano> {
    map: PointMap<P, D, S>,
}

impl<P, D, S: KeySequence> Default for SpatialPointIndex<P, D, S> {
    fn default() -> Self {
        Self {
            map: CompressedMap::default(),
        }
    }
}

impl<P, D, S> fmt::Debug for SpatialPointIndex<P, D, S>
where
    P: fmt::Debug,
    D: fmt::Debug,
    S: KeySequence,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialPointIndex")
            .field("num_points", &self.num_points())
            .field("bytes_used", &self.bytes_used())
            .finish()
    }
}

impl<P, D, S: KeySequence> SpatialPointIndex<P, D, S> {
    /// An empty index; fill it with [`Builder::build`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed points, including points that share a cell.
    pub fn num_points(&self) -> usize {
        self.map.len()
    }

    /// Return true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Encoded size in bytes: compressed cell ids plus the point/payload array.
    pub fn bytes_used(&self) -> usize {
        self.map.bytes_used()
    }

    /// Actual heap allocation in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.map.heap_bytes()
    }

    /// The underlying map.
    pub fn map(&self) -> &PointMap<P, D, S> {
        &self.map
    }

    /// Ordinary iterator over `(cell id, point data)` in cell order.
    pub fn iter(&self) -> map::Iter<'_, CellId, PointData<P, D>, S> {
        self.map.iter()
    }

    /// Cursor-style iterator positioned at the first point.
    pub fn iter_points(&self) -> PointIterator<'_, P, D, S> {
        PointIterator::new(self)
    }
}

/// Collects points and freezes them into a [`SpatialPointIndex`].
///
/// Adding is O(1) amortized; all sorting and encoding happens in
/// [`build`](Builder::build).
pub struct Builder<P, D = ()> {
    entries: Vec<(CellId, PointData<P, D>)>,
}

impl<P, D> Default for Builder<P, D> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P: fmt::Debug, D: fmt::Debug> fmt::Debug for Builder<P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("pending", &self.entries.len())
            .finish()
    }
}

impl<P: Location, D> Builder<P, D> {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty builder with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Points added since the last build.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true if nothing has been added since the last build.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue a point with its payload.
    pub fn add(&mut self, point: P, data: D) {
        self.add_point_data(PointData::new(point, data));
    }

    /// Queue an already paired point and payload.
    pub fn add_point_data(&mut self, point_data: PointData<P, D>) {
        let id = point_data.point.cell_id();
        self.entries.push((id, point_data));
    }

    /// Queue a point with the default payload, typically `()`.
    pub fn add_point(&mut self, point: P)
    where
        D: Default,
    {
        self.add(point, D::default());
    }

    /// Sort, encode, and install the queued points into `target`.
    ///
    /// The builder is empty afterwards whether or not the build succeeds;
    /// adding again starts a fresh batch. On error `target` is untouched.
    ///
    /// # Errors
    ///
    /// [`Error::UniverseOverflow`](crate::Error::UniverseOverflow) if a cell
    /// id equals `u64::MAX`.
    pub fn build<S: KeySequence>(&mut self, target: &mut SpatialPointIndex<P, D, S>) -> Result<()> {
        let mut entries = std::mem::take(&mut self.entries);
        // Stable: points sharing a cell keep their insertion order.
        entries.sort_by_key(|(id, _)| *id);

        let points = entries.len();
        let cells = entries
            .windows(2)
            .filter(|w| w[0].0 != w[1].0)
            .count()
            + usize::from(points > 0);

        let mut map = CompressedMap::from_sorted(entries)?;
        target.map.swap(&mut map);

        tracing::debug!(
            points,
            cells,
            bytes_used = target.bytes_used(),
            "built static point index"
        );
        Ok(())
    }
}

/// Cursor over a [`SpatialPointIndex`] for range and nearest-neighbor scans.
///
/// An iterator is unbound (and `done()`) until [`init`](Self::init) or
/// [`new`](Self::new) attaches it to an index; from then on it is either
/// positioned at an entry or at the end. Reads (`id`, `point`, `data`,
/// `point_data`) require a position, and panic otherwise.
pub struct PointIterator<'a, P, D = (), S = EliasFano> {
    map: Option<&'a PointMap<P, D, S>>,
    pos: usize,
}

impl<P, D, S> Clone for PointIterator<'_, P, D, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, D, S> Copy for PointIterator<'_, P, D, S> {}

impl<P, D, S> Default for PointIterator<'_, P, D, S> {
    fn default() -> Self {
        Self { map: None, pos: 0 }
    }
}

impl<P, D, S> fmt::Debug for PointIterator<'_, P, D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointIterator")
            .field("bound", &self.map.is_some())
            .field("pos", &self.pos)
            .finish()
    }
}

impl<'a, P, D, S: KeySequence> PointIterator<'a, P, D, S> {
    /// An iterator over `index`, positioned at the first point.
    pub fn new(index: &'a SpatialPointIndex<P, D, S>) -> Self {
        let mut it = Self::default();
        it.init(index);
        it
    }

    /// Attach to `index` and position at the first point.
    pub fn init(&mut self, index: &'a SpatialPointIndex<P, D, S>) {
        self.map = Some(&index.map);
        self.pos = 0;
    }

    fn bound(&self) -> &'a PointMap<P, D, S> {
        match self.map {
            Some(map) => map,
            None => panic!("point iterator used before init"),
        }
    }

    fn positioned(&self) -> &'a PointMap<P, D, S> {
        assert!(!self.done(), "point iterator read at end");
        self.bound()
    }

    /// Return true past the last point (or when unbound).
    pub fn done(&self) -> bool {
        self.map.is_none_or(|map| self.pos >= map.len())
    }

    /// Cell id of the current point.
    ///
    /// # Panics
    ///
    /// Panics if `done()`.
    pub fn id(&self) -> CellId {
        self.positioned().key_at(self.pos)
    }

    /// The current point.
    ///
    /// # Panics
    ///
    /// Panics if `done()`.
    pub fn point(&self) -> &'a P {
        self.point_data().point()
    }

    /// Payload of the current point.
    ///
    /// # Panics
    ///
    /// Panics if `done()`.
    pub fn data(&self) -> &'a D {
        self.point_data().data()
    }

    /// Point and payload of the current entry.
    ///
    /// # Panics
    ///
    /// Panics if `done()`.
    pub fn point_data(&self) -> &'a PointData<P, D> {
        self.positioned().value_at(self.pos)
    }

    /// Position at the first point, if any.
    pub fn begin(&mut self) {
        self.bound();
        self.pos = 0;
    }

    /// Position at the end, so that `done()` holds.
    pub fn finish(&mut self) {
        self.pos = self.bound().len();
    }

    /// Step to the next point.
    ///
    /// # Panics
    ///
    /// Panics if `done()`.
    pub fn advance(&mut self) {
        self.positioned();
        self.pos += 1;
    }

    /// Step back one point. Returns false, without moving, at the first point.
    pub fn prev(&mut self) -> bool {
        self.bound();
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        true
    }

    /// Position at the first point with `id() >= target`, or at the end.
    pub fn seek(&mut self, target: CellId) {
        self.pos = self.bound().lower_bound(target).position();
    }
}
