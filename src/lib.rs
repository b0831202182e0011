//! # Succinct Static Point Index
//!
//! *Spatial lookups over Elias–Fano-compressed cell ids.*
//!
//! ## Intuition First
//!
//! Picture every point on the globe stamped with its address on a
//! space-filling curve: a single 64-bit number where nearby points usually
//! get nearby numbers. Sort the points by that number and a spatial query
//! becomes a handful of range scans over a sorted list.
//!
//! A sorted list of large numbers is mostly redundant. Once sorted, the high
//! bits of consecutive numbers barely change, so storing all 64 bits of each
//! one wastes space. Elias–Fano keeps only the gaps between high parts (in
//! unary) and the raw low bits, landing within a couple of bits per element
//! of the information-theoretic minimum, while still letting you jump to the
//! $i$-th number or to the first number $\ge x$ without decompressing.
//!
//! ## The Problem
//!
//! A pointer-based tree map costs three or more machine words per entry on
//! top of the key and value. For a read-only point set that is pure waste:
//! - **Trees**: $O(\log n)$ search, $\ge 24$ bytes of links per entry.
//! - **Compressed arrays**: minimal space, but no search without decoding.
//!
//! ## Mathematical Formulation
//!
//! For $n$ keys in $[0, U)$, Elias–Fano stores
//! $n \lfloor \log_2(U/n) \rfloor + n + U/2^{\lfloor \log_2(U/n) \rfloor} + 1$
//! bits, which is at most $n (\log_2(U/n) + 2) + 1$. Decoding is one
//! `select1` plus one packed read; successor is one `select0` plus a binary
//! search inside a single bucket.
//!
//! ## Lifecycle
//!
//! 1. [`Builder::add`] queues `(point, data)`; nothing is encoded yet.
//! 2. [`Builder::build`] stably sorts by [`CellId`], encodes the ids and
//!    installs a [`CompressedMap`] into the target [`SpatialPointIndex`].
//! 3. The index is immutable from then on; any number of
//!    [`PointIterator`]s may read it concurrently.
//!
//! ## What Could Go Wrong
//!
//! 1. **Shared cells**: distinct points can land in the same leaf cell. The
//!    builder keeps a sorted sequence, not a unique-key map, so none are lost.
//! 2. **Static only**: there is no insert. Rebuild to change the point set.
//! 3. **Universe**: a cell id of `u64::MAX` leaves no exclusive bound and is
//!    rejected at build time.
//!
//! ## References
//!
//! - Elias, P. (1974). "Efficient storage and retrieval by content and address of static files."
//! - Fano, R. (1971). "On the number of bits required to implement an associative memory."
//! - Vigna, S. (2013). "Quasi-succinct indices."
//! - Ottaviano, G., & Venturini, R. (2014). "Partitioned Elias-Fano indexes."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod bitvec;
pub mod elias_fano;
pub mod error;
pub mod key;
pub mod map;
pub mod packed;
pub mod partitioned_elias_fano;
pub mod point_index;

pub use backend::KeySequence;
pub use bitvec::BitVector;
pub use elias_fano::EliasFano;
pub use error::{Error, Result};
pub use key::{CellId, MapKey};
pub use map::{CompressedMap, Cursor};
pub use partitioned_elias_fano::PartitionedEliasFano;
pub use point_index::{Builder, Location, PointData, PointIterator, SpatialPointIndex};
