use std::collections::BTreeMap;

use sindex::{
    Builder, CellId, CompressedMap, Location, PartitionedEliasFano, PointIterator,
    SpatialPointIndex,
};

/// Unit vector tagged with a precomputed curve position.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    xyz: [f64; 3],
    cell: u64,
}

impl Location for Point {
    fn cell_id(&self) -> CellId {
        CellId::new(self.cell)
    }
}

fn splitmix(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn random_points(n: usize, seed: u64) -> Vec<Point> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            let cell = splitmix(&mut state) >> 4;
            let angle = (cell as f64) / ((1u64 << 60) as f64) * std::f64::consts::TAU;
            Point {
                xyz: [angle.cos(), angle.sin(), 0.0],
                cell,
            }
        })
        .collect()
}

fn build(points: &[Point]) -> SpatialPointIndex<Point, u32> {
    let mut builder = Builder::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        builder.add(*p, i as u32);
    }
    let mut index = SpatialPointIndex::new();
    builder.build(&mut index).unwrap();
    index
}

#[test]
fn count_preserved_with_shared_cells() {
    let mut builder = Builder::new();
    for (i, cell) in [1u64, 3, 3, 7, 9].into_iter().enumerate() {
        builder.add(
            Point {
                xyz: [1.0, 0.0, 0.0],
                cell,
            },
            i as u32,
        );
    }
    let mut index: SpatialPointIndex<Point, u32> = SpatialPointIndex::new();
    builder.build(&mut index).unwrap();
    assert_eq!(index.num_points(), 5);

    let cursor = index.map().lower_bound(CellId::new(4));
    assert_eq!(cursor.position(), 3);
    assert_eq!(cursor.key(), CellId::new(7));

    let mut it = index.iter_points();
    it.seek(CellId::new(4));
    assert_eq!(it.id(), CellId::new(7));
    assert_eq!(*it.data(), 3);
}

#[test]
fn empty_builder_gives_empty_index() {
    let mut builder: Builder<Point, u32> = Builder::new();
    let mut index: SpatialPointIndex<Point, u32> = SpatialPointIndex::new();
    builder.build(&mut index).unwrap();

    assert_eq!(index.num_points(), 0);
    assert_eq!(index.map().begin(), index.map().end());
    assert_eq!(index.bytes_used(), 0);

    let mut it = index.iter_points();
    assert!(it.done());
    assert!(!it.prev());
    it.seek(CellId::new(0));
    assert!(it.done());
}

#[test]
fn seek_past_end_is_done() {
    let points = random_points(500, 7);
    let index = build(&points);
    let max = points.iter().map(|p| p.cell).max().unwrap();

    let mut it = index.iter_points();
    it.seek(CellId::new(max + 1));
    assert!(it.done());
    it.seek(CellId::new(max));
    assert!(!it.done());
    assert_eq!(it.id(), CellId::new(max));
}

#[test]
fn forward_scan_matches_sorted_input() {
    let points = random_points(2000, 11);
    let index = build(&points);

    let mut expected: Vec<(u64, u32)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (p.cell, i as u32))
        .collect();
    expected.sort_by_key(|&(cell, _)| cell);

    let mut it = PointIterator::new(&index);
    let mut got = Vec::new();
    while !it.done() {
        assert_eq!(it.point().cell, it.id().id());
        got.push((it.id().id(), *it.data()));
        it.advance();
    }
    assert_eq!(got, expected);

    // And back again.
    let mut back = Vec::new();
    it.finish();
    while it.prev() {
        back.push((it.id().id(), *it.data()));
    }
    back.reverse();
    assert_eq!(back, expected);
}

#[test]
fn seek_agrees_with_btree_range() {
    let points = random_points(3000, 3);
    let index = build(&points);
    let tree: BTreeMap<u64, ()> = points.iter().map(|p| (p.cell, ())).collect();

    let mut state = 99;
    let mut it = index.iter_points();
    for _ in 0..500 {
        let target = splitmix(&mut state) >> 4;
        it.seek(CellId::new(target));
        match tree.range(target..).next() {
            Some((&cell, _)) => assert_eq!(it.id(), CellId::new(cell)),
            None => assert!(it.done()),
        }
    }
}

#[test]
fn rebuild_is_idempotent() {
    let points = random_points(1000, 5);
    let a = build(&points);
    let b = build(&points);

    assert_eq!(a.num_points(), b.num_points());
    assert_eq!(a.bytes_used(), b.bytes_used());
    assert_eq!(a.map(), b.map());
}

#[test]
fn compressed_map_beats_pointer_tree() {
    let mut state = 42;
    let mut pairs: Vec<(u64, u32)> = (0..10_000u32)
        .map(|i| (splitmix(&mut state) >> 24, i))
        .collect();
    pairs.sort_by_key(|&(k, _)| k);
    let map: CompressedMap<u64, u32> = CompressedMap::from_sorted(pairs).unwrap();

    // Lower bound on a red-black/B-tree style node: key, value and three links.
    let per_node = std::mem::size_of::<u64>()
        + std::mem::size_of::<u32>()
        + 3 * std::mem::size_of::<usize>();
    let tree_bytes = map.len() * per_node;

    assert!(
        map.bytes_used() * 3 < tree_bytes,
        "compressed {} vs tree {}",
        map.bytes_used(),
        tree_bytes
    );
}

#[test]
fn unit_payload_charges_only_points() {
    let points = random_points(1000, 13);
    let mut builder: Builder<Point> = Builder::new();
    for p in &points {
        builder.add_point(*p);
    }
    let mut index: SpatialPointIndex<Point> = SpatialPointIndex::new();
    builder.build(&mut index).unwrap();

    let point_bytes = points.len() * std::mem::size_of::<Point>();
    assert!(index.bytes_used() >= point_bytes);
    assert!(index.bytes_used() < point_bytes + points.len() * 8);
}

#[test]
fn partitioned_backend_index() {
    let points = random_points(1500, 17);
    let flat = build(&points);

    let mut builder = Builder::new();
    for (i, p) in points.iter().enumerate() {
        builder.add(*p, i as u32);
    }
    let mut part: SpatialPointIndex<Point, u32, PartitionedEliasFano> = SpatialPointIndex::new();
    builder.build(&mut part).unwrap();

    assert_eq!(part.num_points(), flat.num_points());
    assert!(part.iter().eq(flat.iter()));
}

#[test]
fn concurrent_readers_agree() {
    let points = random_points(4000, 23);
    let index = build(&points);
    let expected: Vec<(CellId, u32)> = index.iter().map(|(id, pd)| (id, *pd.data())).collect();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let index = &index;
                s.spawn(move || {
                    let mut it = index.iter_points();
                    let mut state = t;
                    let mut seen = Vec::new();
                    for _ in 0..200 {
                        it.seek(CellId::new(splitmix(&mut state) >> 4));
                        if !it.done() {
                            seen.push((it.id(), *it.data()));
                        }
                    }
                    let mut all = Vec::new();
                    it.begin();
                    while !it.done() {
                        all.push((it.id(), *it.data()));
                        it.advance();
                    }
                    (seen, all)
                })
            })
            .collect();

        for h in handles {
            let (seen, all) = h.join().unwrap();
            assert_eq!(all, expected);
            for entry in seen {
                assert!(expected.contains(&entry));
            }
        }
    });
    assert_eq!(index.num_points(), 4000);
}
