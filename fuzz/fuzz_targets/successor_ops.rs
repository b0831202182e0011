#![no_main]
use libfuzzer_sys::fuzz_target;
use sindex::elias_fano::EliasFano;

fuzz_target!(|data: (Vec<u32>, Vec<u32>, u16)| {
    let (mut values, probes, slack) = data;
    values.sort_unstable();
    let values: Vec<u64> = values.into_iter().map(u64::from).collect();

    let universe = values.last().map_or(0, |&m| m + 1) + u64::from(slack);
    let ef = match EliasFano::new(&values, universe) {
        Ok(ef) => ef,
        Err(e) => panic!("valid universe rejected: {e}"),
    };

    assert_eq!(ef.len(), values.len());
    for (i, &v) in values.iter().enumerate() {
        assert_eq!(ef.decode(i), v);
    }

    for x in probes {
        let x = u64::from(x);
        let pos = ef.successor(x);
        assert_eq!(pos, values.partition_point(|&v| v < x));
        if pos < values.len() {
            assert!(ef.decode(pos) >= x);
        }
    }
});
