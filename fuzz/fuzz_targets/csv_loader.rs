#![no_main]

use libfuzzer_sys::fuzz_target;
use maize_stats::data::{parse_observations, LoadOptions};
use maize_stats::summary::pivot_pairs;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must produce a table or a load error, never a panic
    let options = LoadOptions {
        height_bounds: Some((0.0, 100.0)),
    };
    if let Ok(loaded) = parse_observations(data, &options) {
        assert!(loaded.report.rows_dropped <= loaded.report.rows_read);
        assert_eq!(loaded.table.len() + loaded.report.rows_dropped, loaded.report.rows_read);
        let _ = pivot_pairs(&loaded.table);
    }
});
