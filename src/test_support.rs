// Shared fixtures for unit tests

use crate::config::AnalysisConfig;
use crate::data::{Observation, ObservationTable, PlantType};
use crate::pipeline::run_analysis;
use crate::report::AnalysisReport;
use std::path::PathBuf;

/// Darwin's maize heights (inches): (pair, Cross, Self)
pub const DARWIN: [(u32, f64, f64); 15] = [
    (1, 23.5, 17.375),
    (2, 12.0, 20.375),
    (3, 21.0, 20.0),
    (4, 22.0, 20.0),
    (5, 19.125, 18.375),
    (6, 21.5, 18.625),
    (7, 22.125, 18.625),
    (8, 20.375, 15.25),
    (9, 18.25, 16.5),
    (10, 21.625, 18.0),
    (11, 23.25, 16.25),
    (12, 21.0, 18.0),
    (13, 22.125, 12.75),
    (14, 23.0, 15.5),
    (15, 12.0, 18.0),
];

/// Long-format table, Cross row before Self row within each pair
pub fn darwin_table() -> ObservationTable {
    let rows = DARWIN
        .iter()
        .flat_map(|&(pair, cross, selfed)| {
            [
                Observation {
                    pair,
                    plant_type: PlantType::Cross,
                    height: cross,
                },
                Observation {
                    pair,
                    plant_type: PlantType::SelfFertilised,
                    height: selfed,
                },
            ]
        })
        .collect();
    ObservationTable::new(rows)
}

/// Two groups of ten with one gross outlier at row index 9
pub fn outlier_table() -> ObservationTable {
    let cross = [10.0, 10.2, 9.8, 10.1, 9.9, 10.0, 10.2, 9.8, 10.1, 40.0];
    let selfed = [8.0, 8.2, 7.8, 8.1, 7.9, 8.0, 8.2, 7.8, 8.1, 7.9];
    let mut rows = Vec::new();
    for (i, h) in cross.iter().enumerate() {
        rows.push(Observation {
            pair: i as u32 + 1,
            plant_type: PlantType::Cross,
            height: *h,
        });
    }
    for (i, h) in selfed.iter().enumerate() {
        rows.push(Observation {
            pair: i as u32 + 1,
            plant_type: PlantType::SelfFertilised,
            height: *h,
        });
    }
    ObservationTable::new(rows)
}

pub fn darwin_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/darwin.csv")
}

/// Full default pipeline run over the Darwin fixture
pub fn darwin_report() -> AnalysisReport {
    run_analysis(darwin_fixture(), &AnalysisConfig::default()).unwrap()
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {} ± {}, got {}",
        expected,
        tol,
        actual
    );
}
