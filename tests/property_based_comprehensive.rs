//! Property-based tests for the analysis pipeline
//!
//! Core properties covered:
//! 1. Group summaries partition the table
//! 2. Intercept-only coefficient is the sample mean
//! 3. Releveling flips the factor slope and keeps its standard error
//! 4. Confidence intervals are ordered and widen with the level
//! 5. Header normalisation is idempotent
//! 6. Mean pair difference equals the difference of group means
//! 7. The factor slope is the non-reference minus reference group mean, with
//!    the pooled-variance standard error

use maize_stats::data::{normalize_header, relevel, Column, Observation, ObservationTable, PlantType};
use maize_stats::interval::ConfidenceInterval;
use maize_stats::model::{confidence_intervals, fit_intercept_only, fit_with_factor};
use maize_stats::summary::{difference_summary, group_summary, pivot_pairs, GroupStats};
use proptest::prelude::*;

/// Paired table from generated (cross, self) heights
fn paired_table(heights: &[(f64, f64)]) -> ObservationTable {
    let rows = heights
        .iter()
        .enumerate()
        .flat_map(|(i, &(cross, selfed))| {
            let pair = i as u32 + 1;
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

fn group<'a>(groups: &'a [GroupStats], label: &str) -> &'a GroupStats {
    groups.iter().find(|g| g.label == label).unwrap()
}

fn heights_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((5.0f64..40.0, 5.0f64..40.0), 3..25)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_group_counts_sum_to_table_length(heights in heights_strategy()) {
        let table = paired_table(&heights);
        let groups = group_summary(&table).unwrap();
        let total: usize = groups.iter().map(|g| g.count).sum();
        prop_assert_eq!(total, table.len());
        prop_assert_eq!(pivot_pairs(&table).unwrap().len(), heights.len());
    }

    #[test]
    fn prop_intercept_is_sample_mean(heights in heights_strategy()) {
        let table = paired_table(&heights);
        let model = fit_intercept_only(&table).unwrap();
        let mean = table.heights().iter().sum::<f64>() / table.len() as f64;
        prop_assert!((model.coefficients()[0] - mean).abs() < 1e-9);
    }

    #[test]
    fn prop_relevel_flips_slope(heights in heights_strategy()) {
        let table = paired_table(&heights);
        let by_cross = fit_with_factor(&table, Column::Type, "Cross").unwrap();
        let flipped = relevel(&table, Column::Type, "Self").unwrap();
        let by_self = fit_with_factor(&flipped, Column::Type, "Self").unwrap();

        prop_assert!((by_cross.coefficients()[1] + by_self.coefficients()[1]).abs() < 1e-9);
        let (se_a, se_b) = (by_cross.std_errors()[1], by_self.std_errors()[1]);
        prop_assert!((se_a - se_b).abs() < 1e-9 * se_a.max(1.0));
    }

    #[test]
    fn prop_model_intervals_widen_with_level(heights in heights_strategy(), lo in 0.5f64..0.9) {
        let table = paired_table(&heights);
        let model = fit_with_factor(&table, Column::Type, "Cross").unwrap();
        let narrow = confidence_intervals(&model, lo).unwrap();
        let wide = confidence_intervals(&model, lo + 0.05).unwrap();

        for (n, w) in narrow.iter().zip(&wide) {
            prop_assert!(n.interval.lower <= n.interval.estimate);
            prop_assert!(n.interval.estimate <= n.interval.upper);
            prop_assert!(w.interval.lower <= n.interval.lower);
            prop_assert!(w.interval.upper >= n.interval.upper);
        }
    }

    #[test]
    fn prop_multiplier_interval_is_symmetric(
        estimate in -100.0f64..100.0,
        se in 0.0f64..10.0,
        multiplier in 0.0f64..4.0,
    ) {
        let ci = ConfidenceInterval::from_multiplier(estimate, se, multiplier).unwrap();
        prop_assert!(ci.lower <= ci.upper);
        prop_assert!(((ci.upper - estimate) - (estimate - ci.lower)).abs() < 1e-9);
        prop_assert!((0.0..1.0).contains(&ci.level));
    }

    #[test]
    fn prop_mean_difference_is_difference_of_means(heights in heights_strategy()) {
        let table = paired_table(&heights);
        let groups = group_summary(&table).unwrap();
        let differences = difference_summary(&pivot_pairs(&table).unwrap()).unwrap();

        let expected = group(&groups, "Cross").mean - group(&groups, "Self").mean;
        prop_assert!((differences.mean - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_slope_is_difference_of_group_means(heights in heights_strategy()) {
        let table = paired_table(&heights);
        let groups = group_summary(&table).unwrap();
        let model = fit_with_factor(&table, Column::Type, "Cross").unwrap();

        let expected = group(&groups, "Self").mean - group(&groups, "Cross").mean;
        prop_assert!((model.coefficients()[1] - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_slope_se_is_pooled(heights in heights_strategy()) {
        let table = paired_table(&heights);
        let groups = group_summary(&table).unwrap();
        let model = fit_with_factor(&table, Column::Type, "Cross").unwrap();

        let (cross, selfed) = (group(&groups, "Cross"), group(&groups, "Self"));
        let (n1, n2) = (cross.count as f64, selfed.count as f64);
        let pooled_var = ((n1 - 1.0) * cross.sd.powi(2) + (n2 - 1.0) * selfed.sd.powi(2))
            / (n1 + n2 - 2.0);
        let expected = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();

        let se = model.std_errors()[1];
        prop_assert!((se - expected).abs() < 1e-9 * expected.max(1.0));
    }

    #[test]
    fn prop_normalize_header_idempotent(raw in "[ A-Za-z0-9_.-]{0,20}") {
        let once = normalize_header(&raw);
        prop_assert_eq!(normalize_header(&once), once.clone());
        prop_assert!(!once.starts_with('_') && !once.ends_with('_'));
        prop_assert!(once.chars().all(|c| !c.is_uppercase()));
    }
}
