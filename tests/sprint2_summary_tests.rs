//! Integration tests for descriptive summaries, pairing and intervals

mod utils;

use maize_stats::data::{load_observations, LoadOptions};
use maize_stats::hypothesis::paired_t_test;
use maize_stats::interval::{t_multiplier, ConfidenceInterval};
use maize_stats::summary::{difference_summary, five_number_summary, group_summary, pivot_pairs};
use maize_stats::AnalysisError;
use utils::{assert_close, darwin_csv, fixture};

fn darwin() -> maize_stats::data::ObservationTable {
    load_observations(darwin_csv(), &LoadOptions::default())
        .unwrap()
        .table
}

#[test]
fn test_group_summary_matches_darwin() {
    let groups = group_summary(&darwin()).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label, "Cross");
    assert_eq!(groups[0].count, 15);
    assert_close(groups[0].mean, 20.191667, 1e-6);
    assert_close(groups[0].sd, 3.616945, 1e-6);
    assert_eq!(groups[1].label, "Self");
    assert_close(groups[1].mean, 17.575, 1e-6);
    assert_close(groups[1].sd, 2.051676, 1e-6);
    assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), 30);
}

#[test]
fn test_five_number_summary_brackets_median() {
    for f in five_number_summary(&darwin()).unwrap() {
        assert!(f.min <= f.q1 && f.q1 <= f.median);
        assert!(f.median <= f.q3 && f.q3 <= f.max);
    }
}

#[test]
fn test_pivot_and_difference_summary() {
    let paired = pivot_pairs(&darwin()).unwrap();
    assert_eq!(paired.len(), 15);
    assert!(paired.rows.windows(2).all(|w| w[0].pair < w[1].pair));
    assert_eq!(paired.rows[1].difference, 12.0 - 20.375);

    let d = difference_summary(&paired).unwrap();
    assert_eq!(d.n, 15);
    assert_close(d.mean, 2.616667, 1e-6);
    assert_close(d.sd, 4.718047, 1e-6);
    assert_close(d.se, 1.218195, 1e-6);
}

#[test]
fn test_unmatched_pair_names_first_offender() {
    let table = load_observations(fixture("unmatched_pair.csv"), &LoadOptions::default())
        .unwrap()
        .table;
    match pivot_pairs(&table) {
        Err(AnalysisError::Pairing { pair, reason }) => {
            assert_eq!(pair, 2);
            assert!(reason.contains("0 Self"));
        }
        other => panic!("expected pairing error, got {:?}", other),
    }
}

#[test]
fn test_rough_and_exact_paired_intervals() {
    let d = difference_summary(&pivot_pairs(&darwin()).unwrap()).unwrap();

    let rough = ConfidenceInterval::from_multiplier(d.mean, d.se, 2.0).unwrap();
    assert_close(rough.lower, 0.180276, 1e-5);
    assert_close(rough.upper, 5.053057, 1e-5);
    assert_close(rough.level, 0.9545, 1e-4);

    let exact = ConfidenceInterval::t_interval(d.mean, d.se, 0.95, 14.0).unwrap();
    assert_close(exact.lower, 0.003899, 1e-4);
    assert_close(exact.upper, 5.229434, 1e-4);
    assert!(exact.width() > rough.width());
    assert_close(t_multiplier(0.95, 14.0).unwrap(), 2.144787, 1e-5);
}

#[test]
fn test_paired_t_statistic_is_mean_over_se() {
    let paired = pivot_pairs(&darwin()).unwrap();
    let d = difference_summary(&paired).unwrap();
    let t = paired_t_test(&paired).unwrap();

    assert_close(t.statistic, d.mean / d.se, 1e-12);
    assert_eq!(t.df, 14.0);
    assert_close(t.p_value, 0.04971, 1e-4);
}

#[test]
fn test_interval_rejects_bad_inputs() {
    assert!(matches!(
        ConfidenceInterval::from_multiplier(1.0, -0.5, 2.0),
        Err(AnalysisError::InvalidInput { .. })
    ));
    assert!(ConfidenceInterval::from_multiplier(1.0, f64::NAN, 2.0).is_err());
    assert!(ConfidenceInterval::t_interval(1.0, 0.5, 1.2, 10.0).is_err());
    assert!(ConfidenceInterval::t_interval(1.0, 0.5, 0.95, 0.0).is_err());
}
