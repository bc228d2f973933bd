// Diagnostics tests

use super::*;
use crate::data::{Column, Observation, ObservationTable, PlantType};
use crate::model::{fit_intercept_only, fit_with_factor};
use crate::test_support::{assert_close, darwin_table, outlier_table};

#[test]
fn test_parse_check_names() {
    assert_eq!("normality".parse::<DiagnosticCheck>().unwrap(), DiagnosticCheck::Normality);
    assert_eq!(" Homogeneity ".parse::<DiagnosticCheck>().unwrap(), DiagnosticCheck::Homogeneity);
    assert_eq!("OUTLIERS".parse::<DiagnosticCheck>().unwrap(), DiagnosticCheck::Outliers);

    let err = "linearity".parse::<DiagnosticCheck>().unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    assert!(err.to_string().contains("linearity"));
}

#[test]
fn test_single_gross_outlier_is_the_only_flag() {
    let model = fit_with_factor(&outlier_table(), Column::Type, "Cross").unwrap();
    let report = check_model(
        &model,
        &[DiagnosticCheck::Outliers],
        &DiagnosticsConfig::default(),
    )
    .unwrap();

    assert_eq!(report.results.len(), 1);
    let outliers = report.outliers().unwrap();
    assert_eq!(outliers.verdict, Verdict::Flagged);
    assert_close(outliers.threshold, 4.0 / 20.0, 1e-12);
    assert_eq!(outliers.flagged, vec![9]);
    assert!(outliers.cooks_distance[9] > 0.9);
}

#[test]
fn test_custom_cooks_threshold() {
    let model = fit_with_factor(&outlier_table(), Column::Type, "Cross").unwrap();
    let config = DiagnosticsConfig {
        cooks_threshold: Some(5.0),
        ..DiagnosticsConfig::default()
    };
    let report = check_model(&model, &[DiagnosticCheck::Outliers], &config).unwrap();
    assert_eq!(report.outliers().unwrap().verdict, Verdict::Pass);
    assert!(report.outliers().unwrap().flagged.is_empty());
}

#[test]
fn test_darwin_full_battery() {
    let model = fit_with_factor(&darwin_table(), Column::Type, "Cross").unwrap();
    let report = check_model(&model, &DiagnosticCheck::ALL, &DiagnosticsConfig::default()).unwrap();

    assert_eq!(report.n_obs, 30);
    assert_eq!(report.results.len(), 3);
    // Balanced two-group design: every observation has leverage 1/15
    for h in &report.leverage {
        assert_close(*h, 1.0 / 15.0, 1e-10);
    }

    // The two short Cross plants give heavy left tails
    let normality = report.normality().unwrap();
    assert_close(normality.shapiro_wilk.statistic, 0.8309, 1e-3);
    assert!(normality.shapiro_wilk.p_value < 0.001);
    assert_eq!(normality.verdict, Verdict::Flagged);
    assert_eq!(normality.qq.len(), 30);

    let homogeneity = report.homogeneity().unwrap();
    assert_close(homogeneity.breusch_pagan.statistic, 1.9023, 1e-3);
    assert_close(homogeneity.breusch_pagan.p_value, 0.1678, 1e-3);
    assert_eq!(homogeneity.verdict, Verdict::Pass);

    // The two 12-inch Cross plants (pairs 2 and 15)
    let outliers = report.outliers().unwrap();
    assert_close(outliers.threshold, 4.0 / 30.0, 1e-12);
    assert_eq!(outliers.flagged, vec![2, 28]);

    assert!(report.any_flagged());
}

#[test]
fn test_intercept_only_homogeneity_passes() {
    let model = fit_intercept_only(&darwin_table()).unwrap();
    let report = check_model(
        &model,
        &[DiagnosticCheck::Homogeneity],
        &DiagnosticsConfig::default(),
    )
    .unwrap();

    let bp = report.homogeneity().unwrap().breusch_pagan;
    assert_eq!(bp.statistic, 0.0);
    assert_eq!(bp.p_value, 1.0);
    assert_eq!(report.homogeneity().unwrap().verdict, Verdict::Pass);
}

#[test]
fn test_checks_run_once_in_request_order() {
    let model = fit_with_factor(&darwin_table(), Column::Type, "Cross").unwrap();
    let report = check_model(
        &model,
        &[
            DiagnosticCheck::Outliers,
            DiagnosticCheck::Normality,
            DiagnosticCheck::Outliers,
        ],
        &DiagnosticsConfig::default(),
    )
    .unwrap();

    let order: Vec<_> = report.results.iter().map(|r| r.check()).collect();
    assert_eq!(order, vec![DiagnosticCheck::Outliers, DiagnosticCheck::Normality]);
    assert!(report.get(DiagnosticCheck::Homogeneity).is_none());
}

#[test]
fn test_model_is_untouched() {
    let model = fit_with_factor(&darwin_table(), Column::Type, "Cross").unwrap();
    let before = model.coefficients().to_vec();
    check_model(&model, &DiagnosticCheck::ALL, &DiagnosticsConfig::default()).unwrap();
    assert_eq!(model.coefficients(), before.as_slice());
}

#[test]
fn test_invalid_alpha_rejected() {
    let model = fit_with_factor(&darwin_table(), Column::Type, "Cross").unwrap();
    let config = DiagnosticsConfig {
        alpha: 1.5,
        cooks_threshold: None,
    };
    assert!(matches!(
        check_model(&model, &DiagnosticCheck::ALL, &config),
        Err(AnalysisError::InvalidInput { .. })
    ));
}

#[test]
fn test_report_serializes_with_check_tag() {
    let model = fit_with_factor(&outlier_table(), Column::Type, "Cross").unwrap();
    let report = check_model(
        &model,
        &[DiagnosticCheck::Outliers],
        &DiagnosticsConfig::default(),
    )
    .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["check"], "outliers");
    assert_eq!(json["results"][0]["verdict"], "flagged");
    assert_eq!(json["results"][0]["flagged"][0], 9);
}

#[test]
fn test_identical_residuals_skip_normality() {
    // Intercept-only fit of four equal heights leaves exactly zero residuals
    let rows = (1..=2)
        .flat_map(|pair| {
            [PlantType::Cross, PlantType::SelfFertilised].map(|plant_type| Observation {
                pair,
                plant_type,
                height: 20.0,
            })
        })
        .collect();
    let model = fit_intercept_only(&ObservationTable::new(rows)).unwrap();
    let report = check_model(&model, &DiagnosticCheck::ALL, &DiagnosticsConfig::default()).unwrap();

    assert!(report.normality().is_none());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].check, DiagnosticCheck::Normality);
    assert!(report.skipped[0].reason.contains("identical"));
    assert_eq!(report.homogeneity().unwrap().verdict, Verdict::Pass);
    assert!(report.outliers().unwrap().flagged.is_empty());
}
