//! End-to-end analysis of one input file
//!
//! Stages run strictly in order and each consumes the previous stage's output:
//! load → summaries → paired intervals → t-tests → models → marginal means →
//! diagnostics. A failing stage aborts the run; undefined statistics such as
//! a t statistic on identical pair differences are reported, not raised.

use crate::config::AnalysisConfig;
use crate::data::{load_observations, relevel, Column, ObservationTable};
use crate::diagnostics::{check_model, DiagnosticsReport};
use crate::emmeans::{estimated_marginal_means, EmmTable};
use crate::error::{AnalysisError, Result};
use crate::hypothesis::{paired_t_test, two_sample_t_test};
use crate::interval::ConfidenceInterval;
use crate::model::{
    confidence_intervals, fit_intercept_only, fit_with_blocked_factor, fit_with_factor,
    LinearModel,
};
use crate::report::{AnalysisReport, ModelReport, PairedIntervals, TTests};
use crate::summary::{difference_summary, five_number_summary, group_summary, pivot_pairs};
use std::path::Path;
use tracing::info;

pub const MODEL_INTERCEPT_ONLY: &str = "intercept_only";
pub const MODEL_FACTOR: &str = "factor";
pub const MODEL_RELEVELED: &str = "factor_releveled";
pub const MODEL_BLOCKED: &str = "blocked";

fn model_report(
    name: &str,
    model: &LinearModel,
    reference_level: Option<&str>,
    level: f64,
) -> Result<ModelReport> {
    Ok(ModelReport {
        name: name.to_string(),
        kind: model.kind(),
        formula: model.formula(),
        reference_level: reference_level.map(str::to_string),
        coefficients: model.coefficient_table()?,
        intervals: confidence_intervals(model, level)?,
        fit: model.fit_summary()?,
    })
}

/// First `type` level that is not `reference`
fn other_level<'a>(table: &'a ObservationTable, reference: &str) -> Result<&'a str> {
    table
        .levels(Column::Type)?
        .iter()
        .map(String::as_str)
        .find(|l| *l != reference)
        .ok_or_else(|| AnalysisError::degenerate("type has a single level"))
}

/// Run every stage on an already loaded table
pub fn analyze_table(
    table: &ObservationTable,
    config: &AnalysisConfig,
) -> Result<(Vec<ModelReport>, EmmTable, DiagnosticsReport)> {
    let level = config.confidence_level;
    let reference = config.reference_level.as_str();

    let table = relevel(table, Column::Type, reference)?;
    let null = fit_intercept_only(&table)?;
    let factor = fit_with_factor(&table, Column::Type, reference)?;

    let other = other_level(&table, reference)?.to_string();
    let flipped_table = relevel(&table, Column::Type, &other)?;
    let flipped = fit_with_factor(&flipped_table, Column::Type, &other)?;
    let blocked = fit_with_blocked_factor(&table, Column::Type, reference, Column::Pair)?;

    let models = vec![
        model_report(MODEL_INTERCEPT_ONLY, &null, None, level)?,
        model_report(MODEL_FACTOR, &factor, Some(reference), level)?,
        model_report(MODEL_RELEVELED, &flipped, Some(&other), level)?,
        model_report(MODEL_BLOCKED, &blocked, Some(reference), level)?,
    ];
    info!("Fitted {} models", models.len());

    let emmeans = estimated_marginal_means(&factor, Column::Type, Some(level))?;
    let diagnostics = check_model(&factor, &config.checks, &config.diagnostics)?;

    Ok((models, emmeans, diagnostics))
}

/// Load `path` and run the full analysis under `config`
pub fn run_analysis(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let path = path.as_ref();
    config
        .validate()
        .map_err(|reason| AnalysisError::invalid("config", reason))?;

    info!("Loading {}", path.display());
    let loaded = load_observations(path, &config.load_options())?;
    let table = &loaded.table;

    let groups = group_summary(table)?;
    let five_number = five_number_summary(table)?;
    for g in &groups {
        info!("{}: mean={:.3}, sd={:.3}, n={}", g.label, g.mean, g.sd, g.count);
    }

    let paired = pivot_pairs(table)?;
    let differences = difference_summary(&paired)?;
    let paired_intervals = PairedIntervals {
        rough: ConfidenceInterval::from_multiplier(differences.mean, differences.se, 2.0)?,
        exact: ConfidenceInterval::t_interval(
            differences.mean,
            differences.se,
            config.confidence_level,
            (differences.n - 1) as f64,
        )?,
    };
    info!(
        "Mean difference {:.4} (se {:.4}), {:.0}% CI [{:.4}, {:.4}]",
        differences.mean,
        differences.se,
        config.confidence_level * 100.0,
        paired_intervals.exact.lower,
        paired_intervals.exact.upper
    );

    let t_tests = TTests {
        paired: paired_t_test(&paired)?,
        two_sample: two_sample_t_test(table, &config.reference_level)?,
    };

    let (models, emmeans, diagnostics) = analyze_table(table, config)?;

    Ok(AnalysisReport {
        input: path.display().to_string(),
        config: config.clone(),
        load: loaded.report,
        groups,
        five_number,
        paired,
        differences,
        paired_intervals,
        t_tests,
        models,
        emmeans,
        diagnostics,
    })
}
