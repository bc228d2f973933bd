// Classical t-tests used to cross-check the linear models
//
// - paired_t_test: one-sample test on the pair differences (statrs Student t)
// - two_sample_t_test: Student's equal-variance statistic via aprender's
//   ttest_ind, two-sided p-value from statrs at n1 + n2 - 2 df
//
// The paired statistic equals the blocked model's type slope t statistic and
// the two-sample statistic equals the single-factor model's slope t statistic.

use crate::data::{ObservationTable, PlantType};
use crate::error::{AnalysisError, Result};
use crate::summary::{difference_summary, PairedTable};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTestResult {
    /// Difference being tested (mean difference, or other minus reference)
    pub estimate: f64,
    pub statistic: f64,
    pub df: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

/// Two-sided Student t p-value
fn two_sided_p(statistic: f64, df: f64) -> Result<f64> {
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| AnalysisError::invalid("df", e.to_string()))?;
    Ok((2.0 * dist.sf(statistic.abs())).min(1.0))
}

/// Paired t-test of `cross - self` against zero
///
/// Identical differences have zero standard error: a non-zero mean gives an
/// infinite statistic with p = 0, a zero mean gives NaN with p = 1.
pub fn paired_t_test(paired: &PairedTable) -> Result<TTestResult> {
    let summary = difference_summary(paired)?;
    let df = (summary.n - 1) as f64;

    let (statistic, p_value) = if summary.se > 0.0 {
        let statistic = summary.mean / summary.se;
        (statistic, two_sided_p(statistic, df)?)
    } else {
        tracing::warn!(
            "Pair differences are all equal ({}); t statistic is degenerate",
            summary.mean
        );
        if summary.mean == 0.0 {
            (f64::NAN, 1.0)
        } else {
            (f64::INFINITY.copysign(summary.mean), 0.0)
        }
    };

    tracing::info!(
        "Paired t-test: t = {:.4}, df = {}, p = {:.4}",
        statistic,
        df,
        p_value
    );

    Ok(TTestResult {
        estimate: summary.mean,
        statistic,
        df,
        p_value,
    })
}

/// Student's two-sample t-test, non-reference group minus reference group
///
/// The sign convention matches the treatment-coded slope of a model fitted
/// with the same reference level.
pub fn two_sample_t_test(table: &ObservationTable, reference: &str) -> Result<TTestResult> {
    let reference: PlantType = reference.parse()?;
    let other = match reference {
        PlantType::Cross => PlantType::SelfFertilised,
        PlantType::SelfFertilised => PlantType::Cross,
    };

    let base = table.heights_for(reference);
    let treated = table.heights_for(other);
    if base.len() < 2 || treated.len() < 2 {
        return Err(AnalysisError::invalid(
            "type",
            format!(
                "need at least 2 values per group, got {} {} and {} {}",
                base.len(),
                reference,
                treated.len(),
                other
            ),
        ));
    }

    let as_f32 = |v: &[f64]| v.iter().map(|&h| h as f32).collect::<Vec<f32>>();
    let result = aprender::stats::hypothesis::ttest_ind(&as_f32(&treated), &as_f32(&base), true)
        .map_err(|e| AnalysisError::invalid("type", format!("t-test failed: {}", e)))?;

    let estimate = treated.iter().mean() - base.iter().mean();
    let statistic = f64::from(result.statistic);
    let df = (base.len() + treated.len() - 2) as f64;
    let p_value = two_sided_p(statistic, df)?;
    tracing::info!(
        "Two-sample t-test ({} - {}): t = {:.4}, df = {}, p = {:.4}",
        other,
        reference,
        statistic,
        df,
        p_value
    );

    Ok(TTestResult {
        estimate,
        statistic,
        df,
        p_value,
    })
}
