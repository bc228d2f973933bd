//! Plain-text report, the default `--format text`

use crate::diagnostics::{CheckResult, Verdict};
use crate::report::{AnalysisReport, ModelReport, ReportRenderer};

/// Human-readable sectioned report
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

fn verdict_mark(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "PASS",
        Verdict::Flagged => "FLAGGED",
    }
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n=== {} ===\n\n", title));
}

fn render_model(out: &mut String, model: &ModelReport, level: f64) {
    out.push_str(&format!("{}: {}", model.name, model.formula));
    if let Some(reference) = &model.reference_level {
        out.push_str(&format!(" (reference: {})", reference));
    }
    out.push('\n');
    out.push_str(&format!(
        "{:<14} {:>10} {:>10} {:>8} {:>9} {:>10} {:>10}\n",
        "term",
        "estimate",
        "std.error",
        "t",
        "p",
        format!("{:.1}%", (1.0 - level) / 2.0 * 100.0),
        format!("{:.1}%", (1.0 + level) / 2.0 * 100.0),
    ));
    out.push_str(&format!("{}\n", "-".repeat(79)));
    for (row, ci) in model.coefficients.iter().zip(&model.intervals) {
        out.push_str(&format!(
            "{:<14} {:>10.4} {:>10.4} {:>8.3} {:>9.4} {:>10.4} {:>10.4}\n",
            row.term,
            row.estimate,
            row.std_error,
            row.t_statistic,
            row.p_value,
            ci.interval.lower,
            ci.interval.upper
        ));
    }

    let fit = &model.fit;
    out.push_str(&format!(
        "sigma = {:.4} on {} df, R² = {:.4}",
        fit.sigma, fit.df_residual, fit.r_squared
    ));
    if let (Some(f), Some(p)) = (fit.f_statistic, fit.f_p_value) {
        out.push_str(&format!(
            ", F = {:.3} on {} and {} df, p = {:.4}",
            f, fit.df_model, fit.df_residual, p
        ));
    }
    out.push_str("\n\n");
}

impl TextRenderer {
    pub fn to_text(report: &AnalysisReport) -> String {
        let level = report.config.confidence_level;
        let pct = level * 100.0;
        let mut out = String::new();

        out.push_str(&format!("Analysis of {}\n", report.input));

        section(&mut out, "Data");
        let load = &report.load;
        out.push_str(&format!(
            "rows read: {}, dropped: {}, missing cells: {}, duplicates: {}\n",
            load.rows_read, load.rows_dropped, load.missing_cells, load.duplicate_rows
        ));
        if let (Some(min), Some(max)) = (load.height_min, load.height_max) {
            out.push_str(&format!("height range: {} to {}\n", min, max));
        }
        if !load.out_of_range.is_empty() {
            out.push_str(&format!(
                "out of range rows: {:?}\n",
                load.out_of_range
            ));
        }

        section(&mut out, "Group Summary");
        out.push_str(&format!(
            "{:<8} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}\n",
            "type", "n", "mean", "sd", "min", "q1", "median", "q3", "max"
        ));
        for g in &report.groups {
            out.push_str(&format!(
                "{:<8} {:>5} {:>9.3} {:>9.3}",
                g.label, g.count, g.mean, g.sd
            ));
            if let Some(f) = report.five_number.iter().find(|f| f.label == g.label) {
                out.push_str(&format!(
                    " {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
                    f.min, f.q1, f.median, f.q3, f.max
                ));
            }
            out.push('\n');
        }

        section(&mut out, "Paired Differences (Cross - Self)");
        let d = &report.differences;
        out.push_str(&format!(
            "pairs: {}, mean: {:.4}, sd: {:.4}, se: {:.4}\n",
            d.n, d.mean, d.sd, d.se
        ));
        let rough = &report.paired_intervals.rough;
        out.push_str(&format!(
            "mean ± 2 se:      [{:.4}, {:.4}] (≈{:.1}% normal coverage)\n",
            rough.lower,
            rough.upper,
            rough.level * 100.0
        ));
        let exact = &report.paired_intervals.exact;
        out.push_str(&format!(
            "{:.0}% t interval:  [{:.4}, {:.4}]\n",
            pct, exact.lower, exact.upper
        ));
        let paired = &report.t_tests.paired;
        out.push_str(&format!(
            "paired t-test:    t = {:.4}, df = {}, p = {:.4}\n",
            paired.statistic, paired.df, paired.p_value
        ));
        let two = &report.t_tests.two_sample;
        out.push_str(&format!(
            "two-sample test:  t = {:.4}, df = {}, p = {:.4}\n",
            two.statistic, two.df, two.p_value
        ));

        section(&mut out, "Linear Models");
        for model in &report.models {
            render_model(&mut out, model, level);
        }

        section(&mut out, "Estimated Marginal Means");
        let emm = &report.emmeans;
        out.push_str(&format!(
            "{:<8} {:>10} {:>8} {:>4} {:>10} {:>10}\n",
            emm.factor, "emmean", "se", "df", "lower", "upper"
        ));
        for m in &emm.means {
            out.push_str(&format!(
                "{:<8} {:>10.4} {:>8.4} {:>4} {:>10.4} {:>10.4}\n",
                m.level, m.emmean, m.se, m.df, m.interval.lower, m.interval.upper
            ));
        }
        for c in &emm.contrasts {
            out.push_str(&format!(
                "contrast {}: {:.4} (se {:.4}), {:.0}% CI [{:.4}, {:.4}]\n",
                c.label, c.estimate, c.se, pct, c.interval.lower, c.interval.upper
            ));
        }

        section(&mut out, "Diagnostics");
        for result in &report.diagnostics.results {
            let mark = verdict_mark(result.verdict());
            match result {
                CheckResult::Normality(c) => out.push_str(&format!(
                    "normality:   {} (Shapiro-Wilk W = {:.4}, p = {:.4})\n",
                    mark, c.shapiro_wilk.statistic, c.shapiro_wilk.p_value
                )),
                CheckResult::Homogeneity(c) => out.push_str(&format!(
                    "homogeneity: {} (Breusch-Pagan = {:.4}, p = {:.4}, spread r = {:.3})\n",
                    mark,
                    c.breusch_pagan.statistic,
                    c.breusch_pagan.p_value,
                    c.breusch_pagan.spread_correlation
                )),
                CheckResult::Outliers(c) => {
                    out.push_str(&format!(
                        "outliers:    {} (Cook's distance > {:.4})\n",
                        mark, c.threshold
                    ));
                    for &i in &c.flagged {
                        out.push_str(&format!(
                            "  row {}: D = {:.4}\n",
                            i, c.cooks_distance[i]
                        ));
                    }
                }
            }
        }
        for skipped in &report.diagnostics.skipped {
            out.push_str(&format!(
                "{:<13}SKIPPED ({})\n",
                format!("{}:", skipped.check),
                skipped.reason
            ));
        }

        out
    }
}

impl ReportRenderer for TextRenderer {
    fn render(&self, report: &AnalysisReport) -> String {
        Self::to_text(report)
    }
}
