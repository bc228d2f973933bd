// Shapiro-Wilk normality test (Royston 1995, algorithm AS R94)
//
// Coefficients and the p-value use Royston's polynomial approximations,
// valid for 3 <= n <= 5000.

use crate::error::{AnalysisError, Result};
use crate::interval::standard_normal;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

pub const MAX_N: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    pub statistic: f64,
    pub p_value: f64,
}

/// One point of a normal Q-Q plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QqPoint {
    pub theoretical: f64,
    pub sample: f64,
}

/// `c[0] + c[1] x + c[2] x² + ...`
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Weights `a_i` for the pair differences `x_(n+1-i) - x_(i)`, largest first
fn coefficients(n: usize) -> Vec<f64> {
    if n == 3 {
        return vec![FRAC_1_SQRT_2];
    }

    let half = n / 2;
    let normal = standard_normal();
    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / an25))
        .collect();

    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; half];
    a[0] = a1;
    let (start, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
            / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
        .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
        (1, fac)
    };
    for i in start..half {
        a[i] = -m[i] / fac;
    }
    a
}

fn p_value(w: f64, n: usize) -> Result<f64> {
    if n == 3 {
        let pw = 6.0 / PI * (w.sqrt().asin() - PI / 3.0);
        return Ok(pw.clamp(0.0, 1.0));
    }
    if w >= 1.0 {
        return Ok(1.0);
    }

    let nf = n as f64;
    let y = (1.0 - w).ln();
    let (y, mean, sd) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return Ok(1e-99);
        }
        (-(gamma - y).ln(), poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (y, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    let dist = Normal::new(mean, sd)
        .map_err(|e| AnalysisError::invalid("residuals", e.to_string()))?;
    Ok(dist.sf(y))
}

/// Shapiro-Wilk W statistic and p-value
pub fn shapiro_wilk(sample: &[f64]) -> Result<ShapiroWilk> {
    let n = sample.len();
    if !(3..=MAX_N).contains(&n) {
        return Err(AnalysisError::invalid(
            "residuals",
            format!("Shapiro-Wilk needs 3..={} values, got {}", MAX_N, n),
        ));
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::invalid("residuals", "non-finite value"));
    }

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);

    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let range = x[n - 1] - x[0];
    if range <= f64::EPSILON * mean.abs().max(1.0) || ss <= 0.0 {
        return Err(AnalysisError::invalid(
            "residuals",
            "all values are identical",
        ));
    }

    let a = coefficients(n);
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let statistic = (numerator * numerator / ss).min(1.0);

    Ok(ShapiroWilk {
        statistic,
        p_value: p_value(statistic, n)?,
    })
}

/// Normal Q-Q coordinates: `ppoints(n)` quantiles against sorted values
pub fn qq_points(sample: &[f64]) -> Vec<QqPoint> {
    let mut sorted: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let offset = if n <= 10 { 0.375 } else { 0.5 };
    let normal = standard_normal();

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let p = (i as f64 + 1.0 - offset) / (n as f64 + 1.0 - 2.0 * offset);
            QqPoint {
                theoretical: normal.inverse_cdf(p),
                sample: value,
            }
        })
        .collect()
}
