// Leverage, studentised residuals and Cook's distance

use crate::model::LinearModel;
use serde::Serialize;

/// Per-observation quantities shared by every diagnostic check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDiagnostics {
    pub residuals: Vec<f64>,
    pub fitted: Vec<f64>,
    /// Hat-matrix diagonal `x_i' (X'X)^-1 x_i`
    pub leverage: Vec<f64>,
    /// Internally studentised residuals `e_i / (sigma * sqrt(1 - h_i))`
    pub studentized: Vec<f64>,
    /// NaN where `h_i` is 1 (the observation fully determines its fit)
    pub cooks_distance: Vec<f64>,
}

impl ModelDiagnostics {
    pub fn compute(model: &LinearModel) -> Self {
        let sigma = model.sigma();
        let p = model.n_params() as f64;
        let design = model.design();
        let projected = design * model.xtx_inverse();

        let leverage: Vec<f64> = (0..model.n_obs())
            .map(|i| projected.row(i).dot(&design.row(i)))
            .collect();

        let (studentized, cooks_distance) = model
            .residuals()
            .iter()
            .zip(&leverage)
            .map(|(&e, &h)| {
                let one_minus_h = 1.0 - h;
                if one_minus_h <= 1e-12 {
                    return (f64::NAN, f64::NAN);
                }
                let r = e / (sigma * one_minus_h.sqrt());
                (r, r * r * h / (p * one_minus_h))
            })
            .unzip();

        Self {
            residuals: model.residuals().to_vec(),
            fitted: model.fitted().to_vec(),
            leverage,
            studentized,
            cooks_distance,
        }
    }

    pub fn len(&self) -> usize {
        self.residuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residuals.is_empty()
    }
}
