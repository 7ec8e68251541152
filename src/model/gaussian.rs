use std::f64::consts::PI;

use ndarray::{Array1, ArrayView1};

/// Gaussian emission with a diagonal covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalGaussian {
    pub mean: Array1<f64>,
    pub variance: Array1<f64>,
    log_norm: f64,
}

impl DiagonalGaussian {
    pub fn new(mean: Array1<f64>, variance: Array1<f64>) -> Self {
        let d = mean.len() as f64;
        let log_det: f64 = variance.iter().map(|v| v.ln()).sum();
        let log_norm = -0.5 * (d * (2.0 * PI).ln() + log_det);
        Self {
            mean,
            variance,
            log_norm,
        }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn log_pdf(&self, x: ArrayView1<'_, f64>) -> f64 {
        let quad: f64 = x
            .iter()
            .zip(self.mean.iter())
            .zip(self.variance.iter())
            .map(|((&xi, &mu), &var)| {
                let diff = xi - mu;
                diff * diff / var
            })
            .sum();
        self.log_norm - 0.5 * quad
    }

    pub fn is_valid(&self) -> bool {
        self.mean.len() == self.variance.len()
            && self.mean.iter().all(|m| m.is_finite())
            && self.variance.iter().all(|v| v.is_finite() && *v > 0.0)
    }
}
