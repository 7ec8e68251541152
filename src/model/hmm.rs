//! Gaussian hidden Markov model with diagonal covariances.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::algorithms::{forward, posteriors};
use super::gaussian::DiagonalGaussian;
use super::kmeans::kmeans_centers;
use crate::error::SelectionError;
use crate::pipeline::traits::{FitOptions, SequenceModel};
use crate::types::XLengths;

/// Variance floor, also added to the initial per-feature variance.
pub const MIN_COVAR: f64 = 1e-3;
const SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianHmm {
    start: Array1<f64>,
    transition: Array2<f64>,
    emissions: Vec<DiagonalGaussian>,
}

impl GaussianHmm {
    pub fn from_parts(
        start: Array1<f64>,
        transition: Array2<f64>,
        emissions: Vec<DiagonalGaussian>,
    ) -> Result<Self, SelectionError> {
        let model = Self {
            start,
            transition,
            emissions,
        };
        model
            .check_params()
            .map_err(SelectionError::invalid_input)?;
        Ok(model)
    }

    pub fn n_features(&self) -> usize {
        self.emissions.first().map(DiagonalGaussian::dim).unwrap_or(0)
    }

    pub fn start_probs(&self) -> &Array1<f64> {
        &self.start
    }

    pub fn transition_matrix(&self) -> &Array2<f64> {
        &self.transition
    }

    pub fn emissions(&self) -> &[DiagonalGaussian] {
        &self.emissions
    }

    /// Baum-Welch over every segment of `data`.
    pub fn fit(
        data: &XLengths,
        n_states: usize,
        options: &FitOptions,
    ) -> Result<Self, SelectionError> {
        let x = data.x();
        if n_states == 0 {
            return Err(SelectionError::fit(n_states, "at least one state is required"));
        }
        if data.num_features() == 0 {
            return Err(SelectionError::fit(n_states, "observations have no features"));
        }
        if data.num_rows() < n_states {
            return Err(SelectionError::fit(
                n_states,
                format!(
                    "n_samples={} should be >= n_components={n_states}",
                    data.num_rows()
                ),
            ));
        }

        let mut model = Self::initial(x, n_states, options.random_state);
        let mut prev_ll = f64::NEG_INFINITY;
        for iter in 0..options.max_iter {
            let (stats, ll) = model.accumulate(data);
            if !ll.is_finite() {
                return Err(SelectionError::fit(
                    n_states,
                    format!("non-finite log-likelihood at iteration {iter}"),
                ));
            }
            model.maximize(&stats);
            model
                .check_params()
                .map_err(|message| SelectionError::fit(n_states, message))?;

            if ll - prev_ll < options.tol {
                tracing::trace!(
                    n_states,
                    iterations = iter + 1,
                    log_likelihood = ll,
                    "hmm: converged"
                );
                break;
            }
            prev_ll = ll;
        }

        Ok(model)
    }

    fn initial(x: &Array2<f64>, n_states: usize, random_state: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(random_state);
        let centers = kmeans_centers(x, n_states, &mut rng);
        let variance = x.var_axis(Axis(0), 0.0).mapv(|v| v + MIN_COVAR);

        let uniform = 1.0 / n_states as f64;
        Self {
            start: Array1::from_elem(n_states, uniform),
            transition: Array2::from_elem((n_states, n_states), uniform),
            emissions: centers
                .rows()
                .into_iter()
                .map(|center| DiagonalGaussian::new(center.to_owned(), variance.clone()))
                .collect(),
        }
    }

    fn log_emission(&self, segment: ArrayView2<'_, f64>) -> Array2<f64> {
        let mut out = Array2::zeros((segment.nrows(), self.n_states()));
        for (t, row) in segment.rows().into_iter().enumerate() {
            for (j, emission) in self.emissions.iter().enumerate() {
                out[[t, j]] = emission.log_pdf(row);
            }
        }
        out
    }

    fn log_params(&self) -> (Array1<f64>, Array2<f64>) {
        (self.start.mapv(f64::ln), self.transition.mapv(f64::ln))
    }

    fn accumulate(&self, data: &XLengths) -> (SufficientStats, f64) {
        let n = self.n_states();
        let d = self.n_features();
        let (log_start, log_transition) = self.log_params();
        let mut stats = SufficientStats::zeros(n, d);
        let mut total_ll = 0.0;

        for segment in data.segments() {
            if segment.nrows() == 0 {
                continue;
            }
            let log_emission = self.log_emission(segment);
            let post = posteriors(&log_emission, &log_start, &log_transition);
            total_ll += post.log_likelihood;
            if !post.log_likelihood.is_finite() {
                continue;
            }

            stats.start += &post.gamma.row(0);
            stats.transitions += &post.xi_sum;
            stats.occupancy += &post.gamma.sum_axis(Axis(0));
            for (t, frame) in segment.rows().into_iter().enumerate() {
                for j in 0..n {
                    let w = post.gamma[[t, j]];
                    for k in 0..d {
                        let v = frame[k];
                        stats.obs[[j, k]] += w * v;
                        stats.obs_sq[[j, k]] += w * v * v;
                    }
                }
            }
        }

        (stats, total_ll)
    }

    fn maximize(&mut self, stats: &SufficientStats) {
        self.start = normalize(&stats.start);
        for (i, row) in stats.transitions.rows().into_iter().enumerate() {
            self.transition.row_mut(i).assign(&normalize(&row.to_owned()));
        }

        for (j, emission) in self.emissions.iter_mut().enumerate() {
            let denom = stats.occupancy[j];
            let mean = stats.obs.row(j).mapv(|v| v / denom);
            let variance = Array1::from_iter(
                stats
                    .obs_sq
                    .row(j)
                    .iter()
                    .zip(mean.iter())
                    .map(|(&sq, &mu)| (sq / denom - mu * mu).max(MIN_COVAR)),
            );
            *emission = DiagonalGaussian::new(mean, variance);
        }
    }

    fn check_params(&self) -> Result<(), String> {
        let n = self.start.len();
        if n == 0 || self.transition.dim() != (n, n) || self.emissions.len() != n {
            return Err(format!(
                "inconsistent shapes: start={n}, transition={:?}, emissions={}",
                self.transition.dim(),
                self.emissions.len()
            ));
        }
        if (self.start.sum() - 1.0).abs() > SUM_TOLERANCE {
            return Err("start probabilities must sum to 1.0".to_string());
        }
        for (i, row) in self.transition.rows().into_iter().enumerate() {
            if (row.sum() - 1.0).abs() > SUM_TOLERANCE {
                return Err(format!("transition row {i} must sum to 1.0"));
            }
        }
        let d = self.n_features();
        if let Some(j) = self
            .emissions
            .iter()
            .position(|e| e.dim() != d || !e.is_valid())
        {
            return Err(format!("emission for state {j} is degenerate"));
        }
        Ok(())
    }
}

impl SequenceModel for GaussianHmm {
    fn n_states(&self) -> usize {
        self.start.len()
    }

    fn score(&self, data: &XLengths) -> Result<f64, SelectionError> {
        if data.num_rows() == 0 || data.lengths().contains(&0) {
            return Err(SelectionError::score(format!(
                "cannot score empty data (segment lengths {:?})",
                data.lengths()
            )));
        }
        if data.num_features() != self.n_features() {
            return Err(SelectionError::score(format!(
                "expected {} features, found {}",
                self.n_features(),
                data.num_features()
            )));
        }
        self.check_params().map_err(SelectionError::score)?;

        let (log_start, log_transition) = self.log_params();
        let mut total = 0.0;
        for segment in data.segments() {
            let (_, ll) = forward(&self.log_emission(segment), &log_start, &log_transition);
            total += ll;
        }
        if !total.is_finite() {
            return Err(SelectionError::score(format!(
                "non-finite log-likelihood {total}"
            )));
        }
        Ok(total)
    }
}

struct SufficientStats {
    start: Array1<f64>,
    transitions: Array2<f64>,
    occupancy: Array1<f64>,
    obs: Array2<f64>,
    obs_sq: Array2<f64>,
}

impl SufficientStats {
    fn zeros(n: usize, d: usize) -> Self {
        Self {
            start: Array1::zeros(n),
            transitions: Array2::zeros((n, n)),
            occupancy: Array1::zeros(n),
            obs: Array2::zeros((n, d)),
            obs_sq: Array2::zeros((n, d)),
        }
    }
}

/// Scales to sum 1; an all-zero vector stays zero.
fn normalize(values: &Array1<f64>) -> Array1<f64> {
    let sum = values.sum();
    if sum == 0.0 {
        values.clone()
    } else {
        values.mapv(|v| v / sum)
    }
}
