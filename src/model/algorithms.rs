//! Log-space forward/backward recursions over one segment.

use ndarray::{Array1, Array2};

/// `ln(sum(exp(values)))`, returning `-inf` when every term is `-inf`.
pub(crate) fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Forward lattice (T x N) and the segment log-likelihood.
pub(crate) fn forward(
    log_emission: &Array2<f64>,
    log_start: &Array1<f64>,
    log_transition: &Array2<f64>,
) -> (Array2<f64>, f64) {
    let t_len = log_emission.nrows();
    let n = log_start.len();
    let mut alpha = Array2::from_elem((t_len, n), f64::NEG_INFINITY);
    if t_len == 0 {
        return (alpha, 0.0);
    }

    for j in 0..n {
        alpha[[0, j]] = log_start[j] + log_emission[[0, j]];
    }

    let mut work = vec![0.0; n];
    for t in 1..t_len {
        for j in 0..n {
            for i in 0..n {
                work[i] = alpha[[t - 1, i]] + log_transition[[i, j]];
            }
            alpha[[t, j]] = log_sum_exp(&work) + log_emission[[t, j]];
        }
    }

    let last: Vec<f64> = alpha.row(t_len - 1).to_vec();
    let log_likelihood = log_sum_exp(&last);
    (alpha, log_likelihood)
}

/// Backward lattice (T x N).
pub(crate) fn backward(log_emission: &Array2<f64>, log_transition: &Array2<f64>) -> Array2<f64> {
    let t_len = log_emission.nrows();
    let n = log_transition.nrows();
    let mut beta = Array2::zeros((t_len, n));
    if t_len == 0 {
        return beta;
    }

    let mut work = vec![0.0; n];
    for t in (0..t_len - 1).rev() {
        for i in 0..n {
            for j in 0..n {
                work[j] = log_transition[[i, j]] + log_emission[[t + 1, j]] + beta[[t + 1, j]];
            }
            beta[[t, i]] = log_sum_exp(&work);
        }
    }
    beta
}

/// Expected sufficient statistics of one segment under the current parameters.
pub(crate) struct SegmentPosteriors {
    /// Posterior state occupancy (T x N), in probability space.
    pub gamma: Array2<f64>,
    /// Expected transition counts summed over the segment (N x N).
    pub xi_sum: Array2<f64>,
    pub log_likelihood: f64,
}

pub(crate) fn posteriors(
    log_emission: &Array2<f64>,
    log_start: &Array1<f64>,
    log_transition: &Array2<f64>,
) -> SegmentPosteriors {
    let t_len = log_emission.nrows();
    let n = log_start.len();
    let (alpha, log_likelihood) = forward(log_emission, log_start, log_transition);
    let beta = backward(log_emission, log_transition);

    let mut gamma = Array2::zeros((t_len, n));
    let mut xi_sum = Array2::zeros((n, n));
    if t_len == 0 || !log_likelihood.is_finite() {
        return SegmentPosteriors {
            gamma,
            xi_sum,
            log_likelihood,
        };
    }

    for t in 0..t_len {
        for j in 0..n {
            gamma[[t, j]] = (alpha[[t, j]] + beta[[t, j]] - log_likelihood).exp();
        }
    }

    for t in 0..t_len - 1 {
        for i in 0..n {
            for j in 0..n {
                let log_xi = alpha[[t, i]]
                    + log_transition[[i, j]]
                    + log_emission[[t + 1, j]]
                    + beta[[t + 1, j]]
                    - log_likelihood;
                xi_sum[[i, j]] += log_xi.exp();
            }
        }
    }

    SegmentPosteriors {
        gamma,
        xi_sum,
        log_likelihood,
    }
}
