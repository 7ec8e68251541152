//! Per-candidate scoring rules and the starting scores each search improves on.

/// Lower is better; any real BIC should beat this.
pub(crate) const BIC_SENTINEL: f64 = 1e8;
pub(crate) const DIC_SENTINEL: f64 = -1e8;
pub(crate) const CV_SENTINEL: f64 = -1e5;

/// `p = n^2 + 2*n*T - 1`, with `T` the total frame count.
pub fn free_parameters(n_states: usize, total_frames: usize) -> f64 {
    (n_states * n_states + 2 * n_states * total_frames).saturating_sub(1) as f64
}

/// `BIC = -2 * logL + p * ln(N)`, with `N` the number of observation rows.
pub fn bic(log_likelihood: f64, n_states: usize, total_frames: usize, num_rows: usize) -> f64 {
    -2.0 * log_likelihood + free_parameters(n_states, total_frames) * (num_rows as f64).ln()
}

/// `DIC = logL - mean(other words' logL)`. NaN when there are no other words.
pub fn dic(log_likelihood: f64, other_log_likelihoods: &[f64]) -> f64 {
    log_likelihood - mean(other_log_likelihoods)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
