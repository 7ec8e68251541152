use crate::error::SelectionError;
use crate::types::XLengths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CovarianceType {
    Diagonal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub covariance: CovarianceType,
    pub max_iter: usize,
    pub random_state: u64,
    /// Minimum log-likelihood gain per EM iteration before stopping early.
    pub tol: f64,
}

/// A fitted sequence model that can score observation data.
pub trait SequenceModel: Send + Sync {
    fn n_states(&self) -> usize;

    /// Total log-likelihood of every segment in `data`.
    fn score(&self, data: &XLengths) -> Result<f64, SelectionError>;
}

/// Fits a sequence model with a fixed number of hidden states.
pub trait ModelTrainer: Send + Sync {
    fn fit(
        &self,
        data: &XLengths,
        n_states: usize,
        options: &FitOptions,
    ) -> Result<Box<dyn SequenceModel>, SelectionError>;
}
