use crate::error::SelectionError;
use crate::model::GaussianHmm;
use crate::pipeline::traits::{CovarianceType, FitOptions, ModelTrainer, SequenceModel};
use crate::types::XLengths;

/// Fits a diagonal-covariance [`GaussianHmm`] with Baum-Welch.
pub struct GaussianHmmTrainer;

impl ModelTrainer for GaussianHmmTrainer {
    fn fit(
        &self,
        data: &XLengths,
        n_states: usize,
        options: &FitOptions,
    ) -> Result<Box<dyn SequenceModel>, SelectionError> {
        match options.covariance {
            CovarianceType::Diagonal => Ok(Box::new(GaussianHmm::fit(data, n_states, options)?)),
        }
    }
}
