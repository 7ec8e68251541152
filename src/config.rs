use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;
use crate::pipeline::traits::{CovarianceType, FitOptions};

/// Which sequences the CV strategy scores each fold's candidate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvScoring {
    /// Score against the same sequences the fold was trained on.
    #[default]
    TrainingFolds,
    /// Score against the fold's held-out sequences.
    HeldOut,
}

impl CvScoring {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TrainingFolds => "training_folds",
            Self::HeldOut => "held_out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub n_constant: usize,
    pub min_n_components: usize,
    pub max_n_components: usize,
    pub random_state: u64,
    pub max_iter: usize,
    pub tol: f64,
    pub cv_scoring: CvScoring,
}

impl SelectorConfig {
    pub const DEFAULT_N_CONSTANT: usize = 3;
    pub const DEFAULT_MIN_N_COMPONENTS: usize = 2;
    pub const DEFAULT_MAX_N_COMPONENTS: usize = 10;
    pub const DEFAULT_RANDOM_STATE: u64 = 14;
    pub const DEFAULT_MAX_ITER: usize = 1000;
    pub const DEFAULT_TOL: f64 = 1e-2;

    pub fn load(path: &Path) -> Result<Self, SelectionError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SelectionError::io("read selector config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| SelectionError::json("parse selector config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.min_n_components == 0 {
            return Err(SelectionError::invalid_input(
                "min_n_components must be at least 1",
            ));
        }
        if self.min_n_components > self.max_n_components {
            return Err(SelectionError::invalid_input(format!(
                "empty search range: min_n_components={} > max_n_components={}",
                self.min_n_components, self.max_n_components
            )));
        }
        if self.max_iter == 0 {
            return Err(SelectionError::invalid_input("max_iter must be at least 1"));
        }
        Ok(())
    }

    pub fn search_range(&self) -> RangeInclusive<usize> {
        self.min_n_components..=self.max_n_components
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            covariance: CovarianceType::Diagonal,
            max_iter: self.max_iter,
            random_state: self.random_state,
            tol: self.tol,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            n_constant: Self::DEFAULT_N_CONSTANT,
            min_n_components: Self::DEFAULT_MIN_N_COMPONENTS,
            max_n_components: Self::DEFAULT_MAX_N_COMPONENTS,
            random_state: Self::DEFAULT_RANDOM_STATE,
            max_iter: Self::DEFAULT_MAX_ITER,
            tol: Self::DEFAULT_TOL,
            cv_scoring: CvScoring::default(),
        }
    }
}
