pub mod config;
pub mod corpus;
pub mod error;
mod model;
pub mod pipeline;
pub mod report;
pub mod selection;
pub mod types;

pub use config::{CvScoring, SelectorConfig};
pub use corpus::{combine_sequences, TestItem, TestSet, WordCorpus};
pub use error::SelectionError;
pub use model::{DiagonalGaussian, GaussianHmm, MIN_COVAR};
pub use pipeline::builder::{TrainedModels, WordModelsBuilder};
pub use pipeline::defaults::GaussianHmmTrainer;
pub use pipeline::runtime::{recognize, Recognizer, WordModels};
pub use pipeline::traits::{CovarianceType, FitOptions, ModelTrainer, SequenceModel};
pub use report::{compute_report, Meta, RecognitionReport};
pub use selection::{ModelSelector, SelectorKind};
pub use types::{Recognition, ScoredGuess, Sequence, XLengths};
