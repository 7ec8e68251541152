use std::str::FromStr;

use crate::config::{CvScoring, SelectorConfig};
use crate::corpus::{combine_sequences, WordCorpus};
use crate::error::SelectionError;
use crate::pipeline::traits::{FitOptions, ModelTrainer, SequenceModel};
use crate::types::{Sequence, XLengths};

pub mod criteria;
pub mod folds;
mod search;

use folds::{fold_count, kfold_splits, Fold};
use search::{search_best, Objective};

/// How a selector picks the hidden-state count for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// Always `n_constant`, no search.
    Constant,
    /// Lowest Bayesian Information Criterion.
    Bic,
    /// Highest Discriminative Information Criterion.
    Dic,
    /// Highest mean cross-validated log-likelihood.
    Cv,
}

impl SelectorKind {
    pub const ALL: [Self; 4] = [Self::Constant, Self::Bic, Self::Dic, Self::Cv];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Bic => "bic",
            Self::Dic => "dic",
            Self::Cv => "cv",
        }
    }
}

impl FromStr for SelectorKind {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SelectionError::invalid_input(format!("unknown selector '{s}'")))
    }
}

/// One word's selection run: its training data, the shared corpus (for DIC),
/// the search range and the trainer.
pub struct ModelSelector<'a> {
    corpus: &'a WordCorpus,
    word: &'a str,
    sequences: &'a [Sequence],
    data: &'a XLengths,
    config: &'a SelectorConfig,
    trainer: &'a dyn ModelTrainer,
    fit_options: FitOptions,
}

impl<'a> ModelSelector<'a> {
    pub fn new(
        corpus: &'a WordCorpus,
        word: &'a str,
        config: &'a SelectorConfig,
        trainer: &'a dyn ModelTrainer,
    ) -> Result<Self, SelectionError> {
        config.validate()?;
        let (Some(sequences), Some(data)) = (corpus.sequences_for(word), corpus.flattened_for(word))
        else {
            return Err(SelectionError::invalid_input(format!(
                "word '{word}' is not in the training corpus"
            )));
        };
        Ok(Self {
            corpus,
            word,
            sequences,
            data,
            config,
            trainer,
            fit_options: config.fit_options(),
        })
    }

    pub fn word(&self) -> &str {
        self.word
    }

    /// Trains on the word's full data. Fit failures become `None`.
    pub fn base_model(&self, n_states: usize) -> Option<Box<dyn SequenceModel>> {
        match self.fit(self.data, n_states) {
            Ok(model) => {
                tracing::debug!(word = self.word, n_states, "selection: model created");
                Some(model)
            }
            Err(err) => {
                tracing::debug!(
                    word = self.word,
                    n_states,
                    error = %err,
                    "selection: base model failed"
                );
                None
            }
        }
    }

    pub fn select(&self, kind: SelectorKind) -> Option<Box<dyn SequenceModel>> {
        let best_n = match kind {
            SelectorKind::Constant => return self.base_model(self.config.n_constant),
            SelectorKind::Bic => {
                self.search(kind, Objective::Minimize, criteria::BIC_SENTINEL, |n| {
                    self.bic_score(n)
                })
            }
            SelectorKind::Dic => {
                self.search(kind, Objective::Maximize, criteria::DIC_SENTINEL, |n| {
                    self.dic_score(n)
                })
            }
            SelectorKind::Cv => {
                self.search(kind, Objective::Maximize, criteria::CV_SENTINEL, |n| {
                    self.cv_score(n)
                })
            }
        };
        self.base_model(best_n)
    }

    fn fit(
        &self,
        data: &XLengths,
        n_states: usize,
    ) -> Result<Box<dyn SequenceModel>, SelectionError> {
        self.trainer.fit(data, n_states, &self.fit_options)
    }

    /// Scans the configured range in ascending order; a candidate whose score
    /// fails is skipped. Returns the winning state count, or the range
    /// minimum when nothing beats the sentinel.
    fn search<F>(&self, kind: SelectorKind, objective: Objective, sentinel: f64, score: F) -> usize
    where
        F: Fn(usize) -> Result<f64, SelectionError>,
    {
        let candidates = self
            .config
            .search_range()
            .filter_map(|n_states| match score(n_states) {
                Ok(value) => {
                    tracing::debug!(
                        word = self.word,
                        selector = kind.as_str(),
                        n_states,
                        score = value,
                        "selection: candidate scored"
                    );
                    Some((n_states, value))
                }
                Err(err) => {
                    tracing::debug!(
                        word = self.word,
                        selector = kind.as_str(),
                        n_states,
                        error = %err,
                        "selection: candidate skipped"
                    );
                    None
                }
            });

        let best = search_best(objective, sentinel, self.config.min_n_components, candidates);
        tracing::debug!(
            word = self.word,
            selector = kind.as_str(),
            best_n = best.n_states,
            best_score = best.score,
            "selection: search finished"
        );
        best.n_states
    }

    fn bic_score(&self, n_states: usize) -> Result<f64, SelectionError> {
        let candidate = self.fit(self.data, n_states)?;
        let log_likelihood = candidate.score(self.data)?;
        let total_frames: usize = self.data.lengths().iter().sum();
        Ok(criteria::bic(
            log_likelihood,
            n_states,
            total_frames,
            self.data.num_rows(),
        ))
    }

    /// Any other word failing to score fails the whole candidate.
    fn dic_score(&self, n_states: usize) -> Result<f64, SelectionError> {
        let candidate = self.fit(self.data, n_states)?;
        let log_likelihood = candidate.score(self.data)?;
        let others = self
            .corpus
            .flattened()
            .filter(|(word, _)| *word != self.word)
            .map(|(_, data)| candidate.score(data))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(criteria::dic(log_likelihood, &others))
    }

    /// Mean log-likelihood over the folds that produced a score.
    fn cv_score(&self, n_states: usize) -> Result<f64, SelectionError> {
        let folds = kfold_splits(self.sequences.len(), fold_count(self.sequences.len()));
        let mut scores = Vec::with_capacity(folds.len());
        for (fold_idx, fold) in folds.iter().enumerate() {
            let train = combine_sequences(&fold.train, self.sequences)?;
            if train.num_rows() < n_states {
                continue;
            }
            match self.cv_fold_score(fold, &train, n_states) {
                Ok(score) => scores.push(score),
                Err(err) => tracing::debug!(
                    word = self.word,
                    n_states,
                    fold = fold_idx,
                    error = %err,
                    "selection: cv fold skipped"
                ),
            }
        }

        if scores.is_empty() {
            return Err(SelectionError::fit(
                n_states,
                format!("no cross-validation fold produced a score for '{}'", self.word),
            ));
        }
        Ok(criteria::mean(&scores))
    }

    fn cv_fold_score(
        &self,
        fold: &Fold,
        train: &XLengths,
        n_states: usize,
    ) -> Result<f64, SelectionError> {
        let scoring_indices = match self.config.cv_scoring {
            CvScoring::TrainingFolds => &fold.train,
            CvScoring::HeldOut => &fold.test,
        };
        let scoring = combine_sequences(scoring_indices, self.sequences)?;
        let candidate = self.fit(train, n_states)?;
        candidate.score(&scoring)
    }
}
