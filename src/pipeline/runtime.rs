use std::collections::BTreeMap;

use crate::corpus::TestSet;
use crate::pipeline::traits::SequenceModel;
use crate::types::{Recognition, ScoredGuess, XLengths};

/// Selected model per word. Iteration is in word order, which also decides
/// ties between equally scoring words.
pub type WordModels = BTreeMap<String, Box<dyn SequenceModel>>;

const BEST_SCORE_SENTINEL: f64 = -1e9;

pub struct Recognizer {
    models: WordModels,
}

impl Recognizer {
    pub fn new(models: WordModels) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &WordModels {
        &self.models
    }

    pub fn recognize(&self, test_set: &TestSet) -> Recognition {
        recognize(&self.models, test_set)
    }
}

/// Scores every test item against every word model, in item order.
pub fn recognize(models: &WordModels, test_set: &TestSet) -> Recognition {
    let mut recognition = Recognition::with_capacity(test_set.num_items());
    for index in 0..test_set.num_items() {
        let scored = match test_set.item_xlengths(index) {
            Ok(data) => score_item(models, &data),
            Err(err) => {
                tracing::warn!(item = index, error = %err, "recognizer: unusable test item");
                ScoredGuess::default()
            }
        };
        tracing::debug!(
            item = index,
            scored_words = scored.log_likelihoods.len(),
            guess = scored.best_word.as_deref().unwrap_or("-"),
            "recognizer: item scored"
        );
        recognition.push(scored);
    }
    recognition
}

/// Words whose model cannot score `data` are left out of the result.
pub fn score_item(models: &WordModels, data: &XLengths) -> ScoredGuess {
    let mut log_likelihoods = BTreeMap::new();
    let mut best_score = BEST_SCORE_SENTINEL;
    let mut best_word = None;

    for (word, model) in models {
        match model.score(data) {
            Ok(log_likelihood) => {
                log_likelihoods.insert(word.clone(), log_likelihood);
                if log_likelihood > best_score {
                    best_score = log_likelihood;
                    best_word = Some(word.clone());
                }
            }
            Err(err) => {
                tracing::debug!(word = word.as_str(), error = %err, "recognizer: score failed");
            }
        }
    }

    ScoredGuess {
        log_likelihoods,
        best_word,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SelectorConfig;
    use crate::corpus::TestItem;
    use crate::error::SelectionError;
    use crate::model::GaussianHmm;
    use crate::types::Sequence;

    use super::*;

    /// Scores `per_row * rows`; fails on inputs with `fail_rows` rows.
    struct FixedModel {
        per_row: f64,
        fail_rows: Option<usize>,
    }

    impl SequenceModel for FixedModel {
        fn n_states(&self) -> usize {
            2
        }

        fn score(&self, data: &XLengths) -> Result<f64, SelectionError> {
            if self.fail_rows == Some(data.num_rows()) {
                return Err(SelectionError::score("mock failure"));
            }
            Ok(self.per_row * data.num_rows() as f64)
        }
    }

    fn model(per_row: f64, fail_rows: Option<usize>) -> Box<dyn SequenceModel> {
        Box::new(FixedModel { per_row, fail_rows })
    }

    fn item(word: &str, frames: usize) -> TestItem {
        TestItem {
            word: word.to_string(),
            sequences: vec![(0..frames).map(|t| vec![t as f64]).collect()],
        }
    }

    #[test]
    fn failing_model_is_omitted_for_that_item_only() {
        let models = WordModels::from([
            ("A".to_string(), model(-1.0, Some(1))),
            ("B".to_string(), model(-2.0, None)),
        ]);
        let test_set = TestSet::new(vec![item("A", 1), item("B", 2)]);
        let recognition = recognize(&models, &test_set);

        assert_eq!(recognition.len(), 2);
        assert_eq!(
            recognition.probabilities[0],
            BTreeMap::from([("B".to_string(), -2.0)])
        );
        assert_eq!(recognition.guesses[0].as_deref(), Some("B"));
        assert_eq!(recognition.probabilities[1].len(), 2);
        assert_eq!(recognition.guesses[1].as_deref(), Some("A"));
    }

    #[test]
    fn ties_go_to_the_earlier_word() {
        let models = WordModels::from([
            ("BLUE".to_string(), model(-1.5, None)),
            ("APPLE".to_string(), model(-1.5, None)),
        ]);
        let data = XLengths::from_sequences(&item("X", 3).sequences).unwrap();
        let scored = score_item(&models, &data);
        assert_eq!(scored.best_word.as_deref(), Some("APPLE"));
        assert_eq!(scored.log_likelihoods.len(), 2);
    }

    #[test]
    fn no_guess_when_every_model_fails() {
        let models = WordModels::from([
            ("A".to_string(), model(-1.0, Some(2))),
            ("B".to_string(), model(-1.0, Some(2))),
        ]);
        let recognition = recognize(&models, &TestSet::new(vec![item("A", 2)]));
        assert!(recognition.probabilities[0].is_empty());
        assert_eq!(recognition.guesses[0], None);
    }

    #[test]
    fn scores_below_sentinel_never_become_a_guess() {
        let models = WordModels::from([("A".to_string(), model(-1e9, None))]);
        let recognition = recognize(&models, &TestSet::new(vec![item("A", 2)]));
        assert_eq!(recognition.probabilities[0].get("A"), Some(&-2e9));
        assert_eq!(recognition.guesses[0], None);
    }

    #[test]
    fn output_is_aligned_with_test_items() {
        let models = WordModels::from([("A".to_string(), model(-1.0, None))]);
        let test_set = TestSet::new(vec![item("A", 1), item("B", 0), item("C", 4)]);
        let recognizer = Recognizer::new(models);
        let recognition = recognizer.recognize(&test_set);
        assert_eq!(recognition.probabilities.len(), test_set.num_items());
        assert_eq!(recognition.guesses.len(), test_set.num_items());
        assert_eq!(recognition.probabilities[2].get("A"), Some(&-4.0));
    }

    #[test]
    fn empty_model_map_yields_empty_guesses() {
        let recognition = recognize(&WordModels::new(), &TestSet::new(vec![item("A", 2)]));
        assert_eq!(recognition.len(), 1);
        assert!(recognition.probabilities[0].is_empty());
        assert_eq!(recognition.guesses[0], None);
    }

    fn fitted_hmm(offset: f64) -> Box<dyn SequenceModel> {
        let sequences: Vec<Sequence> = (0..3)
            .map(|s| {
                (0..8)
                    .map(|t| vec![offset + t as f64 * 0.5, offset - (s + t) as f64 * 0.25])
                    .collect()
            })
            .collect();
        let data = XLengths::from_sequences(&sequences).unwrap();
        let options = SelectorConfig::default().fit_options();
        Box::new(GaussianHmm::fit(&data, 2, &options).expect("fit"))
    }

    #[test]
    fn empty_items_get_no_scores_and_no_guess() {
        let models = WordModels::from([
            ("APPLE".to_string(), fitted_hmm(0.0)),
            ("ZEBRA".to_string(), fitted_hmm(20.0)),
        ]);
        let test_set = TestSet::new(vec![
            TestItem {
                word: "APPLE".to_string(),
                sequences: vec![Vec::new()],
            },
            TestItem {
                word: "ZEBRA".to_string(),
                sequences: Vec::new(),
            },
            TestItem {
                word: "APPLE".to_string(),
                sequences: vec![vec![vec![0.5, -0.25], vec![1.0, -0.5]]],
            },
        ]);
        let recognition = recognize(&models, &test_set);

        for index in 0..2 {
            assert!(recognition.probabilities[index].is_empty());
            assert_eq!(recognition.guesses[index], None);
        }
        assert_eq!(recognition.probabilities[2].len(), 2);
        assert_eq!(recognition.guesses[2].as_deref(), Some("APPLE"));
    }
}
