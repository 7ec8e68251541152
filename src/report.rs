use std::collections::BTreeMap;

use serde::Serialize;

use crate::corpus::TestSet;
use crate::error::SelectionError;
use crate::types::Recognition;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct RecognitionReport {
    pub schema_version: u32,
    pub meta: Meta,
    pub summary: Summary,
    pub items: Vec<ItemReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub selector: String,
    pub cv_scoring: String,
    pub min_n_components: usize,
    pub max_n_components: usize,
    pub trained_words: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub untrained_words: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: u32,
    pub correct: u32,
    pub no_guess: u32,
    pub word_error_rate: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub index: usize,
    pub label: String,
    pub guess: Option<String>,
    pub correct: bool,
    pub log_likelihoods: BTreeMap<String, f64>,
}

pub fn compute_report(
    test_set: &TestSet,
    recognition: &Recognition,
    meta: Meta,
) -> Result<RecognitionReport, SelectionError> {
    if recognition.len() != test_set.num_items() {
        return Err(SelectionError::invalid_input(format!(
            "recognition covers {} items but the test set has {}",
            recognition.len(),
            test_set.num_items()
        )));
    }

    let items: Vec<ItemReport> = recognition
        .probabilities
        .iter()
        .zip(recognition.guesses.iter())
        .enumerate()
        .map(|(index, (log_likelihoods, guess))| {
            let label = test_set.label(index).unwrap_or_default().to_string();
            ItemReport {
                index,
                correct: guess.as_deref() == Some(label.as_str()),
                label,
                guess: guess.clone(),
                log_likelihoods: log_likelihoods.clone(),
            }
        })
        .collect();

    let correct = items.iter().filter(|item| item.correct).count();
    let no_guess = items.iter().filter(|item| item.guess.is_none()).count();
    Ok(RecognitionReport {
        schema_version: SCHEMA_VERSION,
        meta,
        summary: Summary {
            total: to_u32(items.len()),
            correct: to_u32(correct),
            no_guess: to_u32(no_guess),
            word_error_rate: word_error_rate(items.len(), correct) as f32,
        },
        items,
    })
}

/// Share of items whose guess differs from the label; 0 for an empty set.
pub fn word_error_rate(total: usize, correct: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        total.saturating_sub(correct) as f64 / total as f64
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use crate::corpus::TestItem;
    use crate::types::ScoredGuess;

    use super::*;

    fn meta() -> Meta {
        Meta {
            generated_at: "2026-01-01T00:00:00Z".to_string(),
            selector: "bic".to_string(),
            cv_scoring: "training_folds".to_string(),
            min_n_components: 2,
            max_n_components: 10,
            trained_words: 2,
            untrained_words: Vec::new(),
        }
    }

    fn test_set(labels: &[&str]) -> TestSet {
        TestSet::new(
            labels
                .iter()
                .map(|label| TestItem {
                    word: label.to_string(),
                    sequences: vec![vec![vec![0.0]]],
                })
                .collect(),
        )
    }

    fn guess(word: Option<&str>) -> ScoredGuess {
        ScoredGuess {
            log_likelihoods: word
                .map(|w| BTreeMap::from([(w.to_string(), -1.0)]))
                .unwrap_or_default(),
            best_word: word.map(str::to_string),
        }
    }

    #[test]
    fn counts_errors_and_missing_guesses() {
        let mut recognition = Recognition::default();
        recognition.push(guess(Some("JOHN")));
        recognition.push(guess(Some("MARY")));
        recognition.push(guess(None));
        recognition.push(guess(Some("BOOK")));

        let report =
            compute_report(&test_set(&["JOHN", "JOHN", "BOOK", "BOOK"]), &recognition, meta())
                .unwrap();
        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.correct, 2);
        assert_eq!(report.summary.no_guess, 1);
        assert!((report.summary.word_error_rate - 0.5).abs() < 1e-6);
        assert!(!report.items[2].correct);
        assert_eq!(report.items[1].guess.as_deref(), Some("MARY"));
    }

    #[test]
    fn misaligned_recognition_is_rejected() {
        let result = compute_report(&test_set(&["A"]), &Recognition::default(), meta());
        assert!(result.is_err());
    }

    #[test]
    fn report_serializes_without_empty_untrained_list() {
        let mut recognition = Recognition::default();
        recognition.push(guess(Some("A")));
        let report = compute_report(&test_set(&["A"]), &recognition, meta()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["schema_version"], 1);
        assert!(json["meta"].get("untrained_words").is_none());
        assert_eq!(json["meta"]["cv_scoring"], "training_folds");
        assert_eq!(json["items"][0]["guess"], "A");
    }

    #[test]
    fn word_error_rate_of_empty_set_is_zero() {
        assert_eq!(word_error_rate(0, 0), 0.0);
        assert_eq!(word_error_rate(4, 1), 0.75);
    }
}
