use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SelectionError;
use crate::types::{Sequence, XLengths};

#[derive(Debug, Clone)]
struct WordEntry {
    sequences: Vec<Sequence>,
    flattened: XLengths,
}

/// Training sequences for every vocabulary word, ordered by word.
#[derive(Debug, Clone, Default)]
pub struct WordCorpus {
    words: BTreeMap<String, WordEntry>,
}

impl WordCorpus {
    pub fn new(sequences_by_word: BTreeMap<String, Vec<Sequence>>) -> Result<Self, SelectionError> {
        let mut words = BTreeMap::new();
        for (word, sequences) in sequences_by_word {
            let flattened = XLengths::from_sequences(&sequences).map_err(|e| {
                SelectionError::invalid_input(format!("word '{word}': {e}"))
            })?;
            words.insert(
                word,
                WordEntry {
                    sequences,
                    flattened,
                },
            );
        }
        Ok(Self { words })
    }

    pub fn load(path: &Path) -> Result<Self, SelectionError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SelectionError::io("read training corpus", e))?;
        let raw: BTreeMap<String, Vec<Sequence>> = serde_json::from_str(&data)
            .map_err(|e| SelectionError::json("parse training corpus", e))?;
        Self::new(raw)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.keys().map(String::as_str)
    }

    pub fn sequences_for(&self, word: &str) -> Option<&[Sequence]> {
        self.words.get(word).map(|entry| entry.sequences.as_slice())
    }

    pub fn flattened_for(&self, word: &str) -> Option<&XLengths> {
        self.words.get(word).map(|entry| &entry.flattened)
    }

    /// Every word with its flattened data, in word order.
    pub fn flattened(&self) -> impl Iterator<Item = (&str, &XLengths)> + '_ {
        self.words
            .iter()
            .map(|(word, entry)| (word.as_str(), &entry.flattened))
    }
}

/// Concatenates the sequences at `indices` (in the given order).
pub fn combine_sequences(
    indices: &[usize],
    sequences: &[Sequence],
) -> Result<XLengths, SelectionError> {
    let selected = indices
        .iter()
        .map(|&idx| {
            sequences.get(idx).ok_or_else(|| {
                SelectionError::invalid_input(format!(
                    "sequence index {idx} out of range for {} sequences",
                    sequences.len()
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    XLengths::from_sequences(selected)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestItem {
    pub word: String,
    pub sequences: Vec<Sequence>,
}

/// Labelled test items. Labels are ground truth for reporting only.
#[derive(Debug, Clone, Default)]
pub struct TestSet {
    items: Vec<TestItem>,
}

impl TestSet {
    pub fn new(items: Vec<TestItem>) -> Self {
        Self { items }
    }

    pub fn load(path: &Path) -> Result<Self, SelectionError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SelectionError::io("read test set", e))?;
        let items: Vec<TestItem> =
            serde_json::from_str(&data).map_err(|e| SelectionError::json("parse test set", e))?;
        Ok(Self::new(items))
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|item| item.word.as_str())
    }

    pub fn item_sequences(&self, index: usize) -> Option<&[Sequence]> {
        self.items.get(index).map(|item| item.sequences.as_slice())
    }

    pub fn item_xlengths(&self, index: usize) -> Result<XLengths, SelectionError> {
        let sequences = self.item_sequences(index).ok_or_else(|| {
            SelectionError::invalid_input(format!(
                "test item {index} out of range for {} items",
                self.items.len()
            ))
        })?;
        XLengths::from_sequences(sequences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(values: &[f64]) -> Sequence {
        values.iter().map(|&v| vec![v, v * 2.0]).collect()
    }

    #[test]
    fn corpus_flattens_each_word() {
        let corpus = WordCorpus::new(BTreeMap::from([
            ("BOOK".to_string(), vec![sequence(&[1.0, 2.0]), sequence(&[3.0])]),
            ("ARRIVE".to_string(), vec![sequence(&[4.0, 5.0, 6.0])]),
        ]))
        .unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.words().collect::<Vec<_>>(), vec!["ARRIVE", "BOOK"]);
        let book = corpus.flattened_for("BOOK").unwrap();
        assert_eq!(book.lengths(), &[2, 1]);
        assert_eq!(book.num_features(), 2);
        assert_eq!(corpus.sequences_for("BOOK").unwrap().len(), 2);
        assert!(corpus.flattened_for("MISSING").is_none());
    }

    #[test]
    fn corpus_rejects_ragged_word() {
        let ragged = vec![vec![vec![1.0, 2.0], vec![3.0]]];
        let result = WordCorpus::new(BTreeMap::from([("BAD".to_string(), ragged)]));
        assert!(result.is_err());
    }

    #[test]
    fn combine_sequences_uses_requested_order() {
        let sequences = vec![sequence(&[1.0]), sequence(&[2.0, 2.5]), sequence(&[3.0])];
        let combined = combine_sequences(&[2, 0], &sequences).unwrap();
        assert_eq!(combined.lengths(), &[1, 1]);
        assert_eq!(combined.x()[[0, 0]], 3.0);
        assert_eq!(combined.x()[[1, 0]], 1.0);
        assert!(combine_sequences(&[5], &sequences).is_err());
    }

    #[test]
    fn test_set_parses_json_items() {
        let json = r#"[
            {"word": "JOHN", "sequences": [[[0.5, 1.0], [0.25, 2.0]]]},
            {"word": "MARY", "sequences": [[[1.5, 0.0]]]}
        ]"#;
        let items: Vec<TestItem> = serde_json::from_str(json).expect("valid test set json");
        let test_set = TestSet::new(items);
        assert_eq!(test_set.num_items(), 2);
        assert_eq!(test_set.label(1), Some("MARY"));
        let data = test_set.item_xlengths(0).unwrap();
        assert_eq!(data.lengths(), &[2]);
        assert!(test_set.item_xlengths(2).is_err());
    }
}
