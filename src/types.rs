use std::collections::BTreeMap;

use ndarray::{s, Array2, ArrayView2};
use serde::Serialize;

use crate::error::SelectionError;

/// One recorded sign: an ordered list of frames, each a feature vector.
pub type Sequence = Vec<Vec<f64>>;

/// Concatenated observation rows plus the length of each original segment.
/// `lengths` always sums to the number of rows in `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct XLengths {
    x: Array2<f64>,
    lengths: Vec<usize>,
}

impl XLengths {
    pub fn new(x: Array2<f64>, lengths: Vec<usize>) -> Result<Self, SelectionError> {
        let total: usize = lengths.iter().sum();
        if total != x.nrows() {
            return Err(SelectionError::invalid_input(format!(
                "segment lengths sum to {total} but matrix has {} rows",
                x.nrows()
            )));
        }
        Ok(Self { x, lengths })
    }

    pub fn from_sequences<'a, I>(sequences: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = &'a Sequence>,
    {
        let mut width: Option<usize> = None;
        let mut flat = Vec::new();
        let mut lengths = Vec::new();
        for sequence in sequences {
            for frame in sequence {
                match width {
                    None => width = Some(frame.len()),
                    Some(w) if w != frame.len() => {
                        return Err(SelectionError::invalid_input(format!(
                            "ragged features: expected {w} columns, found {}",
                            frame.len()
                        )));
                    }
                    Some(_) => {}
                }
                flat.extend_from_slice(frame);
            }
            lengths.push(sequence.len());
        }

        let cols = width.unwrap_or(0);
        let rows: usize = lengths.iter().sum();
        let x = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| SelectionError::invalid_input(format!("observation matrix: {e}")))?;
        Ok(Self { x, lengths })
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn num_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn num_features(&self) -> usize {
        self.x.ncols()
    }

    /// Row views of each segment, in order.
    pub fn segments(&self) -> impl Iterator<Item = ArrayView2<'_, f64>> + '_ {
        self.lengths.iter().scan(0usize, move |start, &len| {
            let begin = *start;
            *start += len;
            Some(self.x.slice(s![begin..begin + len, ..]))
        })
    }
}

/// Scores of one test item against every model that could score it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoredGuess {
    pub log_likelihoods: BTreeMap<String, f64>,
    pub best_word: Option<String>,
}

/// Index-aligned recognition output: `probabilities[i]` and `guesses[i]`
/// both describe test item `i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Recognition {
    pub probabilities: Vec<BTreeMap<String, f64>>,
    pub guesses: Vec<Option<String>>,
}

impl Recognition {
    pub fn with_capacity(items: usize) -> Self {
        Self {
            probabilities: Vec::with_capacity(items),
            guesses: Vec::with_capacity(items),
        }
    }

    pub fn push(&mut self, scored: ScoredGuess) {
        self.probabilities.push(scored.log_likelihoods);
        self.guesses.push(scored.best_word);
    }

    pub fn len(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }
}
