use crate::config::SelectorConfig;
use crate::corpus::WordCorpus;
use crate::error::SelectionError;
use crate::pipeline::defaults::GaussianHmmTrainer;
use crate::pipeline::runtime::{Recognizer, WordModels};
use crate::pipeline::traits::ModelTrainer;
use crate::selection::{ModelSelector, SelectorKind};

/// Per-word models plus the words for which no state count could be trained.
pub struct TrainedModels {
    pub models: WordModels,
    pub untrained: Vec<String>,
}

pub struct WordModelsBuilder {
    config: SelectorConfig,
    selector: SelectorKind,
    trainer: Option<Box<dyn ModelTrainer>>,
    words: Option<Vec<String>>,
}

impl WordModelsBuilder {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            selector: SelectorKind::Constant,
            trainer: None,
            words: None,
        }
    }

    pub fn with_selector(mut self, selector: SelectorKind) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_trainer(mut self, trainer: Box<dyn ModelTrainer>) -> Self {
        self.trainer = Some(trainer);
        self
    }

    /// Restricts training to these words (default: every corpus word).
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words = Some(words.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self, corpus: &WordCorpus) -> Result<TrainedModels, SelectionError> {
        self.build_with_progress(corpus, |_, _| {})
    }

    /// `on_word` runs after each word with the selected state count, if any.
    pub fn build_with_progress<F>(
        self,
        corpus: &WordCorpus,
        mut on_word: F,
    ) -> Result<TrainedModels, SelectionError>
    where
        F: FnMut(&str, Option<usize>),
    {
        self.config.validate()?;
        let words: Vec<String> = match self.words {
            Some(words) => {
                if let Some(missing) = words.iter().find(|word| !corpus.contains(word)) {
                    return Err(SelectionError::invalid_input(format!(
                        "word '{missing}' is not in the training corpus"
                    )));
                }
                words
            }
            None => corpus.words().map(str::to_string).collect(),
        };
        let trainer = self.trainer.unwrap_or_else(|| Box::new(GaussianHmmTrainer));

        let mut models = WordModels::new();
        let mut untrained = Vec::new();
        for word in words {
            let selector = ModelSelector::new(corpus, &word, &self.config, &*trainer)?;
            match selector.select(self.selector) {
                Some(model) => {
                    let n_states = model.n_states();
                    tracing::info!(
                        word = selector.word(),
                        selector = self.selector.as_str(),
                        n_states,
                        "training: model selected"
                    );
                    on_word(&word, Some(n_states));
                    models.insert(word, model);
                }
                None => {
                    tracing::warn!(
                        word = selector.word(),
                        selector = self.selector.as_str(),
                        "training: no model could be trained"
                    );
                    on_word(&word, None);
                    untrained.push(word);
                }
            }
        }

        Ok(TrainedModels { models, untrained })
    }

    pub fn build_recognizer(self, corpus: &WordCorpus) -> Result<Recognizer, SelectionError> {
        Ok(Recognizer::new(self.build(corpus)?.models))
    }
}
