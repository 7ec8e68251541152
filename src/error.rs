use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("fit failed for {n_states} states: {message}")]
    Fit { n_states: usize, message: String },
    #[error("score failed: {message}")]
    Score { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl SelectionError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn fit(n_states: usize, message: impl Into<String>) -> Self {
        Self::Fit {
            n_states,
            message: message.into(),
        }
    }

    pub(crate) fn score(message: impl Into<String>) -> Self {
        Self::Score {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Fit and score failures are expected outcomes of a search; everything
    /// else means the caller handed over bad data.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Fit { .. } | Self::Score { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_and_score_are_recoverable() {
        assert!(SelectionError::fit(3, "singular covariance").is_recoverable());
        assert!(SelectionError::score("width mismatch").is_recoverable());
        assert!(!SelectionError::invalid_input("ragged rows").is_recoverable());
    }

    #[test]
    fn fit_error_message_names_state_count() {
        let err = SelectionError::fit(4, "too few rows");
        assert_eq!(err.to_string(), "fit failed for 4 states: too few rows");
    }
}
