#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Objective {
    Minimize,
    Maximize,
}

impl Objective {
    /// Strict comparison, so an equal score never displaces the incumbent
    /// and NaN never wins.
    fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BestCandidate {
    pub(crate) n_states: usize,
    pub(crate) score: f64,
}

/// Folds `(n_states, score)` pairs in the order given. Starts from
/// `(fallback_n, sentinel)`; on equal scores the earlier pair is kept.
pub(crate) fn search_best<I>(
    objective: Objective,
    sentinel: f64,
    fallback_n: usize,
    candidates: I,
) -> BestCandidate
where
    I: IntoIterator<Item = (usize, f64)>,
{
    candidates.into_iter().fold(
        BestCandidate {
            n_states: fallback_n,
            score: sentinel,
        },
        |best, (n_states, score)| {
            if objective.improves(score, best.score) {
                BestCandidate { n_states, score }
            } else {
                best
            }
        },
    )
}
