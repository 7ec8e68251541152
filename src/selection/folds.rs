/// Folds used when a word has at least this many training sequences.
pub const DEFAULT_FOLDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Never more folds than sequences.
pub fn fold_count(num_sequences: usize) -> usize {
    num_sequences.min(DEFAULT_FOLDS)
}

/// Unshuffled K-fold over `0..num_items`: contiguous test blocks, the first
/// `num_items % k` blocks one item larger than the rest.
pub fn kfold_splits(num_items: usize, k: usize) -> Vec<Fold> {
    let k = k.min(num_items);
    if k == 0 {
        return Vec::new();
    }

    let base = num_items / k;
    let extra = num_items % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold_idx in 0..k {
        let size = base + usize::from(fold_idx < extra);
        let end = start + size;
        folds.push(Fold {
            train: (0..start).chain(end..num_items).collect(),
            test: (start..end).collect(),
        });
        start = end;
    }
    folds
}
