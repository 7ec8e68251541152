use ndarray::{Array2, ArrayView1};
use rand::Rng;

const LLOYD_ITERATIONS: usize = 10;

/// Lloyd k-means centres, seeded from `k` distinct rows chosen by `rng`.
/// Callers guarantee `1 <= k <= observations.nrows()`.
pub(crate) fn kmeans_centers<R: Rng>(
    observations: &Array2<f64>,
    k: usize,
    rng: &mut R,
) -> Array2<f64> {
    let n = observations.nrows();
    let d = observations.ncols();

    let mut centers = Array2::zeros((k, d));
    for (c, idx) in rand::seq::index::sample(rng, n, k).into_iter().enumerate() {
        centers.row_mut(c).assign(&observations.row(idx));
    }

    let mut assignments = vec![0usize; n];
    for _ in 0..LLOYD_ITERATIONS {
        for (i, row) in observations.rows().into_iter().enumerate() {
            assignments[i] = nearest(&centers, row);
        }

        let mut sums = Array2::<f64>::zeros((k, d));
        let mut counts = vec![0usize; k];
        for (i, row) in observations.rows().into_iter().enumerate() {
            let c = assignments[i];
            let mut target = sums.row_mut(c);
            target += &row;
            counts[c] += 1;
        }

        // Empty clusters keep their previous centre.
        for c in 0..k {
            if counts[c] > 0 {
                let mean = sums.row(c).mapv(|v| v / counts[c] as f64);
                centers.row_mut(c).assign(&mean);
            }
        }
    }

    centers
}

fn nearest(centers: &Array2<f64>, row: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, center) in centers.rows().into_iter().enumerate() {
        let dist: f64 = row
            .iter()
            .zip(center.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}
