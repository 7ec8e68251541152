mod algorithms;
mod gaussian;
mod hmm;
mod kmeans;

pub use gaussian::DiagonalGaussian;
pub use hmm::{GaussianHmm, MIN_COVAR};
