//! Pair scoring: embeddings to edge-existence logits.
//!
//! The decoder has no learnable parameters and stays in logit space;
//! the sigmoid squash happens only at the consumption boundary (training
//! loss, inference probability) for numerically stable loss computation.

use ndarray::Array2;

/// Dot-product compatibility score for each requested pair. Symmetric in
/// the pair order; unbounded real-valued output.
pub fn decode(embeddings: &Array2<f32>, pairs: &[(usize, usize)]) -> Vec<f32> {
    pairs
        .iter()
        .map(|&(u, v)| {
            embeddings
                .row(u)
                .iter()
                .zip(embeddings.row(v).iter())
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Logistic squash applied where a score becomes a probability.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
