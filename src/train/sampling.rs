//! Negative sampling: node pairs believed not to be true edges, used as
//! label-0 training examples.

use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;

/// Sample `count` node pairs uniformly at random, rejecting pairs that
/// appear in `positives` (canonical min/max order) and self-pairs.
///
/// Rejection runs under a bounded attempt budget; if a dense graph
/// exhausts it, the remaining draws accept collisions with the positive
/// set rather than looping forever. Exclusion is strongly biased, not
/// absolute, matching real-world graph sparsity assumptions.
pub fn sample_negative_pairs(
    node_count: usize,
    count: usize,
    positives: &HashSet<(usize, usize)>,
    rng: &mut StdRng,
) -> Vec<(usize, usize)> {
    if node_count < 2 {
        return Vec::new();
    }

    let budget = count.saturating_mul(20).max(100);
    let mut attempts = 0usize;
    let mut negatives = Vec::with_capacity(count);

    while negatives.len() < count {
        let u = rng.gen_range(0..node_count);
        let v = rng.gen_range(0..node_count);
        attempts += 1;
        if u == v {
            continue;
        }
        let pair = if u <= v { (u, v) } else { (v, u) };
        if attempts < budget && positives.contains(&pair) {
            continue;
        }
        negatives.push(pair);
    }

    negatives
}
