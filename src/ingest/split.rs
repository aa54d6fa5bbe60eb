//! Edge split for link-prediction training.
//!
//! Partitions the undirected edge set into train/validation/test subsets.
//! Train edges are the positive examples (label 1); negatives are sampled
//! during training, not pre-split.

use crate::ingest::graph::Graph;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split proportions. Validation and test sizes are floors of the
/// fractions, so small graphs degrade toward all-train rather than
/// empty-train.
#[derive(Debug, Clone, Copy)]
pub struct SplitOptions {
    pub val_fraction: f32,
    pub test_fraction: f32,
    /// Shuffle seed; None draws one from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            val_fraction: 0.05,
            test_fraction: 0.10,
            seed: None,
        }
    }
}

impl SplitOptions {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            val_fraction: config.split.val_fraction,
            test_fraction: config.split.test_fraction,
            seed: config.training.seed,
        }
    }
}

/// Edge-disjoint partition of the graph's canonical edge set.
#[derive(Debug, Clone)]
pub struct EdgeSplit {
    pub train: Vec<(usize, usize)>,
    pub val: Vec<(usize, usize)>,
    pub test: Vec<(usize, usize)>,
}

impl EdgeSplit {
    pub fn total(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }
}

/// Shuffle the edge set and partition it: `val_fraction` to validation,
/// `test_fraction` to test, the remainder to train. Edges are already
/// canonical (min, max) pairs, so (u,v) and (v,u) cannot land in
/// different partitions.
pub fn random_link_split(graph: &Graph, options: &SplitOptions) -> EdgeSplit {
    let mut edges: Vec<(usize, usize)> = graph.edges().to_vec();
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    edges.shuffle(&mut rng);

    let total = edges.len();
    let val_count = (total as f32 * options.val_fraction) as usize;
    let test_count = (total as f32 * options.test_fraction) as usize;

    let val = edges[..val_count].to_vec();
    let test = edges[val_count..val_count + test_count].to_vec();
    let train = edges[val_count + test_count..].to_vec();

    log::debug!(
        "Edge split: {} train, {} val, {} test",
        train.len(),
        val.len(),
        test.len()
    );

    EdgeSplit { train, val, test }
}
