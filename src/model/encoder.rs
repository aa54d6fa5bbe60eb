//! Two-layer message-passing encoder: node features + connectivity to
//! low-dimensional node embeddings.
//!
//! Aggregation contract: self-loops are added, then every node averages
//! its own and its neighbors' projected feature vectors with symmetric
//! degree normalization — the (u, v) coefficient is
//! `1 / sqrt((deg(u) + 1) * (deg(v) + 1))`. Consistently relabeling all
//! nodes permutes the embedding rows the same way and changes nothing
//! else.

use crate::ingest::graph::Graph;
use crate::ingest::FeatureMatrix;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;

/// Encoder dimensions, fixed at training time.
#[derive(Debug, Clone, Copy)]
pub struct EncoderConfig {
    pub input_dim: usize,
    pub hidden_dim: usize,
    pub embedding_dim: usize,
}

impl EncoderConfig {
    pub fn new(input_dim: usize, hidden_dim: usize, embedding_dim: usize) -> Self {
        Self {
            input_dim,
            hidden_dim,
            embedding_dim,
        }
    }
}

/// Two linear layers; the non-linearity and aggregation live in the
/// forward pass. Layer 1 maps feature space to the hidden dimension with
/// a rectified-linear activation after aggregation; layer 2 maps hidden
/// to the embedding dimension with no output activation.
#[derive(Debug, Clone)]
pub struct Encoder {
    pub(crate) w1: Array2<f32>,
    pub(crate) w2: Array2<f32>,
}

/// Intermediate activations of one forward pass, kept for backprop.
pub(crate) struct EncodeTrace {
    /// Aggregated input: P · X
    pub px: Array2<f32>,
    /// Layer-1 pre-activation: P · X · W1
    pub s1: Array2<f32>,
    /// Aggregated hidden state: P · relu(s1)
    pub ph1: Array2<f32>,
    /// Final embeddings: P · relu(s1) · W2
    pub z: Array2<f32>,
}

impl Encoder {
    /// Fresh Glorot-uniform parameters for the given dimensions.
    pub fn new(config: EncoderConfig, rng: &mut StdRng) -> Self {
        Self {
            w1: glorot_uniform(config.input_dim, config.hidden_dim, rng),
            w2: glorot_uniform(config.hidden_dim, config.embedding_dim, rng),
        }
    }

    pub fn embedding_dim(&self) -> usize {
        self.w2.ncols()
    }

    /// Encode all nodes: one embedding vector per node, shape
    /// [N, embedding_dim]. Pure in the parameters; deterministic given
    /// fixed parameters and inputs.
    pub fn encode(&self, features: &FeatureMatrix, propagation: &Array2<f32>) -> Array2<f32> {
        self.forward(features, propagation).z
    }

    pub(crate) fn forward(
        &self,
        features: &FeatureMatrix,
        propagation: &Array2<f32>,
    ) -> EncodeTrace {
        let px = propagation.dot(features);
        let s1 = px.dot(&self.w1);
        let h1 = s1.mapv(|x| x.max(0.0));
        let ph1 = propagation.dot(&h1);
        let z = ph1.dot(&self.w2);
        EncodeTrace { px, s1, ph1, z }
    }
}

/// Symmetric degree-normalized propagation matrix with self-loops:
/// `P = D̂^{-1/2} (A + I) D̂^{-1/2}` where `D̂` counts the self-loop.
/// Symmetric by construction, so it is its own transpose in backprop.
pub fn propagation_matrix(graph: &Graph) -> Array2<f32> {
    let n = graph.node_count();
    let mut adj = Array2::<f32>::zeros((n, n));
    for &(u, v) in graph.edges() {
        adj[[u, v]] = 1.0;
        adj[[v, u]] = 1.0;
    }
    for i in 0..n {
        adj[[i, i]] = 1.0;
    }

    let inv_sqrt_deg: Vec<f32> = (0..n)
        .map(|i| {
            let deg: f32 = adj.row(i).sum();
            1.0 / deg.sqrt()
        })
        .collect();

    for u in 0..n {
        for v in 0..n {
            adj[[u, v]] *= inv_sqrt_deg[u] * inv_sqrt_deg[v];
        }
    }
    adj
}

fn glorot_uniform(rows: usize, cols: usize, rng: &mut StdRng) -> Array2<f32> {
    let limit = (6.0 / (rows + cols) as f32).sqrt();
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-limit..limit))
}
