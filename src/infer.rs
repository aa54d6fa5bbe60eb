//! Inference over a trained artifact: point queries for arbitrary node
//! pairs, plus the process-wide artifact slot.

use crate::error::{LinkgraphError, Result};
use crate::ingest::graph::Graph;
use crate::ingest::FeatureMatrix;
use crate::model::decoder::{decode, sigmoid};
use crate::model::encoder::Encoder;
use crate::train::TrainingStats;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Everything needed to reproduce embeddings, treated as one atomically
/// replaceable unit: trained encoder parameters plus the exact graph,
/// feature matrix, and propagation matrix they were fitted to. Created
/// fresh per training invocation; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    encoder: Encoder,
    graph: Graph,
    features: FeatureMatrix,
    propagation: Array2<f32>,
    stats: TrainingStats,
}

impl ModelArtifact {
    pub(crate) fn new(
        encoder: Encoder,
        graph: Graph,
        features: FeatureMatrix,
        propagation: Array2<f32>,
        stats: TrainingStats,
    ) -> Self {
        Self {
            encoder,
            graph,
            features,
            propagation,
            stats,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Recompute embeddings for the full graph from the held parameters.
    /// Not cached across calls; correctness over speed.
    pub fn embeddings(&self) -> Array2<f32> {
        self.encoder.encode(&self.features, &self.propagation)
    }
}

/// Categorical read of a link probability at the fixed 0.5 threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Connected,
    Unlikely,
}

/// One answered pair query. Ephemeral; computed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub node_a: i64,
    pub node_b: i64,
    pub probability: f32,
    pub verdict: Verdict,
}

fn check_node(node: i64, node_count: usize) -> Result<usize> {
    if node < 0 || node as u64 >= node_count as u64 {
        return Err(LinkgraphError::UnknownNode { node, node_count });
    }
    Ok(node as usize)
}

/// Score a node pair against the artifact's graph.
///
/// Ids outside `[0, node_count)` fail with `UnknownNode` — they never
/// degrade into a wrapped or clamped embedding lookup. The decoder's
/// logit is squashed to a probability here, at the consumption boundary.
pub fn predict(artifact: &ModelArtifact, node_a: i64, node_b: i64) -> Result<PredictionResult> {
    let node_count = artifact.node_count();
    let a = check_node(node_a, node_count)?;
    let b = check_node(node_b, node_count)?;

    let embeddings = artifact.embeddings();
    let score = decode(&embeddings, &[(a, b)])[0];
    let probability = sigmoid(score);
    let verdict = if probability > 0.5 {
        Verdict::Connected
    } else {
        Verdict::Unlikely
    };

    Ok(PredictionResult {
        node_a,
        node_b,
        probability,
        verdict,
    })
}

/// Single-writer/multi-reader slot for the current artifact.
///
/// Readers capture an `Arc` snapshot once per request and keep using it
/// even if a retrain swaps the slot mid-computation; a reader never
/// observes a partially constructed artifact.
pub struct InferenceService {
    current: RwLock<Arc<ModelArtifact>>,
}

impl InferenceService {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            current: RwLock::new(Arc::new(artifact)),
        }
    }

    /// Snapshot of the currently installed artifact.
    pub fn artifact(&self) -> Arc<ModelArtifact> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically replace the held artifact. In-flight readers finish on
    /// whichever snapshot they captured.
    pub fn install(&self, artifact: ModelArtifact) {
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(artifact);
    }

    pub fn predict(&self, node_a: i64, node_b: i64) -> Result<PredictionResult> {
        predict(&self.artifact(), node_a, node_b)
    }
}
