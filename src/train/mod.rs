//! Supervised training of the encoder over observed edges.
//!
//! Observed train edges are the positive examples; an equal number of
//! sampled non-edges provide the negatives each epoch. The combined
//! binary cross-entropy loss is minimized with Adam for a fixed number of
//! epochs — no early stopping, no convergence check.

pub mod adam;
pub mod sampling;

pub use adam::Adam;
pub use sampling::sample_negative_pairs;

use crate::config::Config;
use crate::error::{LinkgraphError, Result};
use crate::infer::ModelArtifact;
use crate::ingest::graph::Graph;
use crate::ingest::FeatureMatrix;
use crate::model::decoder::{decode, sigmoid};
use crate::model::encoder::{propagation_matrix, Encoder, EncoderConfig};
use ndarray::{Array2, Zip};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashSet;

/// Training hyperparameters. Defaults match the fixed training policy:
/// 101 epochs at learning rate 0.01, hidden dimension 128, embedding
/// dimension 64.
#[derive(Debug, Clone, Copy)]
pub struct TrainOptions {
    pub learning_rate: f32,
    pub epochs: usize,
    pub hidden_dim: usize,
    pub embedding_dim: usize,
    /// Seed for parameter init and negative sampling; None draws one
    /// from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 101,
            hidden_dim: 128,
            embedding_dim: 64,
            seed: None,
        }
    }
}

impl TrainOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            learning_rate: config.training.learning_rate,
            epochs: config.training.epochs,
            hidden_dim: config.model.hidden_dim,
            embedding_dim: config.model.embedding_dim,
            seed: config.training.seed,
        }
    }
}

/// Loss trajectory and timing of one training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingStats {
    pub epochs: usize,
    pub losses: Vec<f32>,
    pub final_loss: f32,
    pub training_time_secs: f64,
}

/// Numerically stable binary cross-entropy on a raw logit.
fn bce_with_logits(logit: f32, label: f32) -> f32 {
    logit.max(0.0) - logit * label + (1.0 + (-logit.abs()).exp()).ln()
}

/// Fit a fresh encoder to the graph and return the complete artifact.
///
/// Fails with `InsufficientTrainingData` before any gradient work when
/// the positive set is empty; a failed call never touches previously
/// trained state.
pub fn train(
    graph: &Graph,
    features: &FeatureMatrix,
    train_edges: &[(usize, usize)],
    options: &TrainOptions,
) -> Result<ModelArtifact> {
    if train_edges.is_empty() {
        return Err(LinkgraphError::InsufficientTrainingData(
            "no positive edges to train on".to_string(),
        ));
    }

    let start = std::time::Instant::now();
    let node_count = graph.node_count();
    let input_dim = features.ncols();

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    log::info!(
        "Training encoder: {} nodes, {} train edges, {} epochs (hidden {}, embedding {})",
        node_count,
        train_edges.len(),
        options.epochs,
        options.hidden_dim,
        options.embedding_dim
    );

    let mut encoder = Encoder::new(
        EncoderConfig::new(input_dim, options.hidden_dim, options.embedding_dim),
        &mut rng,
    );
    let propagation = propagation_matrix(graph);

    let positives: HashSet<(usize, usize)> = train_edges
        .iter()
        .map(|&(u, v)| if u <= v { (u, v) } else { (v, u) })
        .collect();

    let mut optimizer = Adam::new(
        options.learning_rate,
        &[encoder.w1.dim(), encoder.w2.dim()],
    );

    let mut losses = Vec::with_capacity(options.epochs);

    for epoch in 0..options.epochs {
        let trace = encoder.forward(features, &propagation);

        let pos_scores = decode(&trace.z, train_edges);
        let negatives =
            sample_negative_pairs(node_count, train_edges.len(), &positives, &mut rng);
        let neg_scores = decode(&trace.z, &negatives);

        let batch = (pos_scores.len() + neg_scores.len()) as f32;
        let mut dz = Array2::<f32>::zeros(trace.z.dim());
        let mut loss = accumulate_pair_grads(train_edges, &pos_scores, 1.0, batch, &trace.z, &mut dz);
        loss += accumulate_pair_grads(&negatives, &neg_scores, 0.0, batch, &trace.z, &mut dz);
        loss /= batch;

        // Backprop through layer 2, the ReLU, then layer 1. The
        // propagation matrix is symmetric, so it stands in for its own
        // transpose.
        let dw2 = trace.ph1.t().dot(&dz);
        let mut ds1 = propagation.dot(&dz.dot(&encoder.w2.t()));
        Zip::from(&mut ds1).and(&trace.s1).for_each(|d, &s| {
            if s <= 0.0 {
                *d = 0.0;
            }
        });
        let dw1 = trace.px.t().dot(&ds1);

        optimizer.step(&mut [&mut encoder.w1, &mut encoder.w2], &[&dw1, &dw2]);

        losses.push(loss);
        if epoch % 10 == 0 {
            log::debug!("Epoch {}/{}: loss = {:.4}", epoch + 1, options.epochs, loss);
        }
    }

    let training_time_secs = start.elapsed().as_secs_f64();
    let final_loss = losses.last().copied().unwrap_or(0.0);
    log::info!(
        "Training complete in {:.2}s, final loss: {:.4}",
        training_time_secs,
        final_loss
    );

    let stats = TrainingStats {
        epochs: options.epochs,
        losses,
        final_loss,
        training_time_secs,
    };

    Ok(ModelArtifact::new(
        encoder,
        graph.clone(),
        features.clone(),
        propagation,
        stats,
    ))
}

/// Add each pair's cross-entropy term and its embedding gradient
/// contribution. Returns the summed (unnormalized) loss.
fn accumulate_pair_grads(
    pairs: &[(usize, usize)],
    scores: &[f32],
    label: f32,
    batch: f32,
    z: &Array2<f32>,
    dz: &mut Array2<f32>,
) -> f32 {
    let mut loss = 0.0;
    for (&(u, v), &score) in pairs.iter().zip(scores.iter()) {
        loss += bce_with_logits(score, label);
        let grad = (sigmoid(score) - label) / batch;
        dz.row_mut(u).scaled_add(grad, &z.row(v));
        dz.row_mut(v).scaled_add(grad, &z.row(u));
    }
    loss
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{build_reference_graph, identity_features, SplitOptions};
    use crate::model::decoder;

    fn reference_options() -> TrainOptions {
        TrainOptions {
            seed: Some(42),
            ..TrainOptions::default()
        }
    }

    fn reference_split_options() -> SplitOptions {
        SplitOptions {
            seed: Some(42),
            ..SplitOptions::default()
        }
    }

    #[test]
    fn test_zero_train_edges_rejected() {
        let ingested = build_reference_graph(&reference_split_options());
        let err = train(&ingested.graph, &ingested.features, &[], &reference_options()).unwrap_err();
        assert!(matches!(err, LinkgraphError::InsufficientTrainingData(_)));
    }

    #[test]
    fn test_loss_decreases_on_reference_graph() {
        let ingested = build_reference_graph(&reference_split_options());
        let artifact = train(
            &ingested.graph,
            &ingested.features,
            &ingested.split.train,
            &reference_options(),
        )
        .unwrap();
        let stats = artifact.stats();
        assert_eq!(stats.losses.len(), 101);
        assert!(
            stats.final_loss < stats.losses[0],
            "loss should drop: first {:.4}, final {:.4}",
            stats.losses[0],
            stats.final_loss
        );
    }

    #[test]
    fn test_train_edges_score_above_half_on_average() {
        let ingested = build_reference_graph(&reference_split_options());
        let artifact = train(
            &ingested.graph,
            &ingested.features,
            &ingested.split.train,
            &reference_options(),
        )
        .unwrap();

        let z = artifact.embeddings();
        let scores = decoder::decode(&z, &ingested.split.train);
        let mean_prob: f32 =
            scores.iter().map(|&s| decoder::sigmoid(s)).sum::<f32>() / scores.len() as f32;
        assert!(
            mean_prob > 0.5,
            "mean probability over train positives was {:.3}",
            mean_prob
        );
    }

    #[test]
    fn test_positives_separate_from_sampled_negatives() {
        let ingested = build_reference_graph(&reference_split_options());
        let artifact = train(
            &ingested.graph,
            &ingested.features,
            &ingested.split.train,
            &reference_options(),
        )
        .unwrap();

        let z = artifact.embeddings();
        let positives: HashSet<(usize, usize)> = ingested.split.train.iter().copied().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let negatives = sample_negative_pairs(
            ingested.graph.node_count(),
            ingested.split.train.len(),
            &positives,
            &mut rng,
        );

        let pos_scores = decoder::decode(&z, &ingested.split.train);
        let neg_scores = decoder::decode(&z, &negatives);
        let mean = |v: &[f32]| v.iter().sum::<f32>() / v.len() as f32;
        assert!(
            mean(&pos_scores) > mean(&neg_scores),
            "positives should outscore sampled non-edges"
        );
    }

    #[test]
    fn test_training_deterministic_for_seed() {
        let ingested = build_reference_graph(&reference_split_options());
        let a = train(
            &ingested.graph,
            &ingested.features,
            &ingested.split.train,
            &reference_options(),
        )
        .unwrap();
        let b = train(
            &ingested.graph,
            &ingested.features,
            &ingested.split.train,
            &reference_options(),
        )
        .unwrap();
        assert_eq!(a.stats().final_loss, b.stats().final_loss);
    }

    #[test]
    fn test_artifact_carries_training_graph() {
        let ingested = build_reference_graph(&reference_split_options());
        let artifact = train(
            &ingested.graph,
            &ingested.features,
            &ingested.split.train,
            &reference_options(),
        )
        .unwrap();
        assert_eq!(artifact.node_count(), 34);
        assert_eq!(artifact.embeddings().shape(), &[34, 64]);
    }

    #[test]
    fn test_bce_with_logits_stable_and_correct() {
        // Reference values: -ln(sigmoid(s)) for label 1, -ln(1 - sigmoid(s)) for label 0
        assert!((bce_with_logits(0.0, 1.0) - 0.6931472).abs() < 1e-5);
        assert!((bce_with_logits(0.0, 0.0) - 0.6931472).abs() < 1e-5);
        assert!((bce_with_logits(2.0, 1.0) - 0.126928).abs() < 1e-5);
        assert!((bce_with_logits(-2.0, 0.0) - 0.126928).abs() < 1e-5);
        // Extreme logits must not produce NaN or infinity
        assert!(bce_with_logits(80.0, 0.0).is_finite());
        assert!(bce_with_logits(-80.0, 1.0).is_finite());
    }

    #[test]
    fn test_small_graph_trains() {
        let labels = vec!["a".into(), "b".into(), "c".into()];
        let graph = Graph::from_edges(labels, vec![(0, 1), (1, 2)]);
        let features = identity_features(3);
        let options = TrainOptions {
            hidden_dim: 8,
            embedding_dim: 4,
            seed: Some(1),
            ..TrainOptions::default()
        };
        let artifact = train(&graph, &features, graph.edges(), &options).unwrap();
        assert_eq!(artifact.embeddings().shape(), &[3, 4]);
    }
}
