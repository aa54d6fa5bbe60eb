//! Node feature assignment.
//!
//! Tabular inputs carry no numeric node attributes in this system's scope,
//! so every graph gets identity (one-hot) features sized to its node count.
//! The feature dimension therefore changes whenever the graph changes,
//! which forces a full model re-initialization on re-ingestion.

use ndarray::Array2;

/// Node feature matrix type: [num_nodes, feature_dim]
pub type FeatureMatrix = Array2<f32>;

/// Identity encoding: row `i` is the indicator vector for node `i`.
pub fn identity_features(node_count: usize) -> FeatureMatrix {
    Array2::eye(node_count)
}
