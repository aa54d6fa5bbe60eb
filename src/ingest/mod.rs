//! Graph ingestion: raw tables (or the built-in reference dataset) to a
//! canonical graph, identity node features, and a link-prediction edge
//! split.

pub mod features;
pub mod graph;
pub mod resolver;
pub mod split;
pub mod table;

pub use features::{identity_features, FeatureMatrix};
pub use graph::{export_topology, karate_club, Graph, NodeIndexer, Topology, TopologyNode};
pub use resolver::{ColumnMapping, SchemaRegistry};
pub use split::{random_link_split, EdgeSplit, SplitOptions};
pub use table::Table;

use crate::error::Result;

/// Everything one ingestion pass produces: the relabeled graph, its
/// identity features, and the train/val/test edge split. Re-ingesting
/// replaces all three as a unit.
#[derive(Debug, Clone)]
pub struct IngestedGraph {
    pub graph: Graph,
    pub features: FeatureMatrix,
    pub split: EdgeSplit,
}

/// Normalize a raw table into a canonical graph with identity features
/// and a fresh edge split.
pub fn build_graph_from_table(table: &Table, options: &SplitOptions) -> Result<IngestedGraph> {
    let graph = graph::graph_from_table(table)?;
    let features = identity_features(graph.node_count());
    let split = random_link_split(&graph, options);
    Ok(IngestedGraph {
        graph,
        features,
        split,
    })
}

/// Load the built-in reference dataset (Zachary's karate club) with the
/// same feature and split policy as uploaded tables.
pub fn build_reference_graph(options: &SplitOptions) -> IngestedGraph {
    let graph = karate_club();
    let features = identity_features(graph.node_count());
    let split = random_link_split(&graph, options);
    IngestedGraph {
        graph,
        features,
        split,
    }
}
