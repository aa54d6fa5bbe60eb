pub mod config;
pub mod error;
pub mod infer;
pub mod ingest;
pub mod model;
pub mod server;
pub mod train;

pub use config::Config;
pub use error::{LinkgraphError, Result};
pub use infer::{predict, InferenceService, ModelArtifact, PredictionResult, Verdict};
pub use ingest::{
    build_graph_from_table, build_reference_graph, export_topology, IngestedGraph, SplitOptions,
    Table, Topology,
};
pub use train::{train, TrainOptions, TrainingStats};
