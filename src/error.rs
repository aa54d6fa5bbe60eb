use thiserror::Error;

/// Main error type for linkgraph
#[derive(Error, Debug)]
pub enum LinkgraphError {
    /// Unusable table shape or zero resulting edges after cleaning
    #[error("Malformed graph input: {0}")]
    MalformedGraphInput(String),

    /// No positive edges to train on
    #[error("Insufficient training data: {0}")]
    InsufficientTrainingData(String),

    /// Prediction query references a node outside the current graph
    #[error("Unknown node {node}: graph has {node_count} nodes")]
    UnknownNode { node: i64, node_count: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenient Result type using LinkgraphError
pub type Result<T> = std::result::Result<T, LinkgraphError>;
