use anyhow::Result;
use linkgraph::ingest::{build_reference_graph, SplitOptions};
use linkgraph::train::{train, TrainOptions};
use linkgraph::{Config, InferenceService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    log::info!("Starting linkgraph v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Configuration loaded successfully");

    // Bootstrap with the reference graph so the service always holds a
    // queryable artifact before the first upload
    let split_options = SplitOptions::from_config(&config);
    let train_options = TrainOptions::from_config(&config);

    let ingested = build_reference_graph(&split_options);
    log::info!(
        "Reference graph loaded: {} nodes, {} edges",
        ingested.graph.node_count(),
        ingested.graph.edge_count()
    );

    let artifact = tokio::task::spawn_blocking(move || {
        train(
            &ingested.graph,
            &ingested.features,
            &ingested.split.train,
            &train_options,
        )
    })
    .await??;

    let service = Arc::new(InferenceService::new(artifact));

    linkgraph::server::run(&config, service).await?;

    Ok(())
}
