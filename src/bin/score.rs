use clap::Parser;
use linkgraph::ingest::{build_graph_from_table, build_reference_graph, SplitOptions, Table};
use linkgraph::train::{train, TrainOptions};
use linkgraph::{predict, Config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "score")]
#[command(about = "Train a link-prediction model on an edge-list CSV and score one node pair")]
struct Args {
    /// First node id (dense id after relabeling)
    node_a: i64,

    /// Second node id
    node_b: i64,

    /// Path to an edge-list CSV; omit to use the built-in reference graph
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Fixed RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();
    let config = Config::load()?;

    let mut split_options = SplitOptions::from_config(&config);
    let mut train_options = TrainOptions::from_config(&config);
    if args.seed.is_some() {
        split_options.seed = args.seed;
        train_options.seed = args.seed;
    }

    let ingested = match &args.csv {
        Some(path) => {
            log::info!("Ingesting edge list from {}", path.display());
            let table = Table::from_csv_path(path)?;
            build_graph_from_table(&table, &split_options)?
        }
        None => {
            log::info!("Using built-in reference graph");
            build_reference_graph(&split_options)
        }
    };

    println!(
        "Graph: {} nodes, {} edges ({} train / {} val / {} test)",
        ingested.graph.node_count(),
        ingested.graph.edge_count(),
        ingested.split.train.len(),
        ingested.split.val.len(),
        ingested.split.test.len()
    );

    let artifact = train(
        &ingested.graph,
        &ingested.features,
        &ingested.split.train,
        &train_options,
    )?;

    let stats = artifact.stats();
    println!(
        "Trained {} epochs in {:.2}s, final loss {:.4}",
        stats.epochs, stats.training_time_secs, stats.final_loss
    );

    let result = predict(&artifact, args.node_a, args.node_b)?;
    println!(
        "P(link {} -- {}) = {:.4} [{:?}]",
        result.node_a, result.node_b, result.probability, result.verdict
    );

    Ok(())
}
