//! HTTP wrapper around the core: topology export, CSV upload with
//! retraining, and pair prediction. Thin plumbing only; all graph and
//! model semantics live in the core modules.

use crate::config::Config;
use crate::error::{LinkgraphError, Result};
use crate::infer::{InferenceService, ModelArtifact, PredictionResult};
use crate::ingest::{build_graph_from_table, export_topology, SplitOptions, Table, Topology};
use crate::train::{train, TrainOptions};
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    service: Arc<InferenceService>,
    config: Config,
}

/// Run the HTTP server until it is shut down externally.
pub async fn run(config: &Config, service: Arc<InferenceService>) -> Result<()> {
    let app = create_router(config, service);

    let addr = format!("127.0.0.1:{}", config.http_server.port);
    log::info!("Starting linkgraph HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        LinkgraphError::Io(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            format!("Failed to bind to {}: {}", addr, e),
        ))
    })?;

    axum::serve(listener, app).await.map_err(|e| {
        LinkgraphError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("HTTP server error: {}", e),
        ))
    })?;

    Ok(())
}

fn create_router(config: &Config, service: Arc<InferenceService>) -> Router {
    // Build CORS layer.
    // - If allowed_origins is configured: restrict to exactly those.
    // - If empty (local dev): allow Any for convenience.
    let allowed_origins = &config.http_server.allowed_origins;
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/", get(handle_status))
        .route("/graph-data", get(handle_graph_data))
        .route("/upload-csv", post(handle_upload_csv))
        .route("/predict", get(handle_predict))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(AppState {
            service,
            config: config.clone(),
        })
}

type HandlerError = (StatusCode, Json<Value>);

/// Translate a core error into a status code and JSON body.
fn error_response(err: LinkgraphError) -> HandlerError {
    let status = match &err {
        LinkgraphError::UnknownNode { .. } => StatusCode::NOT_FOUND,
        LinkgraphError::MalformedGraphInput(_)
        | LinkgraphError::InsufficientTrainingData(_)
        | LinkgraphError::Csv(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

fn bad_request(message: String) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

async fn handle_status(State(state): State<AppState>) -> Json<Value> {
    let artifact = state.service.artifact();
    Json(json!({
        "status": "linkgraph online",
        "version": env!("CARGO_PKG_VERSION"),
        "nodes": artifact.node_count(),
        "edges": artifact.graph().edge_count(),
        "final_loss": artifact.stats().final_loss,
    }))
}

/// Graph topology for visualization.
async fn handle_graph_data(State(state): State<AppState>) -> Json<Topology> {
    let artifact = state.service.artifact();
    Json(export_topology(artifact.graph()))
}

#[derive(Debug, Deserialize)]
struct PredictParams {
    node_a: i64,
    node_b: i64,
}

async fn handle_predict(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
) -> std::result::Result<Json<PredictionResult>, HandlerError> {
    let result = state
        .service
        .predict(params.node_a, params.node_b)
        .map_err(error_response)?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
struct UploadSummary {
    message: &'static str,
    nodes: usize,
    edges: usize,
}

/// Retrain on an uploaded CSV edge list. The previous artifact stays
/// installed unless ingestion and training both succeed.
async fn handle_upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> std::result::Result<Json<UploadSummary>, HandlerError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
        .ok_or_else(|| bad_request("no file in upload".to_string()))?;
    let bytes = field
        .bytes()
        .await
        .map_err(|e| bad_request(format!("failed to read upload: {}", e)))?
        .to_vec();

    let split_options = SplitOptions::from_config(&state.config);
    let train_options = TrainOptions::from_config(&state.config);

    let (artifact, nodes, edges) = tokio::task::spawn_blocking(
        move || -> Result<(ModelArtifact, usize, usize)> {
            let table = Table::from_csv(bytes.as_slice())?;
            let ingested = build_graph_from_table(&table, &split_options)?;
            let artifact = train(
                &ingested.graph,
                &ingested.features,
                &ingested.split.train,
                &train_options,
            )?;
            let nodes = ingested.graph.node_count();
            let edges = ingested.graph.edge_count();
            Ok((artifact, nodes, edges))
        },
    )
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("training task failed: {}", e) })),
        )
    })?
    .map_err(error_response)?;

    state.service.install(artifact);
    log::info!("Model retrained: {} nodes, {} edges", nodes, edges);

    Ok(Json(UploadSummary {
        message: "model retrained",
        nodes,
        edges,
    }))
}
