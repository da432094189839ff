use crate::config::BigQueryConfig;
use crate::error::ApiError;
use crate::etherscan::{AbiSource, ContractMetadata};
use crate::generator::{contract_to_sqls, contract_to_table_definitions};
use crate::table_definitions::TableDefinition;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn AbiSource>,
    pub bigquery: Arc<BigQueryConfig>,
}

impl AppState {
    pub fn new(source: Arc<dyn AbiSource>, bigquery: BigQueryConfig) -> Self {
        Self {
            source,
            bigquery: Arc::new(bigquery),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(index))
        .route("/api/", get(index))
        .route("/api/test", get(test_status))
        .route("/api/queries/{contract}", get(get_queries))
        .route("/api/tables/{contract}", get(get_tables))
        .route("/api/contract/{contract}", get(get_contract))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the API until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn index() -> Json<Value> {
    Json(json!({"status": "alive"}))
}

async fn test_status() -> Json<Value> {
    Json(json!({"status": "test"}))
}

#[tracing::instrument(skip(state), err)]
async fn get_queries(
    State(state): State<AppState>,
    Path(contract): Path<String>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let abi = state.source.get_abi(&contract).await?;
    let queries = contract_to_sqls(&abi, &contract, &state.bigquery)?;

    info!(count = queries.len(), "Rendered queries");
    Ok(Json(queries))
}

#[tracing::instrument(skip(state), err)]
async fn get_tables(
    State(state): State<AppState>,
    Path(contract): Path<String>,
) -> Result<Json<BTreeMap<String, TableDefinition>>, ApiError> {
    let abi = state.source.get_abi(&contract).await?;
    let tables = contract_to_table_definitions(&abi, &contract, &state.bigquery)?;

    info!(count = tables.len(), "Built table definitions");
    Ok(Json(tables))
}

#[tracing::instrument(skip(state), err)]
async fn get_contract(
    State(state): State<AppState>,
    Path(contract): Path<String>,
) -> Result<Json<ContractMetadata>, ApiError> {
    let metadata = state.source.get_contract(&contract).await?;
    Ok(Json(metadata))
}
