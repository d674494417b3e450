use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use super::types::{CreateWalletRequest, DeleteWalletResponse, HealthResponse};
use crate::error::TrackerError;
use crate::manager::WalletManager;
use crate::storage::{Transaction, Wallet};

/// Shared application state
pub type AppState = Arc<WalletManager>;

/// Store access is blocking file I/O over documents that can be tens of
/// megabytes, so it runs off the async workers.
async fn run_blocking<T, F>(manager: AppState, op: F) -> Result<T, TrackerError>
where
    F: FnOnce(&WalletManager) -> Result<T, TrackerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&manager))
        .await
        .map_err(|e| TrackerError::Internal(format!("Storage task panicked: {}", e)))?
}

/// GET /wallets
pub async fn list_wallets_handler(
    State(manager): State<AppState>,
) -> Result<Json<Vec<Wallet>>, TrackerError> {
    let wallets = run_blocking(manager, |m| Ok(m.list_wallets())).await?;
    Ok(Json(wallets))
}

/// POST /wallets
/// Returns the entire updated wallet list; the new wallet is last
pub async fn create_wallet_handler(
    State(manager): State<AppState>,
    payload: Option<Json<CreateWalletRequest>>,
) -> Result<(StatusCode, Json<Vec<Wallet>>), TrackerError> {
    // A missing or malformed body is treated as a missing address
    let address = payload.and_then(|Json(req)| req.address);
    let wallets = run_blocking(manager, move |m| m.create_wallet(address.as_deref())).await?;
    Ok((StatusCode::CREATED, Json(wallets)))
}

/// GET /wallets/:wallet_id
pub async fn get_wallet_transactions_handler(
    State(manager): State<AppState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<Vec<Transaction>>, TrackerError> {
    let transactions = run_blocking(manager, move |m| m.list_transactions(&wallet_id)).await?;
    Ok(Json(transactions))
}

/// POST /wallets/:wallet_id/sync
/// Returns only the newly created transactions
pub async fn sync_wallet_handler(
    State(manager): State<AppState>,
    Path(wallet_id): Path<String>,
) -> Result<(StatusCode, Json<Vec<Transaction>>), TrackerError> {
    let transactions = run_blocking(manager, move |m| m.sync_wallet(&wallet_id)).await?;
    Ok((StatusCode::CREATED, Json(transactions)))
}

/// DELETE /wallets/:wallet_id
pub async fn delete_wallet_handler(
    State(manager): State<AppState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<DeleteWalletResponse>, TrackerError> {
    run_blocking(manager, move |m| m.delete_wallet(&wallet_id)).await?;

    Ok(Json(DeleteWalletResponse {
        message: "Wallet deleted successfully".to_string(),
    }))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
