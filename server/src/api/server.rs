use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::fault::{fault_injection, FaultGate, HEALTH_PATH};
use super::handlers::{self, AppState};
use crate::config::ServerConfig;
use crate::manager::WalletManager;
use crate::storage::Storage;

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    match allowed_origins {
        Some(origins) if !origins.is_empty() => {
            log::info!("CORS configured for origins: {}", origins.join(","));
            let origin_list: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build the API router.
///
/// The fault gate wraps every route and the 404 fallback; CORS sits outside
/// it so preflight requests are never rejected.
pub fn create_router(
    manager: AppState,
    gate: FaultGate,
    allowed_origins: Option<&[String]>,
) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handlers::health_check))
        .route(
            "/wallets",
            get(handlers::list_wallets_handler).post(handlers::create_wallet_handler),
        )
        .route(
            "/wallets/:wallet_id",
            get(handlers::get_wallet_transactions_handler).delete(handlers::delete_wallet_handler),
        )
        .route("/wallets/:wallet_id/sync", post(handlers::sync_wallet_handler))
        .fallback(handlers::not_found_handler)
        .layer(middleware::from_fn_with_state(gate, fault_injection))
        .layer(cors_layer(allowed_origins))
        .with_state(manager)
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let storage = Storage::new_with_base_dir(config.data_dir.clone());

    let init_storage = storage.clone();
    let seeded = tokio::task::spawn_blocking(move || init_storage.initialize()).await??;
    if !seeded {
        log::info!("Using existing data in {:?}", storage.base_dir());
    }

    let manager = Arc::new(WalletManager::new_with_storage(storage));
    let draining = CancellationToken::new();
    let gate = FaultGate::new(config.fault.clone(), draining.clone());
    let app = create_router(manager, gate, config.allowed_origins.as_deref());

    let listener = TcpListener::bind(&config.bind_address).await?;
    log::info!("Server listening on http://{}", config.bind_address);
    log::info!("API endpoints:");
    log::info!("  GET    /wallets - List all wallets");
    log::info!("  POST   /wallets - Create new wallet");
    log::info!("  GET    /wallets/:walletId - Get wallet transactions");
    log::info!("  POST   /wallets/:walletId/sync - Sync wallet");
    log::info!("  DELETE /wallets/:walletId - Delete wallet");
    log::info!("  GET    /health - Health check");

    serve(listener, app, shutdown_signal(draining)).await
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
///
/// Cancels `draining` first so the fault gate stops rejecting the requests
/// that are still being completed.
async fn shutdown_signal(draining: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    draining.cancel();
    log::info!("Shutting down server, draining remaining connections...");
}
