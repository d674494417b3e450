//! End-to-End Tests against an in-process tracker server
//!
//! Starts the real axum router on an ephemeral localhost port with a
//! temporary data directory, then exercises it through `TrackerClient` and
//! the fetchers.
//!
//! Run with: cargo test --test end_to_end_test -- --nocapture

use coin_tracker::{
    ClientConfig, ClientError, RetryConfig, TrackerClient, TransactionsFetcher, WalletsFetcher,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracker_server::api::fault::FaultGate;
use tracker_server::api::server::{create_router, serve};
use tracker_server::{FaultConfig, SeedPlan, Storage, WalletManager};

const GENESIS_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

// ============================================================================
// Test Server
// ============================================================================

struct TestServer {
    _data_dir: TempDir,
    shutdown: CancellationToken,
    client: TrackerClient,
}

impl TestServer {
    /// Serve an empty data set with the given fault configuration
    async fn start(fault: FaultConfig) -> anyhow::Result<Self> {
        let _ = env_logger::builder().is_test(true).try_init();

        let data_dir = TempDir::new()?;
        let plan = SeedPlan {
            wallets: Vec::new(),
            ..SeedPlan::default()
        };
        let storage = Storage::new_with_base_dir(data_dir.path().to_path_buf()).with_seed_plan(plan);
        storage.initialize()?;

        let manager = Arc::new(WalletManager::new_with_storage(storage));
        let gate = FaultGate::with_rng(fault, CancellationToken::new(), StdRng::seed_from_u64(7));
        let app = create_router(manager, gate, None);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        tokio::spawn(serve(listener, app, async move { signal.cancelled().await }));

        let client = TrackerClient::new(ClientConfig::with_base_url(format!("http://{}", address)))?;
        Ok(Self {
            _data_dir: data_dir,
            shutdown,
            client,
        })
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn fast_retries(max_attempts: u32) -> RetryConfig {
    RetryConfig::default()
        .with_max_attempts(max_attempts)
        .with_base_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(20))
}

// ============================================================================
// Client calls
// ============================================================================

#[tokio::test]
async fn test_create_sync_delete_over_http() -> anyhow::Result<()> {
    let server = TestServer::start(FaultConfig::disabled()).await?;
    let client = &server.client;

    assert_eq!(client.health().await?.status, "OK");
    assert!(client.list_wallets().await?.is_empty());

    let wallets = client.create_wallet(GENESIS_ADDRESS).await?;
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].address, GENESIS_ADDRESS);
    assert!(wallets[0].needs_first_sync());
    let wallet_id = wallets[0].id.clone();

    let synced = client.sync_wallet(&wallet_id).await?;
    assert!((1..=3).contains(&synced.len()));
    assert!(synced.iter().all(|tx| tx.wallet_id == wallet_id));

    let transactions = client.wallet_transactions(&wallet_id).await?;
    assert_eq!(transactions, synced);

    client.delete_wallet(&wallet_id).await?;
    assert!(client.list_wallets().await?.is_empty());

    let err = client.wallet_transactions(&wallet_id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_error_bodies_become_client_errors() -> anyhow::Result<()> {
    let server = TestServer::start(FaultConfig::disabled()).await?;
    let client = &server.client;

    client.create_wallet(GENESIS_ADDRESS).await?;
    let err = client.create_wallet(GENESIS_ADDRESS).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(!err.is_retryable());
    assert_eq!(
        err.user_message("add wallet"),
        "This wallet address already exists."
    );

    let err = client.create_wallet("  ").await.unwrap_err();
    assert_eq!(err, ClientError::http(400, "Address is required"));
    Ok(())
}

#[tokio::test]
async fn test_reserved_characters_stay_in_the_wallet_id() -> anyhow::Result<()> {
    let server = TestServer::start(FaultConfig::disabled()).await?;
    let wallet_id = "no/such?wallet#id";

    let err = server.client.sync_wallet(wallet_id).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::http(404, format!("Wallet not found: {}", wallet_id))
    );

    let err = server.client.delete_wallet(wallet_id).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::http(404, format!("Wallet not found: {}", wallet_id))
    );
    Ok(())
}

#[tokio::test]
async fn test_simulated_faults_surface_as_retryable() -> anyhow::Result<()> {
    let server = TestServer::start(FaultConfig {
        enabled: true,
        failure_rate: 1.0,
    })
    .await?;

    let err = server.client.list_wallets().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.is_simulated());
    assert!(err.is_retryable());

    // Health stays reachable
    assert_eq!(server.client.health().await?.status, "OK");
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    drop(listener);

    let client = TrackerClient::new(ClientConfig::with_base_url(format!("http://{}", address)))?;
    let err = client.list_wallets().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.is_retryable());
    Ok(())
}

// ============================================================================
// Fetchers
// ============================================================================

#[tokio::test]
async fn test_wallets_fetcher_actions() -> anyhow::Result<()> {
    let server = TestServer::start(FaultConfig::disabled()).await?;
    let wallets = WalletsFetcher::mount(server.client.clone(), fast_retries(5));
    assert!(wallets.settled().await.items.is_empty());

    let new_id = wallets.create_wallet(GENESIS_ADDRESS).await?;
    let new_id = new_id.expect("created wallet id");
    assert_eq!(wallets.wallets().len(), 1);

    let duplicate = wallets.create_wallet(GENESIS_ADDRESS).await;
    assert!(duplicate.is_err());
    // Form errors are not routed through the list's error state
    assert_eq!(wallets.snapshot().error, None);

    let synced = wallets.sync_wallet(&new_id).await;
    assert!((1..=3).contains(&synced.transactions.len()));
    assert_eq!(synced.wallets.map(|w| w.len()), Some(1));

    let transactions =
        TransactionsFetcher::for_wallet(server.client.clone(), Some(new_id.clone()), fast_retries(5));
    assert_eq!(
        transactions.settled().await.items.len(),
        synced.transactions.len()
    );

    assert!(wallets.delete_wallet(&new_id).await);
    assert!(wallets.wallets().is_empty());

    // The deleted wallet's history now reads as empty rather than an error
    transactions.refetch().await.map_err(anyhow::Error::msg)?;
    let snapshot = transactions.settled().await;
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.error, None);
    Ok(())
}

#[tokio::test]
async fn test_failed_delete_is_recorded_on_the_list() -> anyhow::Result<()> {
    let server = TestServer::start(FaultConfig::disabled()).await?;
    let wallets = WalletsFetcher::mount(server.client.clone(), fast_retries(5));
    wallets.settled().await;

    assert!(!wallets.delete_wallet("no-such-wallet").await);

    // The error triggers a list refetch, which succeeds
    let snapshot = wallets.settled().await;
    assert_eq!(snapshot.error, None);
    Ok(())
}

#[tokio::test]
async fn test_fetcher_exhausts_retries_against_failing_server() -> anyhow::Result<()> {
    let server = TestServer::start(FaultConfig {
        enabled: true,
        failure_rate: 1.0,
    })
    .await?;

    let wallets = WalletsFetcher::mount(server.client.clone(), fast_retries(5));
    let snapshot = wallets.settled().await;
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Internal server error (simulated)")
    );
    assert_eq!(snapshot.attempt_count, 5);
    Ok(())
}

#[tokio::test]
async fn test_fetcher_masks_flaky_server() -> anyhow::Result<()> {
    let server = TestServer::start(FaultConfig {
        enabled: true,
        failure_rate: 0.5,
    })
    .await?;

    let wallets = WalletsFetcher::mount(server.client.clone(), fast_retries(30));
    let snapshot = wallets.settled().await;
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.attempt_count, 0);
    Ok(())
}
