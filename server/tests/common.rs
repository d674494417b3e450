//! Common test utilities for tracker server integration tests
//!
//! This module provides shared test infrastructure including:
//! - Temporary data directories with automatic cleanup
//! - Small sample data plans that keep tests fast
//! - In-process routers with configurable fault injection
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracker_server::api::fault::FaultGate;
use tracker_server::api::server::create_router;
use tracker_server::storage::SeedWallet;
use tracker_server::{FaultConfig, SeedPlan, Storage, WalletManager};

pub const GENESIS_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

/// Test environment with automatic cleanup
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub manager: Arc<WalletManager>,
}

impl TestEnvironment {
    /// Environment whose documents start as empty arrays
    pub fn empty() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        log::info!("📁 Test directory: {:?}", temp_dir.path());

        let storage = Storage::new_with_base_dir(temp_dir.path().to_path_buf());
        storage.write_wallets(&[])?;
        storage.write_transactions(&[])?;
        assert!(!storage.initialize()?);

        Ok(Self {
            temp_dir,
            manager: Arc::new(WalletManager::new_with_storage(storage)),
        })
    }

    /// Environment populated from `small_seed_plan`
    pub fn seeded() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let storage = Storage::new_with_base_dir(temp_dir.path().to_path_buf())
            .with_seed_plan(small_seed_plan());
        assert!(storage.initialize()?);

        Ok(Self {
            temp_dir,
            manager: Arc::new(WalletManager::new_with_storage(storage)),
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.manager.storage
    }

    /// Router with the given fault configuration and a seeded generator
    pub fn router(&self, fault: FaultConfig) -> axum::Router {
        let gate = FaultGate::with_rng(fault, CancellationToken::new(), StdRng::seed_from_u64(99));
        create_router(self.manager.clone(), gate, None)
    }
}

/// The default wallets with short histories
pub fn small_seed_plan() -> SeedPlan {
    let mut plan = SeedPlan::default();
    for (wallet, count) in plan.wallets.iter_mut().zip([10, 20, 150]) {
        wallet.transaction_count = count;
    }
    plan
}

pub fn seed_wallet(address: &str, transaction_count: usize) -> SeedWallet {
    SeedWallet {
        address: address.to_string(),
        name: "Kraken".to_string(),
        icon_url: String::new(),
        transaction_count,
        max_amount: 100.0,
    }
}
