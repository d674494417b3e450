//! Tracker Server: mock wallet tracker REST API
//!
//! Wallets and their transactions live in two flat JSON documents. A fault
//! gate in front of the router rejects a share of requests with synthetic
//! 500s so that clients have to cope with an unreliable backend.
//!
//! # Architecture
//!
//! - **Storage**: whole-document reads and writes plus first-run sample data
//! - **Wallet operations**: create, list, sync and delete with uniqueness and
//!   cascade rules, orchestrated by [`WalletManager`]
//! - **API**: axum router, handlers and the fault injection middleware

pub mod api;
pub mod config;
pub mod error;
pub mod manager;
pub mod storage;
pub mod wallet;

pub use config::{FaultConfig, ServerConfig};
pub use error::{StorageError, TrackerError};
pub use manager::WalletManager;
pub use storage::{SeedPlan, Storage, Transaction, Wallet};
