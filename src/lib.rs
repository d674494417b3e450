//! Coin Tracker: client for the mock wallet tracker API
//!
//! The tracker server fails a share of requests on purpose. This crate wraps
//! its REST API and keeps remote collections fresh despite that.
//!
//! # Architecture
//!
//! - **Client**: typed calls for every endpoint with error classification
//! - **Retry Controller**: exponential backoff for one operation at a time
//! - **Fetchers**: wallet list and wallet transactions, refetched on key
//!   change and retried automatically while in error
//! - **App State**: selection and UI flags driven by commands
//!
//! # Example
//!
//! ```no_run
//! use coin_tracker::{ClientConfig, RetryConfig, TrackerClient, TransactionsFetcher, WalletsFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TrackerClient::new(ClientConfig::from_env())?;
//!
//! let wallets = WalletsFetcher::mount(client.clone(), RetryConfig::default());
//! let snapshot = wallets.settled().await;
//!
//! let selected = snapshot.items.first().map(|w| w.id.clone());
//! let transactions = TransactionsFetcher::for_wallet(client, selected, RetryConfig::default());
//! let history = transactions.settled().await;
//! println!("{} transactions", history.items.len());
//! # Ok(())
//! # }
//! ```

pub mod balance;
pub mod client;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod retry;
pub mod state;
pub mod wallets;

pub use balance::{calculate_balance, format_amount, Direction, WalletBalance};
pub use client::{ClientConfig, TrackerClient};
pub use error::ClientError;
pub use fetcher::{CollectionFetcher, CollectionSource, FetchSnapshot, FetchState};
pub use models::{HealthStatus, Transaction, Wallet};
pub use retry::{RetryConfig, RetryController, RetryPhase, RetryState};
pub use state::{AppCommand, AppState};
pub use wallets::{SyncResult, TransactionSource, TransactionsFetcher, WalletListSource, WalletsFetcher};

pub type Result<T> = std::result::Result<T, ClientError>;
