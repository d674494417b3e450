//! Wallet list and wallet transaction fetchers

use async_trait::async_trait;
use std::ops::Deref;

use crate::client::TrackerClient;
use crate::error::Result;
use crate::fetcher::{CollectionFetcher, CollectionSource};
use crate::models::{Transaction, Wallet};
use crate::retry::RetryConfig;

pub struct WalletListSource {
    client: TrackerClient,
}

impl WalletListSource {
    pub fn new(client: TrackerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CollectionSource for WalletListSource {
    type Key = ();
    type Item = Wallet;

    async fn fetch(&self, _key: &()) -> Result<Option<Vec<Wallet>>> {
        self.client.list_wallets().await.map(Some)
    }
}

/// Transactions of the wallet whose id is the key
pub struct TransactionSource {
    client: TrackerClient,
}

impl TransactionSource {
    pub fn new(client: TrackerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CollectionSource for TransactionSource {
    type Key = String;
    type Item = Transaction;

    async fn fetch(&self, wallet_id: &String) -> Result<Option<Vec<Transaction>>> {
        self.client.wallet_transactions(wallet_id).await.map(Some)
    }
}

pub type TransactionsFetcher = CollectionFetcher<TransactionSource>;

impl TransactionsFetcher {
    /// Fetch the transactions of `wallet_id`; `None` yields an empty list
    /// without touching the network.
    pub fn for_wallet(
        client: TrackerClient,
        wallet_id: Option<String>,
        retry_config: RetryConfig,
    ) -> Self {
        CollectionFetcher::mount(TransactionSource::new(client), wallet_id, retry_config)
    }
}

/// Result of syncing one wallet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncResult {
    pub transactions: Vec<Transaction>,
    /// The re-listed collection, when it could be fetched
    pub wallets: Option<Vec<Wallet>>,
}

/// Wallet list fetcher plus the create, delete and sync actions
pub struct WalletsFetcher {
    client: TrackerClient,
    fetcher: CollectionFetcher<WalletListSource>,
}

impl WalletsFetcher {
    /// Start loading the wallet list. Must be called within a tokio runtime.
    pub fn mount(client: TrackerClient, retry_config: RetryConfig) -> Self {
        let fetcher =
            CollectionFetcher::mount(WalletListSource::new(client.clone()), Some(()), retry_config);
        Self { client, fetcher }
    }

    pub fn wallets(&self) -> Vec<Wallet> {
        self.fetcher.items()
    }

    /// Create a wallet and adopt the returned collection.
    ///
    /// Returns the id of the new wallet (the last element). Errors go
    /// straight back to the caller and never trigger automatic retries.
    pub async fn create_wallet(&self, address: &str) -> Result<Option<String>> {
        self.fetcher.clear_error();
        let wallets = self.client.create_wallet(address).await?;
        let new_id = wallets.last().map(|wallet| wallet.id.clone());

        log::info!("Created wallet {:?} for {}", new_id, address);
        self.fetcher.replace_items(wallets);
        Ok(new_id)
    }

    /// Delete a wallet and drop it locally. On failure the error is recorded
    /// on the list and `false` is returned.
    pub async fn delete_wallet(&self, wallet_id: &str) -> bool {
        self.fetcher.clear_error();
        match self.client.delete_wallet(wallet_id).await {
            Ok(()) => {
                self.fetcher.retain_items(|wallet| wallet.id != wallet_id);
                true
            }
            Err(e) => {
                log::warn!("Failed to delete wallet {}: {}", wallet_id, e);
                self.fetcher.fail_with(&e);
                false
            }
        }
    }

    /// Sync a wallet, then re-list wallets so the local collection picks up
    /// any server-side changes. On failure the error is recorded on the list
    /// and an empty result is returned.
    pub async fn sync_wallet(&self, wallet_id: &str) -> SyncResult {
        self.fetcher.clear_error();
        match self.sync_and_relist(wallet_id).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Failed to sync wallet {}: {}", wallet_id, e);
                self.fetcher.fail_with(&e);
                SyncResult::default()
            }
        }
    }

    async fn sync_and_relist(&self, wallet_id: &str) -> Result<SyncResult> {
        let transactions = self.client.sync_wallet(wallet_id).await?;
        let wallets = self.client.list_wallets().await?;
        self.fetcher.replace_items(wallets.clone());

        Ok(SyncResult {
            transactions,
            wallets: Some(wallets),
        })
    }
}

impl Deref for WalletsFetcher {
    type Target = CollectionFetcher<WalletListSource>;

    fn deref(&self) -> &Self::Target {
        &self.fetcher
    }
}
