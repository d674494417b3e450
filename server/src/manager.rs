use crate::error::TrackerError;
/// Wallet Manager - Orchestration Layer
///
/// Coordinates all wallet operations by delegating to the operation modules.
use crate::storage::{Storage, Transaction, Wallet};
use crate::wallet::{
    sync_ops::sync_wallet,
    wallet_ops::{create_wallet, delete_wallet, list_transactions, list_wallets},
};
use std::sync::{Mutex, MutexGuard};

pub struct WalletManager {
    pub storage: Storage,
    /// Serializes read-modify-write cycles so concurrent mutations cannot
    /// overwrite each other's documents.
    write_lock: Mutex<()>,
}

impl WalletManager {
    // ============================================================================
    // Constructor
    // ============================================================================

    pub fn new() -> Self {
        Self::new_with_storage(Storage::new())
    }

    /// Create WalletManager with custom storage (for testing)
    pub fn new_with_storage(storage: Storage) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub fn list_wallets(&self) -> Vec<Wallet> {
        list_wallets(&self.storage)
    }

    pub fn list_transactions(&self, wallet_id: &str) -> Result<Vec<Transaction>, TrackerError> {
        list_transactions(&self.storage, wallet_id)
    }

    // ============================================================================
    // Mutations (serialized)
    // ============================================================================

    pub fn create_wallet(&self, address: Option<&str>) -> Result<Vec<Wallet>, TrackerError> {
        let _guard = self.lock_writes();
        create_wallet(&self.storage, address)
    }

    pub fn sync_wallet(&self, wallet_id: &str) -> Result<Vec<Transaction>, TrackerError> {
        let _guard = self.lock_writes();
        sync_wallet(&self.storage, wallet_id)
    }

    pub fn delete_wallet(&self, wallet_id: &str) -> Result<(), TrackerError> {
        let _guard = self.lock_writes();
        delete_wallet(&self.storage, wallet_id)
    }
}

impl Default for WalletManager {
    fn default() -> Self {
        Self::new()
    }
}
