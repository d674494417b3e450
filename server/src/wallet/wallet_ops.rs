/// Wallet lifecycle operations
///
/// Handles wallet creation, listing, deletion and transaction lookup.
use crate::error::TrackerError;
use crate::storage::{Storage, Transaction, Wallet};
use rand::seq::SliceRandom;
use uuid::Uuid;

/// Provider labels a new wallet is named after, chosen at random
pub const WALLET_PROVIDERS: [&str; 3] = ["Coinbase", "Kraken", "Phantom"];

pub fn list_wallets(storage: &Storage) -> Vec<Wallet> {
    storage.read_wallets()
}

/// Transactions of one wallet, in insertion order
pub fn list_transactions(storage: &Storage, wallet_id: &str) -> Result<Vec<Transaction>, TrackerError> {
    let wallets = storage.read_wallets();
    if !wallets.iter().any(|w| w.id == wallet_id) {
        return Err(TrackerError::NotFound(wallet_id.to_string()));
    }

    Ok(storage
        .read_transactions()
        .into_iter()
        .filter(|t| t.wallet_id == wallet_id)
        .collect())
}

/// Register a new wallet and return the whole updated collection.
///
/// The new wallet is always the last element.
pub fn create_wallet(storage: &Storage, address: Option<&str>) -> Result<Vec<Wallet>, TrackerError> {
    let address = address
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| TrackerError::InvalidInput("Address is required".to_string()))?;

    let mut wallets = storage.read_wallets();
    if wallets.iter().any(|w| w.address == address) {
        return Err(TrackerError::Conflict(address.to_string()));
    }

    let name = WALLET_PROVIDERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(WALLET_PROVIDERS[0]);

    let wallet = Wallet {
        id: Uuid::new_v4().to_string(),
        address: address.to_string(),
        name: name.to_string(),
        icon_url: String::new(),
    };
    log::info!("Created wallet {} ({}) as {}", wallet.id, wallet.address, wallet.name);

    wallets.push(wallet);
    storage.write_wallets(&wallets)?;

    Ok(wallets)
}

/// Delete a wallet and every transaction that references it.
///
/// Two separate document writes: wallets first, then transactions.
pub fn delete_wallet(storage: &Storage, wallet_id: &str) -> Result<(), TrackerError> {
    let mut wallets = storage.read_wallets();
    let index = wallets
        .iter()
        .position(|w| w.id == wallet_id)
        .ok_or_else(|| TrackerError::NotFound(wallet_id.to_string()))?;

    log::warn!("Deleting wallet: {}", wallet_id);
    wallets.remove(index);
    storage.write_wallets(&wallets)?;

    let mut transactions = storage.read_transactions();
    let before = transactions.len();
    transactions.retain(|t| t.wallet_id != wallet_id);
    storage.write_transactions(&transactions)?;

    log::info!(
        "Wallet '{}' deleted with {} transactions",
        wallet_id,
        before - transactions.len()
    );
    Ok(())
}
