use rand::thread_rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::models::{Transaction, Wallet};
use super::seed::{generate_sample_data, SeedPlan};
use crate::error::StorageError;

const WALLETS_FILE: &str = "wallets.json";
const TRANSACTIONS_FILE: &str = "transactions.json";

/// Flat-file store holding the wallet and transaction collections as two
/// whole-document JSON arrays.
///
/// Every write replaces a document in full. The two documents are written
/// independently, so a crash between them can leave transactions pointing at
/// a wallet that no longer exists.
#[derive(Clone)]
pub struct Storage {
    base_path: PathBuf,
    seed_plan: SeedPlan,
}

impl Storage {
    /// Create a new storage instance with the default base directory ("./data")
    pub fn new() -> Self {
        Self::new_with_base_dir(PathBuf::from("./data"))
    }

    /// Create storage with custom base directory (for testing)
    pub fn new_with_base_dir(base_path: PathBuf) -> Self {
        Self {
            base_path,
            seed_plan: SeedPlan::default(),
        }
    }

    /// Replace the sample data plan used by `initialize` and `reset`
    pub fn with_seed_plan(mut self, seed_plan: SeedPlan) -> Self {
        self.seed_plan = seed_plan;
        self
    }

    /// Get the base directory path for the data documents
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_path
    }

    pub fn wallets_path(&self) -> PathBuf {
        self.base_path.join(WALLETS_FILE)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.base_path.join(TRANSACTIONS_FILE)
    }

    /// Prepare the data directory and documents.
    ///
    /// Both documents missing means a first run: they are created empty and
    /// then populated with sample data. A single missing document is created
    /// empty without reseeding. Returns `true` when sample data was written.
    pub fn initialize(&self) -> Result<bool, StorageError> {
        fs::create_dir_all(&self.base_path)?;

        let wallets_exist = self.wallets_path().exists();
        let transactions_exist = self.transactions_path().exists();

        if !wallets_exist {
            self.write_wallets(&[])?;
        }
        if !transactions_exist {
            self.write_transactions(&[])?;
        }

        if !wallets_exist && !transactions_exist {
            self.populate_sample_data()?;
            return Ok(true);
        }

        if wallets_exist != transactions_exist {
            log::warn!(
                "Only one data document was present in {:?}; created the other empty",
                self.base_path
            );
        }
        Ok(false)
    }

    /// Load every wallet; unreadable or corrupt data yields an empty list
    pub fn read_wallets(&self) -> Vec<Wallet> {
        read_collection(&self.wallets_path())
    }

    /// Load every transaction; unreadable or corrupt data yields an empty list
    pub fn read_transactions(&self) -> Vec<Transaction> {
        read_collection(&self.transactions_path())
    }

    pub fn write_wallets(&self, wallets: &[Wallet]) -> Result<(), StorageError> {
        write_collection(&self.wallets_path(), wallets)
    }

    pub fn write_transactions(&self, transactions: &[Transaction]) -> Result<(), StorageError> {
        write_collection(&self.transactions_path(), transactions)
    }

    /// Generate the sample wallets and transactions and overwrite both documents
    pub fn populate_sample_data(&self) -> Result<(), StorageError> {
        log::info!("📊 Initializing database with sample data...");
        fs::create_dir_all(&self.base_path)?;

        let (wallets, transactions) = generate_sample_data(&self.seed_plan, &mut thread_rng());

        self.write_wallets(&wallets)?;
        self.write_transactions(&transactions)?;

        log::info!(
            "✅ Database initialized with {} wallets and {} transactions",
            wallets.len(),
            transactions.len()
        );
        for (wallet, seed) in wallets.iter().zip(&self.seed_plan.wallets) {
            log::info!(
                "   {}: {} ({} transactions)",
                wallet.name,
                wallet.address,
                seed.transaction_count
            );
        }
        Ok(())
    }

    /// Delete both documents and repopulate sample data
    pub fn reset(&self) -> Result<(), StorageError> {
        log::info!("🔄 Resetting database...");

        for path in [self.wallets_path(), self.transactions_path()] {
            match fs::remove_file(&path) {
                Ok(()) => log::info!("   Removed existing {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.populate_sample_data()?;
        log::info!("✅ Database reset complete!");
        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::debug!("Could not read {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(items) => items,
        Err(e) => {
            log::warn!("Ignoring unparseable data in {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Serialize to a sibling temp file and rename it over the target, so readers
/// never see a half-written document.
fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(items)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
