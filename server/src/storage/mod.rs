//! Storage and persistence layer
//!
//! - Flat-file JSON documents
//! - Sample data generation
//! - Data models

mod file_system;
mod models;
pub mod seed;

pub use file_system::Storage;
pub use models::{round_to, Transaction, Wallet};
pub use seed::{SeedPlan, SeedWallet};
