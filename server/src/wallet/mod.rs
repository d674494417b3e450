/// Wallet Core Module
///
/// Business rules on top of the flat-file store:
///
/// - `wallet_ops.rs` - Wallet lifecycle (create, list, delete) and transaction lookup
/// - `sync_ops.rs` - Synthetic transaction generation for syncs
///
/// The `WalletManager` in `crate::manager` is the entry point that callers use.
pub mod sync_ops;
pub mod wallet_ops;

pub use wallet_ops::WALLET_PROVIDERS;
