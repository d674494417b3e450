//! Delete the data documents and repopulate them with fresh sample data.
//!
//! Uses the same `DATA_DIR` as the server. Restart the server afterwards to
//! serve the new data.

use anyhow::Context;
use tracker_server::{ServerConfig, Storage};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();
    let storage = Storage::new_with_base_dir(config.data_dir);

    storage
        .reset()
        .with_context(|| format!("Failed to reset data in {:?}", storage.base_dir()))?;

    log::info!("   You can now restart the server to use the fresh data.");
    Ok(())
}
