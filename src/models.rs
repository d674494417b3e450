//! Wire types returned by the tracker API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub address: String,
    pub name: String,
    /// Empty until the wallet has been synced once
    #[serde(rename = "iconURL", default)]
    pub icon_url: String,
}

impl Wallet {
    pub fn needs_first_sync(&self) -> bool {
        self.icon_url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub wallet_id: String,
    pub date: DateTime<Utc>,
    /// Signed amount: positive when received, negative when sent
    pub balance: f64,
    pub confirmations: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
