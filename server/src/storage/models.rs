//! Persisted record types
//!
//! Field names follow the JSON documents on disk, which the client reads
//! verbatim (`iconURL`, `walletId`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub address: String,
    pub name: String,
    /// Empty until the wallet's first sync resolves a provider icon
    #[serde(rename = "iconURL", default)]
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub wallet_id: String,
    pub date: DateTime<Utc>,
    /// Positive when received, negative when sent
    pub balance: f64,
    pub confirmations: u32,
}

/// Round to a fixed number of decimal places, the way amounts are stored.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_uses_icon_url_key() {
        let wallet = Wallet {
            id: "w1".to_string(),
            address: "bc1qexample".to_string(),
            name: "Kraken".to_string(),
            icon_url: String::new(),
        };
        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["iconURL"], "");
        assert!(json.get("icon_url").is_none());
    }

    #[test]
    fn test_transaction_reads_javascript_iso_dates() {
        let raw = r#"{
            "id": "t1",
            "walletId": "w1",
            "date": "2024-03-05T10:20:30.123Z",
            "balance": -12.5,
            "confirmations": 3
        }"#;
        let tx: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.wallet_id, "w1");
        assert_eq!(tx.balance, -12.5);
        assert_eq!(tx.date.timestamp_millis() % 1000, 123);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.005001, 2), -0.01);
        assert_eq!(round_to(0.123456789, 8), 0.12345679);
    }
}
