//! Balance derivation and transaction display helpers

use crate::models::Transaction;

/// Smallest balance ever displayed for a wallet with history
pub const MIN_DISPLAY_BALANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalletBalance {
    /// Balance to display
    pub balance: f64,
    /// True when the net position was negative and is shown as its absolute
    /// value
    pub is_normalized: bool,
    /// Net position before normalization; `None` for an empty history
    pub original_balance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Received,
    Sent,
}

impl Direction {
    pub fn of(balance: f64) -> Self {
        if balance >= 0.0 {
            Self::Received
        } else {
            Self::Sent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sent => "sent",
        }
    }
}

/// Net position of a transaction history, normalized for display
pub fn calculate_balance(transactions: &[Transaction]) -> WalletBalance {
    if transactions.is_empty() {
        return WalletBalance {
            balance: 0.0,
            is_normalized: false,
            original_balance: None,
        };
    }

    let net: f64 = transactions.iter().map(|tx| tx.balance).sum();
    WalletBalance {
        balance: net.abs().max(MIN_DISPLAY_BALANCE),
        is_normalized: net < 0.0,
        original_balance: Some(net),
    }
}

/// `+1.23 BTC` / `-0.50 BTC`
pub fn format_amount(balance: f64) -> String {
    let sign = if balance >= 0.0 { '+' } else { '-' };
    format!("{}{:.2} BTC", sign, balance.abs())
}
