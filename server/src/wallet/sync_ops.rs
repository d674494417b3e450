/// Synchronization operations
///
/// A sync fabricates a few recent transactions for a wallet, as if they had
/// just been discovered on chain.
use crate::error::TrackerError;
use crate::storage::{round_to, Storage, Transaction};
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

const RECEIVE_PROBABILITY: f64 = 0.7;
const MIN_AMOUNT: f64 = 0.01;
const MAX_RECEIVE: f64 = 2.5;
const MAX_SEND: f64 = 1.0;
const AMOUNT_DECIMALS: i32 = 8;
const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Sync a wallet: append 1-3 generated transactions and return only those.
pub fn sync_wallet(storage: &Storage, wallet_id: &str) -> Result<Vec<Transaction>, TrackerError> {
    let wallets = storage.read_wallets();
    if !wallets.iter().any(|w| w.id == wallet_id) {
        return Err(TrackerError::NotFound(wallet_id.to_string()));
    }

    let mut transactions = storage.read_transactions();
    let current_balance: f64 = transactions
        .iter()
        .filter(|t| t.wallet_id == wallet_id)
        .map(|t| t.balance)
        .sum();

    let new_transactions =
        generate_sync_transactions(&mut rand::thread_rng(), wallet_id, current_balance, Utc::now());

    transactions.extend(new_transactions.iter().cloned());
    storage.write_transactions(&transactions)?;

    log::info!(
        "Synced wallet {}: {} new transactions",
        wallet_id,
        new_transactions.len()
    );
    Ok(new_transactions)
}

/// Build the transactions a sync appends.
///
/// Sends are capped at `min(1.0, max(0.01, current_balance))`. The cap only
/// looks at the balance before this sync, so repeated syncs can still drive
/// the running balance below zero.
pub fn generate_sync_transactions<R: Rng>(
    rng: &mut R,
    wallet_id: &str,
    current_balance: f64,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let count = rng.gen_range(1..=3);
    let max_send = MAX_SEND.min(MIN_AMOUNT.max(current_balance));

    (0..count)
        .map(|index: i64| {
            let jitter = rng.gen_range(0..MILLIS_PER_DAY);
            let millis = now.timestamp_millis() - index * MILLIS_PER_DAY - jitter;
            let date = DateTime::from_timestamp_millis(millis).unwrap_or(now);

            let is_receive = rng.gen_bool(RECEIVE_PROBABILITY);
            let upper = if is_receive { MAX_RECEIVE } else { max_send };
            let amount = round_to(rng.gen_range(MIN_AMOUNT..=upper), AMOUNT_DECIMALS);

            Transaction {
                id: Uuid::new_v4().to_string(),
                wallet_id: wallet_id.to_string(),
                date,
                balance: if is_receive { amount } else { -amount },
                confirmations: rng.gen_range(1..=6),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_transactions_within_bounds() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let txs = generate_sync_transactions(&mut rng, "w1", 100.0, now);
            assert!((1..=3).contains(&txs.len()));
            for (index, tx) in txs.iter().enumerate() {
                assert_eq!(tx.wallet_id, "w1");
                assert!((1..=6).contains(&tx.confirmations));
                assert!(tx.balance.abs() >= MIN_AMOUNT);
                if tx.balance > 0.0 {
                    assert!(tx.balance <= MAX_RECEIVE);
                } else {
                    assert!(tx.balance >= -MAX_SEND);
                }

                let age = now - tx.date;
                assert!(age >= Duration::days(index as i64));
                assert!(age < Duration::days(index as i64 + 1));
            }
        }
    }

    #[test]
    fn test_send_cap_follows_small_balance() {
        let mut rng = StdRng::seed_from_u64(3);
        let sends: Vec<f64> = (0..500)
            .flat_map(|_| generate_sync_transactions(&mut rng, "w1", 0.25, Utc::now()))
            .filter(|t| t.balance < 0.0)
            .map(|t| t.balance)
            .collect();

        assert!(!sends.is_empty());
        assert!(sends.iter().all(|b| *b >= -0.25));
    }

    #[test]
    fn test_negative_balance_sends_minimum() {
        let mut rng = StdRng::seed_from_u64(9);
        let sends: Vec<f64> = (0..500)
            .flat_map(|_| generate_sync_transactions(&mut rng, "w1", -40.0, Utc::now()))
            .filter(|t| t.balance < 0.0)
            .map(|t| t.balance)
            .collect();

        assert!(!sends.is_empty());
        assert!(sends.iter().all(|b| *b == -MIN_AMOUNT));
    }

    #[test]
    fn test_receive_ratio_near_seventy_percent() {
        let mut rng = StdRng::seed_from_u64(11);
        let txs: Vec<Transaction> = (0..5_000)
            .flat_map(|_| generate_sync_transactions(&mut rng, "w1", 10.0, Utc::now()))
            .collect();
        let received = txs.iter().filter(|t| t.balance > 0.0).count() as f64;
        let ratio = received / txs.len() as f64;
        assert!((0.66..0.74).contains(&ratio), "ratio was {}", ratio);
    }
}
