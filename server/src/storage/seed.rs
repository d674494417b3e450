//! Synthetic sample data for first-run population
//!
//! The default plan produces three wallets with 10, 20 and 156,000
//! transactions. Rows are generated in fixed-size batches so progress can be
//! reported while the large wallet is built.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use uuid::Uuid;

use super::models::{round_to, Transaction, Wallet};

pub const TRANSACTION_BATCH_SIZE: usize = 1000;
const PROGRESS_EVERY: usize = 10_000;

/// One seeded wallet and the shape of its transaction history
#[derive(Debug, Clone)]
pub struct SeedWallet {
    pub address: String,
    pub name: String,
    pub icon_url: String,
    pub transaction_count: usize,
    /// Symmetric balance bound: amounts fall in `[-max_amount, max_amount]`
    pub max_amount: f64,
}

#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub wallets: Vec<SeedWallet>,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub batch_size: usize,
}

fn utc_midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

impl Default for SeedPlan {
    fn default() -> Self {
        let icon = |file: &str| {
            format!(
                "https://coin-tracker-public.s3.us-west-1.amazonaws.com/crypto-icons/icons/{}",
                file
            )
        };

        Self {
            wallets: vec![
                SeedWallet {
                    address: "3E8ociqZa9mZUSwGdSmAEMAoAxBK3FNDcd".to_string(),
                    name: "Coinbase".to_string(),
                    icon_url: icon("coinbase-wallet.svg"),
                    transaction_count: 10,
                    max_amount: 1000.0,
                },
                SeedWallet {
                    address: "bc1q0sg9rdst255gtldsmcf8rk0764avqy2h2ksqs5".to_string(),
                    name: "Kraken".to_string(),
                    icon_url: icon("kraken.svg"),
                    transaction_count: 20,
                    max_amount: 2000.0,
                },
                SeedWallet {
                    address: "bc1qm34lsc65zpw79lxes69zkqmk6ee3ewf0j77s3h".to_string(),
                    name: "Phantom".to_string(),
                    icon_url: icon("phantom_new.svg"),
                    transaction_count: 156_000,
                    max_amount: 5000.0,
                },
            ],
            date_from: utc_midnight(2023, 1, 1),
            date_to: utc_midnight(2024, 12, 31),
            batch_size: TRANSACTION_BATCH_SIZE,
        }
    }
}

impl SeedPlan {
    pub fn total_transactions(&self) -> usize {
        self.wallets.iter().map(|w| w.transaction_count).sum()
    }
}

/// Generate the wallets and transactions described by `plan`.
pub fn generate_sample_data<R: Rng>(plan: &SeedPlan, rng: &mut R) -> (Vec<Wallet>, Vec<Transaction>) {
    let wallets: Vec<Wallet> = plan
        .wallets
        .iter()
        .map(|seed| Wallet {
            id: Uuid::new_v4().to_string(),
            address: seed.address.clone(),
            name: seed.name.clone(),
            icon_url: seed.icon_url.clone(),
        })
        .collect();

    let mut transactions = Vec::with_capacity(plan.total_transactions());
    let batch_size = plan.batch_size.max(1);

    for (wallet, seed) in wallets.iter().zip(&plan.wallets) {
        if seed.transaction_count > PROGRESS_EVERY {
            log::info!(
                "   Generating {} transactions for {}...",
                seed.transaction_count,
                seed.address
            );
        }

        let mut generated = 0;
        while generated < seed.transaction_count {
            let batch = batch_size.min(seed.transaction_count - generated);
            transactions.extend((0..batch).map(|_| random_transaction(plan, seed, &wallet.id, rng)));

            if seed.transaction_count > PROGRESS_EVERY && generated % PROGRESS_EVERY == 0 {
                log::info!("   Generated {} transactions...", generated + batch);
            }
            generated += batch;
        }
    }

    (wallets, transactions)
}

fn random_transaction<R: Rng>(
    plan: &SeedPlan,
    seed: &SeedWallet,
    wallet_id: &str,
    rng: &mut R,
) -> Transaction {
    let from = plan.date_from.timestamp_millis();
    let to = plan.date_to.timestamp_millis().max(from);
    let millis = rng.gen_range(from..=to);

    Transaction {
        id: Uuid::new_v4().to_string(),
        wallet_id: wallet_id.to_string(),
        date: DateTime::from_timestamp_millis(millis).unwrap_or(plan.date_from),
        balance: round_to(rng.gen_range(-seed.max_amount..=seed.max_amount), 2),
        confirmations: rng.gen_range(1..=10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_plan() -> SeedPlan {
        let mut plan = SeedPlan::default();
        plan.wallets[2].transaction_count = 2_500;
        plan
    }

    #[test]
    fn test_default_plan_shape() {
        let plan = SeedPlan::default();
        let counts: Vec<usize> = plan.wallets.iter().map(|w| w.transaction_count).collect();
        assert_eq!(counts, vec![10, 20, 156_000]);
        assert_eq!(plan.total_transactions(), 156_030);
        assert_eq!(plan.batch_size, 1000);
    }

    #[test]
    fn test_generated_rows_respect_plan_bounds() {
        let plan = small_plan();
        let mut rng = StdRng::seed_from_u64(7);
        let (wallets, transactions) = generate_sample_data(&plan, &mut rng);

        assert_eq!(wallets.len(), 3);
        assert_eq!(transactions.len(), 2_530);

        for (wallet, seed) in wallets.iter().zip(&plan.wallets) {
            let rows: Vec<_> = transactions
                .iter()
                .filter(|t| t.wallet_id == wallet.id)
                .collect();
            assert_eq!(rows.len(), seed.transaction_count);
            for tx in rows {
                assert!(tx.balance.abs() <= seed.max_amount);
                assert!((1..=10).contains(&tx.confirmations));
                assert!(tx.date >= plan.date_from && tx.date <= plan.date_to);
                assert_eq!(round_to(tx.balance, 2), tx.balance);
            }
        }
    }

    #[test]
    fn test_partial_final_batch() {
        let mut plan = small_plan();
        plan.wallets.truncate(1);
        plan.wallets[0].transaction_count = 2_345;
        plan.batch_size = 1000;

        let mut rng = StdRng::seed_from_u64(1);
        let (_, transactions) = generate_sample_data(&plan, &mut rng);
        assert_eq!(transactions.len(), 2_345);
    }
}
