//! Concurrent random-transfer load generator.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use summa_common::AccountId;
use summa_ledger::{Ledger, LedgerError};

use crate::metrics::TransferMetrics;

/// Options for a load run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Total transfers to issue across all workers.
    pub transfers: u64,
    /// Concurrent workers sharing the pool.
    pub concurrency: usize,
    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

/// Issue random transfers between existing accounts and collect metrics.
///
/// Each transfer picks a distinct debit/credit pair and an amount between
/// 1.00 and 1000.00, matching the original load script.
pub async fn run(ledger: &Ledger, options: LoadOptions) -> anyhow::Result<TransferMetrics> {
    let accounts = ledger.account_ids().await?;
    if accounts.len() < 2 {
        anyhow::bail!("not enough accounts in database; run create-accounts first");
    }

    info!(
        accounts = accounts.len(),
        transfers = options.transfers,
        concurrency = options.concurrency,
        "starting load run"
    );

    let concurrency = options.concurrency.max(1);
    let metrics = Arc::new(Mutex::new(TransferMetrics::new()));
    let accounts = Arc::new(accounts);
    let base_seed = options.seed.unwrap_or_else(rand::random);

    let mut handles = Vec::with_capacity(concurrency);
    for worker in 0..concurrency {
        // Spread the total across workers; the first workers absorb the
        // remainder.
        let share = options.transfers / concurrency as u64
            + u64::from((options.transfers % concurrency as u64) > worker as u64);

        let ledger = ledger.clone();
        let accounts = accounts.clone();
        let metrics = metrics.clone();
        let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(worker as u64));

        handles.push(tokio::spawn(async move {
            for _ in 0..share {
                let (from, to) = pick_pair(&mut rng, &accounts);
                let amount = Decimal::new(rng.gen_range(100..=100_000), 2);

                let start = Instant::now();
                match ledger.transfer_funds(from, to, amount).await {
                    Ok(_) => {
                        let latency = start.elapsed().as_millis() as u64;
                        metrics.lock().await.record_success(latency);
                    }
                    Err(LedgerError::RetriesExhausted { attempts }) => {
                        warn!(%from, %to, attempts, "transfer gave up under contention");
                        metrics.lock().await.record_failure();
                    }
                    Err(e) => {
                        warn!(%from, %to, error = %e, "transfer failed");
                        metrics.lock().await.record_failure();
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.await?;
    }

    let metrics = metrics.lock().await.clone();
    info!(
        committed = metrics.committed_transfers,
        failed = metrics.failed_transfers,
        "load run complete"
    );
    Ok(metrics)
}

/// Pick a distinct (debit, credit) pair at random.
fn pick_pair(rng: &mut StdRng, accounts: &[AccountId]) -> (AccountId, AccountId) {
    let from = accounts[rng.gen_range(0..accounts.len())];
    let mut to = from;
    while to == from {
        to = accounts[rng.gen_range(0..accounts.len())];
    }
    (from, to)
}
