//! Summa Simulator
//!
//! External driver for the ledger library: schema bootstrap, account
//! seeding, concurrent random-transfer load, and the integrity probe.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod driver;
mod metrics;

use driver::LoadOptions;
use summa_ledger::{schema, Ledger, LockStrategy};

/// Summa load driver CLI
#[derive(Parser, Debug)]
#[command(name = "summa-sim")]
#[command(about = "Summa ledger load driver and integrity probe")]
struct Args {
    /// Database connection URL
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the ledger tables if they do not exist
    InitSchema,
    /// Seed numbered test accounts with zero balances
    CreateAccounts {
        /// Number of accounts to create
        #[arg(long, default_value = "100")]
        count: u32,
    },
    /// Issue random concurrent transfers between existing accounts
    RandomTransfers {
        /// Total transfers across all workers
        #[arg(long, default_value = "1000")]
        transfers: u64,

        /// Concurrent workers
        #[arg(long, default_value = "8")]
        concurrency: usize,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Use the coarse table-exclusive lock instead of row locks
        #[arg(long)]
        coarse: bool,

        /// Print the metrics summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Assert that the balances cache sums to exactly 0.00
    Verify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let ledger = Ledger::connect(&args.database_url).await?;

    match args.command {
        Command::InitSchema => {
            schema::init(ledger.pool()).await?;
            info!("schema ready");
        }
        Command::CreateAccounts { count } => {
            for i in 0..count {
                ledger
                    .create_account(&format!("test_account_{i:04}"))
                    .await?;
            }
            info!(count, "accounts created");
        }
        Command::RandomTransfers {
            transfers,
            concurrency,
            seed,
            coarse,
            json,
        } => {
            let ledger = if coarse {
                ledger.with_lock_strategy(LockStrategy::TableExclusive)
            } else {
                ledger
            };

            let metrics = driver::run(
                &ledger,
                LoadOptions {
                    transfers,
                    concurrency,
                    seed,
                },
            )
            .await?;

            let summary = metrics.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                info!("Total transfers: {}", summary.total_transfers);
                info!("Committed: {}", summary.committed_transfers);
                info!("Failed: {}", summary.failed_transfers);
                info!("Average latency: {}ms", summary.average_latency_ms);
                info!("p99 latency: {}ms", summary.p99_latency_ms);
            }
        }
        Command::Verify => {
            let total = ledger.balance_total().await?;
            if total != Decimal::ZERO {
                anyhow::bail!("ledger out of balance: sum(balance) = {total}");
            }
            info!(%total, "ledger in balance");
        }
    }

    Ok(())
}
