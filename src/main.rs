//! Concurrent Accounts CLI
//!
//! Runs account workloads against shared, lock-guarded accounts and prints
//! a summary of each run.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --scenario stress --runner pool --workers 8
//! cargo run -- --scenario all --seed 42 --audit-file audit.log --balances-csv balances.csv
//! cargo run -- --scenario listing --listing-dir /usr/bin
//! RUST_LOG=debug cargo run -- --scenario synchronization
//! ```
//!
//! The audit trail goes to stdout unless `--audit-file` is given; summaries
//! go to stdout; diagnostics go to stderr, filtered by `RUST_LOG`.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (audit file not writable, listing command failed, task panicked, etc.)

use rust_concurrent_accounts::cli;
use rust_concurrent_accounts::core::{AuditSink, WriterAuditLog};
use rust_concurrent_accounts::types::BankError;
use std::process;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Diagnostics on stderr so stdout stays audit trail and summaries
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), BankError> {
    let audit: Arc<dyn AuditSink> = match &args.audit_file {
        Some(path) => Arc::new(WriterAuditLog::create(path)?),
        None => Arc::new(WriterAuditLog::stdout()),
    };

    let mut output = std::io::stdout();
    cli::run_scenarios(args, audit, &mut output)?;
    Ok(())
}
