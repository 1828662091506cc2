//! Command-line argument parsing for the campaign tooling.
//!
//! Supports:
//! - Summarizing a checkpointed ledger
//! - Replaying a ledger's valid changes onto a source file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fault-injection campaign ledger tooling
#[derive(Parser, Debug)]
#[command(
    name = "faultline",
    version,
    about = "Inspect and replay fault-injection campaign ledgers"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize a campaign ledger: regions, attempts, per-class counts
    Inspect {
        /// Path to the ledger JSON file
        ledger: PathBuf,
    },
    /// Re-apply a ledger's valid changes to a source file and write the result
    Replay {
        /// Source file the ledger was recorded against
        #[arg(long)]
        source: PathBuf,
        /// Path to the ledger JSON file
        #[arg(long)]
        ledger: PathBuf,
        /// Destination for the mutated file
        #[arg(long)]
        out: PathBuf,
    },
}
