//! Binary entry point: ledger inspection and replay tooling.
//!
//! Campaigns themselves are driven by the surrounding pipeline, which owns
//! the decision process and validation; this binary covers the pieces that
//! work from a checkpointed ledger alone.

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::Path;

use faultline::buffer::LineBuffer;
use faultline::cli::{CliArgs, Command};
use faultline::ledger::ChangeLedger;

fn main() -> Result<()> {
    faultline::trace::init();

    let args = CliArgs::parse();
    match args.command {
        Command::Inspect { ledger } => inspect(&ledger),
        Command::Replay {
            source,
            ledger,
            out,
        } => replay(&source, &ledger, &out),
    }
}

/// Print a campaign summary: region table, change totals per class.
fn inspect(path: &Path) -> Result<()> {
    let ledger = ChangeLedger::load(path)?;

    println!("ledger: {}", path.display());
    println!("regions: {}", ledger.regions().len());
    for (idx, region) in ledger.regions().iter().enumerate() {
        let attempted = ledger.changes_in_region(idx, true).len();
        let successful = ledger.changes_in_region(idx, false).len();
        println!(
            "  region {:>2}  lines {}-{}  {}/{} succeeded  {}",
            idx, region.start_line, region.end_line, successful, attempted, region.description
        );
    }

    let mut class_totals: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for change in ledger.changes() {
        let entry = class_totals.entry(change.mutation_class.as_str()).or_default();
        entry.0 += 1;
        if change.valid {
            entry.1 += 1;
        }
    }
    println!("changes: {}", ledger.changes().len());
    for (class, (attempted, successful)) in class_totals {
        println!("  {:<24} {}/{} succeeded", class, successful, attempted);
    }
    Ok(())
}

/// Re-apply a ledger's valid changes to a freshly loaded source file.
///
/// Each change is applied to every region whose bounds contain its line, so
/// overlapping regions stay in agreement when the partition is folded back
/// into one file.
fn replay(source: &Path, ledger_path: &Path, out: &Path) -> Result<()> {
    let ledger = ChangeLedger::load(ledger_path)?;
    let full = LineBuffer::from_file(source)?;
    let mut partition = ledger.extract_regions(&full);

    let mut applied = 0usize;
    for change in ledger.changes().iter().filter(|change| change.valid) {
        let mut hit = false;
        for (idx, region) in ledger.regions().iter().enumerate() {
            if change.line_idx >= region.start_line && change.line_idx <= region.end_line {
                partition[idx].apply_batch(vec![change.clone()]);
                hit = true;
            }
        }
        if hit {
            applied += 1;
        } else {
            tracing::warn!(
                "change at line {} falls outside every region; skipped",
                change.line_idx
            );
        }
    }

    let content = partition.materialize();
    std::fs::write(out, content)
        .with_context(|| format!("failed to write replayed source to {}", out.display()))?;
    println!("replayed {} changes into {}", applied, out.display());
    Ok(())
}
