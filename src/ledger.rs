//! Durable, append-only record of every change applied to a source file.
//!
//! The ledger outlives any in-memory [`Partition`]: it is checkpointed to
//! disk explicitly and reloaded to resume a campaign. Alongside the changes
//! it stores a snapshot of the region boundaries taken once at creation, so
//! region discovery never has to run twice for the same file.
//!
//! Persistence is versioned JSON. Checkpointing is always caller-triggered;
//! a crash between a locally committed edit and the next checkpoint loses
//! that edit from durable storage (but not from the in-memory partition).

use crate::buffer::LineBuffer;
use crate::history::Change;
use crate::partition::Partition;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Region boundary triple stored alongside the changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default)]
    pub description: String,
}

/// Append-only change record for one source file, plus the region snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeLedger {
    /// Schema version tag, checked on load to detect format skew between
    /// campaign runs
    #[serde(default)]
    pub version: u32,
    changes: Vec<Change>,
    regions: Vec<RegionSnapshot>,
}

impl ChangeLedger {
    pub const CURRENT_VERSION: u32 = 1;

    /// Create an empty ledger carrying the region boundaries of `partition`.
    pub fn new(partition: &Partition) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            changes: Vec::new(),
            regions: partition
                .iter()
                .map(|region| RegionSnapshot {
                    start_line: region.start_line(),
                    end_line: region.end_line(),
                    description: region.description.clone(),
                })
                .collect(),
        }
    }

    /// Every change ever recorded, oldest first, including invalidated ones.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// The stored region boundary snapshot.
    pub fn regions(&self) -> &[RegionSnapshot] {
        &self.regions
    }

    /// Append changes to the ledger. Additions only; no removal operation
    /// exists.
    pub fn add_changes(&mut self, new_changes: Vec<Change>) {
        self.changes.extend(new_changes);
    }

    /// Changes whose line falls inside the `region_idx`-th snapshot's bounds,
    /// ascending by line number. Invalid entries are excluded unless
    /// requested. An unknown region index yields an empty list.
    pub fn changes_in_region(&self, region_idx: usize, include_invalid: bool) -> Vec<&Change> {
        let Some(region) = self.regions.get(region_idx) else {
            return Vec::new();
        };
        let mut matches: Vec<&Change> = self
            .changes
            .iter()
            .filter(|change| {
                change.line_idx >= region.start_line
                    && change.line_idx <= region.end_line
                    && (include_invalid || change.valid)
            })
            .collect();
        matches.sort_by_key(|change| change.line_idx);
        matches
    }

    /// Changes of one mutation class, ascending by line number.
    pub fn changes_by_class(&self, mutation_class: &str, include_invalid: bool) -> Vec<&Change> {
        let mut matches: Vec<&Change> = self
            .changes
            .iter()
            .filter(|change| {
                change.mutation_class == mutation_class && (include_invalid || change.valid)
            })
            .collect();
        matches.sort_by_key(|change| change.line_idx);
        matches
    }

    /// Flip the most recent still-valid entry to invalid.
    ///
    /// Invalidation is a soft delete; the entry stays in the ledger. No-op
    /// when every entry has already been invalidated. At most one pending
    /// rejection is outstanding at a time, so the tail scan is O(n) over a
    /// campaign bounded to hundreds of changes.
    pub fn invalidate_last_change(&mut self) {
        if let Some(change) = self.changes.iter_mut().rev().find(|change| change.valid) {
            change.valid = false;
        }
    }

    /// Rebuild a partition by replaying the stored boundary snapshot against
    /// a freshly loaded full buffer. Resumes a checkpointed session without
    /// re-running region discovery.
    pub fn extract_regions(&self, full: &LineBuffer) -> Partition {
        let mut partition = Partition::new(full);
        for region in &self.regions {
            partition.add_region(region.start_line, region.end_line, &region.description);
        }
        partition
    }

    /// Write the ledger to `path` as versioned JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(self).context("failed to serialize change ledger")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write change ledger to {}", path.display()))?;
        tracing::info!(
            "checkpointed {} changes to {}",
            self.changes.len(),
            path.display()
        );
        Ok(())
    }

    /// Read a ledger back from `path`. A schema version mismatch is a hard
    /// error rather than a best-effort parse.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read change ledger from {}", path.display()))?;
        let ledger: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse change ledger at {}", path.display()))?;
        if ledger.version != Self::CURRENT_VERSION {
            bail!(
                "change ledger at {} has schema version {} (expected {})",
                path.display(),
                ledger.version,
                Self::CURRENT_VERSION
            );
        }
        Ok(ledger)
    }
}
