//! Protocol state machine driving one mutation campaign over one source file.
//!
//! One cycle runs select-region, select-mutation, apply-mutation; external
//! validation then decides whether the campaign keeps the edit or calls
//! [`MutationCoordinator::undo_mutation`]. The coordinator is the only place
//! where the in-memory text, the per-region undo history, and the durable
//! ledger are updated together.
//!
//! Retry discipline lives in the caller: a failed or abstained cycle leaves
//! no local state mutated, so the surrounding campaign loop may simply run
//! another cycle.

use crate::buffer::LineBuffer;
use crate::catalog::MutationCatalog;
use crate::history::Change;
use crate::ledger::ChangeLedger;
use crate::oracle::{
    DecisionOracle, MutationQuery, RegionQuery, RegionSummary, RewriteContext, RewriteQuery,
};
use crate::partition::Partition;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Cap on successful and failed examples sampled into decision context.
const EXAMPLE_SAMPLES: usize = 6;

/// Evenly spaced subset of at most `k` items, spanning the whole list.
///
/// Index spacing is deterministic (`round(i * (n-1) / (k-1))`) so the
/// decision process sees temporally representative examples rather than just
/// the most recent ones.
pub fn even_subset<T: Clone>(items: &[T], k: usize) -> Vec<T> {
    if k == 0 || items.is_empty() {
        return Vec::new();
    }
    if k >= items.len() {
        return items.to_vec();
    }
    if k == 1 {
        return vec![items[0].clone()];
    }
    let n = items.len();
    (0..k)
        .map(|i| {
            let idx = (i as f64 * (n - 1) as f64 / (k - 1) as f64).round() as usize;
            items[idx].clone()
        })
        .collect()
}

/// Orchestrates the select/apply/commit-or-rollback protocol for one file.
pub struct MutationCoordinator {
    oracle: Box<dyn DecisionOracle>,
    catalog: MutationCatalog,
    partition: Partition,
    ledger: ChangeLedger,
    /// Region choices made so far, oldest first; context for later calls
    region_trail: Vec<usize>,
    /// Regions holding not-yet-rejected local edits, in commit order
    mutated_regions: Vec<usize>,
    /// Completed apply cycles, used to number the marker comments
    attempts: usize,
}

impl MutationCoordinator {
    /// Start a fresh campaign: build a partition from externally supplied
    /// region boundaries and open an empty ledger.
    pub fn new(
        oracle: Box<dyn DecisionOracle>,
        catalog: MutationCatalog,
        full: &LineBuffer,
        regions: &[(usize, usize, String)],
    ) -> Self {
        let mut partition = Partition::new(full);
        for (start_line, end_line, description) in regions {
            partition.add_region(*start_line, *end_line, description);
        }
        let ledger = ChangeLedger::new(&partition);
        Self {
            oracle,
            catalog,
            partition,
            ledger,
            region_trail: Vec::new(),
            mutated_regions: Vec::new(),
            attempts: 0,
        }
    }

    /// Resume a campaign from a checkpointed ledger: the stored boundary
    /// snapshot is replayed against the freshly loaded buffer, so region
    /// discovery never runs twice for the same file.
    pub fn resume(
        oracle: Box<dyn DecisionOracle>,
        catalog: MutationCatalog,
        full: &LineBuffer,
        ledger: ChangeLedger,
    ) -> Self {
        let partition = ledger.extract_regions(full);
        Self {
            oracle,
            catalog,
            partition,
            ledger,
            region_trail: Vec::new(),
            mutated_regions: Vec::new(),
            attempts: 0,
        }
    }

    fn region_summaries(&self) -> Vec<RegionSummary> {
        self.partition
            .iter()
            .enumerate()
            .map(|(idx, region)| RegionSummary {
                region_idx: idx,
                description: region.description.clone(),
                region_length: region.line_count(),
                num_mutations_attempted: self.ledger.changes_in_region(idx, true).len(),
                num_mutations_successful: self.ledger.changes_in_region(idx, false).len(),
            })
            .collect()
    }

    fn example_strings(changes: &[&Change], valid: bool) -> Vec<String> {
        let rendered: Vec<String> = changes
            .iter()
            .filter(|change| change.valid == valid)
            .map(|change| change.to_string())
            .collect();
        even_subset(&rendered, EXAMPLE_SAMPLES)
    }

    /// SELECT_REGION: ask the oracle to choose a region, informed by
    /// per-region attempt statistics from the ledger.
    ///
    /// Pure read of ledger and partition. An out-of-bounds choice is a hard
    /// failure with nothing mutated, so the caller may retry freely.
    pub fn select_region(&mut self) -> Result<usize> {
        let query = RegionQuery {
            summaries: self.region_summaries(),
            catalog: self.catalog.to_string(),
            trail: self.region_trail.clone(),
        };
        let choice = self
            .oracle
            .select_region(&query)
            .context("region selection failed")?;
        if choice.region_idx >= self.partition.len() {
            bail!(
                "oracle chose region {} but only {} regions exist",
                choice.region_idx,
                self.partition.len()
            );
        }
        tracing::debug!(
            "selected region {}: {}",
            choice.region_idx,
            choice.justification
        );
        self.region_trail.push(choice.region_idx);
        Ok(choice.region_idx)
    }

    /// SELECT_MUTATION + APPLY_MUTATION for a previously chosen region.
    ///
    /// Returns `Ok(None)` when the oracle abstains; nothing has been mutated
    /// in that case. On success the edit is committed locally (region buffer
    /// + undo stack) and appended to the ledger; external validation decides
    /// later whether it stays or gets rolled back via
    /// [`Self::undo_mutation`].
    pub fn mutate_region(&mut self, region_idx: usize) -> Result<Option<Change>> {
        if region_idx >= self.partition.len() {
            bail!(
                "region index {} out of range ({} regions)",
                region_idx,
                self.partition.len()
            );
        }

        let region_changes = self.ledger.changes_in_region(region_idx, true);
        let query = MutationQuery {
            region_text: self.partition[region_idx].content(true, 0, false),
            catalog: self.catalog.to_string(),
            success_examples: Self::example_strings(&region_changes, true),
            failed_examples: Self::example_strings(&region_changes, false),
        };
        let choice = self
            .oracle
            .select_mutation(&query)
            .context("mutation selection failed")?;
        if choice.rollback {
            tracing::debug!("oracle abstained on region {}", region_idx);
            return Ok(None);
        }

        let Some(class) = self.catalog.find_by_name(choice.mutation_class.trim()) else {
            bail!(
                "oracle chose unknown mutation class {:?}",
                choice.mutation_class
            );
        };
        let class = class.clone();
        let instructions = class.instructions()?;

        let class_changes = self.ledger.changes_by_class(&class.name, true);
        let success_examples = Self::example_strings(&class_changes, true);
        let failed_examples = Self::example_strings(&class_changes, false);

        let region = &self.partition[region_idx];
        let context = if class.isolated {
            RewriteContext::Isolated {
                line: region.line(choice.line).to_string(),
            }
        } else {
            RewriteContext::Dependent {
                region_text: region.content(true, 0, false),
                line_number: choice.line,
                line: region.line(choice.line).to_string(),
            }
        };
        let query = RewriteQuery {
            mutation_class: class.name.clone(),
            instructions,
            context,
            success_examples,
            failed_examples,
        };
        let rewrite = self
            .oracle
            .mutate_line(&query)
            .context("line rewrite failed")?;

        self.attempts += 1;
        let comment = format!("BUG_{}: inserted {} fault", self.attempts, class.name);
        let change = self.partition[region_idx].apply_change(
            choice.line,
            &rewrite.mutated_line,
            &class.name,
            &rewrite.summary,
            Some(&comment),
        );
        self.ledger.add_changes(vec![change.clone()]);
        self.mutated_regions.push(region_idx);
        tracing::info!(
            "applied {} to line {} in region {}",
            class.name,
            change.line_idx,
            region_idx
        );
        Ok(Some(change))
    }

    /// Run one full decision cycle: choose a region, then try to mutate it.
    /// `Ok(None)` means the oracle abstained and nothing changed.
    pub fn attempt_mutation(&mut self) -> Result<Option<Change>> {
        let region_idx = self.select_region()?;
        self.mutate_region(region_idx)
    }

    /// Roll back the most recent committed mutation: undo the owning
    /// region's local edit and invalidate the matching ledger entry as one
    /// logical unit. Both views agree after the call. Returns `false` when
    /// there is nothing to undo.
    pub fn undo_mutation(&mut self) -> bool {
        let Some(region_idx) = self.mutated_regions.pop() else {
            tracing::debug!("no mutations to undo");
            return false;
        };
        self.partition[region_idx].undo();
        self.ledger.invalidate_last_change();
        true
    }

    /// Fold all region edits into the full buffer and return the complete
    /// file content.
    pub fn materialize(&mut self) -> String {
        self.partition.materialize()
    }

    /// Materialize and write the mutated file to `path`.
    pub fn write_output(&mut self, path: &Path) -> Result<()> {
        let content = self.materialize();
        std::fs::write(path, content)
            .with_context(|| format!("failed to write mutated source to {}", path.display()))?;
        Ok(())
    }

    /// Checkpoint the ledger to `path`. Persistence is always explicit; an
    /// edit committed after the last checkpoint lives only in memory until
    /// the next one.
    pub fn checkpoint(&self, path: &Path) -> Result<()> {
        self.ledger.save(path)
    }

    /// The campaign ledger.
    pub fn ledger(&self) -> &ChangeLedger {
        &self.ledger
    }

    /// The region partition in its current edited state.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Region choices made so far, oldest first.
    pub fn region_trail(&self) -> &[usize] {
        &self.region_trail
    }

    /// Completed apply cycles.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}
