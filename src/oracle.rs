//! The decision seam: queries handed to the external decision process and
//! the strongly-typed answers expected back.
//!
//! The engine never talks to a model directly. Everything it needs from the
//! outside world goes through [`DecisionOracle`], which is passed into the
//! coordinator explicitly so a deterministic stub can drive the whole
//! protocol in tests. Loosely-typed transport blobs (JSON from an HTTP
//! round-trip, usually) are converted with the `from_json` constructors,
//! which fail hard on missing or unexpected fields at the call site instead
//! of letting a malformed answer leak deeper into the pipeline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Per-region statistics shown when asking for a region choice.
#[derive(Debug, Clone, Serialize)]
pub struct RegionSummary {
    pub region_idx: usize,
    pub description: String,
    pub region_length: usize,
    pub num_mutations_attempted: usize,
    pub num_mutations_successful: usize,
}

/// Context for a region selection round.
#[derive(Debug, Clone)]
pub struct RegionQuery {
    pub summaries: Vec<RegionSummary>,
    /// Rendered catalog listing (one numbered line per class)
    pub catalog: String,
    /// Region choices made earlier in the campaign, oldest first
    pub trail: Vec<usize>,
}

/// Context for a line + mutation class selection round.
#[derive(Debug, Clone)]
pub struct MutationQuery {
    /// Lineated text of the chosen region
    pub region_text: String,
    /// Rendered catalog listing
    pub catalog: String,
    /// Evenly sampled renderings of prior successful changes in the region
    pub success_examples: Vec<String>,
    /// Evenly sampled renderings of prior failed changes in the region
    pub failed_examples: Vec<String>,
}

/// What the rewrite call gets to look at, governed by the mutation class's
/// `isolated` flag.
#[derive(Debug, Clone)]
pub enum RewriteContext {
    /// Only the target line
    Isolated { line: String },
    /// The whole region plus the target line number
    Dependent {
        region_text: String,
        line_number: usize,
        line: String,
    },
}

/// Context for a line rewrite round.
#[derive(Debug, Clone)]
pub struct RewriteQuery {
    pub mutation_class: String,
    /// Instruction text loaded from the class's instruction file
    pub instructions: String,
    pub context: RewriteContext,
    /// Evenly sampled renderings of prior successes for this class
    pub success_examples: Vec<String>,
    /// Evenly sampled renderings of prior failures for this class
    pub failed_examples: Vec<String>,
}

/// Answer to a region selection round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionChoice {
    pub region_idx: usize,
    pub justification: String,
}

/// Answer to a mutation selection round.
///
/// `rollback` is the abstain signal: the region admits no further mutation
/// and nothing should be changed this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MutationChoice {
    pub rollback: bool,
    pub line: usize,
    pub mutation_class: String,
    pub justification: String,
}

/// Answer to a line rewrite round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineRewrite {
    pub mutated_line: String,
    pub summary: String,
    pub justification: String,
}

impl RegionChoice {
    /// Validate a loosely-typed transport blob. Missing or unknown fields
    /// fail here, at the call site.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).context("malformed region selection response")
    }
}

impl MutationChoice {
    /// Validate a loosely-typed transport blob. Missing or unknown fields
    /// fail here, at the call site.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).context("malformed mutation selection response")
    }
}

impl LineRewrite {
    /// Validate a loosely-typed transport blob. Missing or unknown fields
    /// fail here, at the call site.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).context("malformed line rewrite response")
    }
}

/// The external decision process consumed, never implemented, by this crate.
///
/// Calls are blocking synchronous round-trips; timeouts and cancellation are
/// the caller's responsibility.
pub trait DecisionOracle {
    /// Pick a region to mutate next.
    fn select_region(&mut self, query: &RegionQuery) -> Result<RegionChoice>;

    /// Pick a target line and mutation class within a region, or abstain.
    fn select_mutation(&mut self, query: &MutationQuery) -> Result<MutationChoice>;

    /// Rewrite the target line according to the mutation class instructions.
    fn mutate_line(&mut self, query: &RewriteQuery) -> Result<LineRewrite>;
}
