//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

use faultline::buffer::LineBuffer;
use faultline::catalog::MutationCatalog;
use faultline::oracle::{
    DecisionOracle, LineRewrite, MutationChoice, MutationQuery, RegionChoice, RegionQuery,
    RewriteQuery,
};

/// A small counter module in the style of the sources the real pipeline
/// mutates. Lines 1-5 are the ports, lines 6-11 the sequential logic.
pub const COUNTER_SRC: &str = "\
module counter (
  input clk,
  input rst,
  output reg [3:0] count
);
  always @(posedge clk) begin
    if (rst)
      count <= 4'b0000;
    else
      count <= count + 1;
  end
endmodule";

/// Region boundaries matching [`COUNTER_SRC`].
pub fn counter_regions() -> Vec<(usize, usize, String)> {
    vec![
        (1, 5, "port declarations".to_string()),
        (6, 11, "sequential counter logic".to_string()),
    ]
}

/// Full-file buffer over [`COUNTER_SRC`].
pub fn counter_buffer() -> LineBuffer {
    LineBuffer::from_content("counter.v", COUNTER_SRC, None, None)
}

/// The catalog shipped under `samples/mutations`, exercising the YAML index
/// loader on every run.
pub fn sample_catalog() -> MutationCatalog {
    let dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/samples/mutations"));
    MutationCatalog::load(dir).expect("sample mutation catalog should load")
}

/// Everything the scripted oracle was asked, for asserting on the context
/// the coordinator builds.
#[derive(Debug, Default)]
pub struct Transcript {
    pub region_queries: Vec<RegionQuery>,
    pub mutation_queries: Vec<MutationQuery>,
    pub rewrite_queries: Vec<RewriteQuery>,
}

/// Deterministic oracle that plays back queued responses and records every
/// query it sees.
#[derive(Default)]
pub struct ScriptedOracle {
    region_choices: VecDeque<RegionChoice>,
    mutation_choices: VecDeque<MutationChoice>,
    rewrites: VecDeque<LineRewrite>,
    transcript: Rc<RefCell<Transcript>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting recorded queries after the oracle has been
    /// moved into a coordinator.
    pub fn transcript(&self) -> Rc<RefCell<Transcript>> {
        Rc::clone(&self.transcript)
    }

    /// Queue a region choice.
    pub fn choose_region(mut self, region_idx: usize) -> Self {
        self.region_choices.push_back(RegionChoice {
            region_idx,
            justification: "scripted".to_string(),
        });
        self
    }

    /// Queue a line + class choice.
    pub fn choose_line(mut self, line: usize, mutation_class: &str) -> Self {
        self.mutation_choices.push_back(MutationChoice {
            rollback: false,
            line,
            mutation_class: mutation_class.to_string(),
            justification: "scripted".to_string(),
        });
        self
    }

    /// Queue an abstain answer.
    pub fn abstain(mut self) -> Self {
        self.mutation_choices.push_back(MutationChoice {
            rollback: true,
            line: 0,
            mutation_class: String::new(),
            justification: "nothing left to break here".to_string(),
        });
        self
    }

    /// Queue a line rewrite.
    pub fn rewrite(mut self, mutated_line: &str, summary: &str) -> Self {
        self.rewrites.push_back(LineRewrite {
            mutated_line: mutated_line.to_string(),
            summary: summary.to_string(),
            justification: "scripted".to_string(),
        });
        self
    }
}

impl DecisionOracle for ScriptedOracle {
    fn select_region(&mut self, query: &RegionQuery) -> Result<RegionChoice> {
        self.transcript
            .borrow_mut()
            .region_queries
            .push(query.clone());
        self.region_choices
            .pop_front()
            .ok_or_else(|| anyhow!("scripted oracle has no region choices left"))
    }

    fn select_mutation(&mut self, query: &MutationQuery) -> Result<MutationChoice> {
        self.transcript
            .borrow_mut()
            .mutation_queries
            .push(query.clone());
        self.mutation_choices
            .pop_front()
            .ok_or_else(|| anyhow!("scripted oracle has no mutation choices left"))
    }

    fn mutate_line(&mut self, query: &RewriteQuery) -> Result<LineRewrite> {
        self.transcript
            .borrow_mut()
            .rewrite_queries
            .push(query.clone());
        self.rewrites
            .pop_front()
            .ok_or_else(|| anyhow!("scripted oracle has no rewrites left"))
    }
}
