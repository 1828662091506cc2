//! Change records and per-buffer undo/redo history.
//!
//! A `Change` is the atomic unit of mutation: one line replaced by another.
//! `EditHistory` keeps the classic two-stack undo/redo model; recording a new
//! change always clears the redo stack.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single line-level change applied to a buffer.
///
/// `valid` is a soft-delete flag: a change rejected by downstream validation
/// is marked invalid but never removed, so the audit trail stays complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Absolute 1-based line number the change applies to
    pub line_idx: usize,
    /// Line content before the change
    pub old_line: String,
    /// Line content after the change
    pub new_line: String,
    /// Mutation class that produced this change (empty for plain text edits)
    #[serde(default)]
    pub mutation_class: String,
    /// Human-readable summary of what changed
    #[serde(default)]
    pub description: String,
    /// Name of the source file the change belongs to
    #[serde(default)]
    pub source_file: String,
    /// False once the change has been rejected by validation
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

impl Change {
    /// Create a change with full mutation metadata.
    pub fn new(
        line_idx: usize,
        old_line: String,
        new_line: String,
        mutation_class: String,
        description: String,
        source_file: String,
    ) -> Self {
        Self {
            line_idx,
            old_line,
            new_line,
            mutation_class,
            description,
            source_file,
            valid: true,
        }
    }

    /// Create a bare text edit with no mutation metadata.
    ///
    /// Used when folding an edited region's text back into the full buffer.
    pub fn edit(line_idx: usize, old_line: &str, new_line: &str) -> Self {
        Self::new(
            line_idx,
            old_line.to_string(),
            new_line.to_string(),
            String::new(),
            String::new(),
            String::new(),
        )
    }
}

impl fmt::Display for Change {
    /// Render the historical-example form shown to the decision process.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on line {}: {}\n\t- {}\n\t+ {}",
            self.mutation_class, self.line_idx, self.description, self.old_line, self.new_line
        )?;
        if !self.valid {
            write!(f, "\n\tFAILED")?;
        }
        Ok(())
    }
}

/// Edit history with undo/redo stacks.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo_stack: Vec<Change>,
    redo_stack: Vec<Change>,
}

impl EditHistory {
    /// Create an empty history. Every buffer gets its own fresh stacks;
    /// histories are never shared between instances.
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Record an applied change (clears the redo stack).
    pub fn push(&mut self, change: Change) {
        self.redo_stack.clear();
        self.undo_stack.push(change);
    }

    /// Pop the most recent change for undo (moves it to the redo stack).
    pub fn pop_undo(&mut self) -> Option<Change> {
        let change = self.undo_stack.pop()?;
        self.redo_stack.push(change.clone());
        Some(change)
    }

    /// Pop the most recent undone change for redo (moves it back to the undo stack).
    pub fn pop_redo(&mut self) -> Option<Change> {
        let change = self.redo_stack.pop()?;
        self.undo_stack.push(change.clone());
        Some(change)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Changes currently applied, oldest first.
    pub fn applied(&self) -> &[Change] {
        &self.undo_stack
    }
}
