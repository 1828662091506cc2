//! Line-addressed text buffers with absolute line numbering.
//!
//! A `LineBuffer` holds either a whole source file or a slice of one. Slices
//! keep the absolute line numbers of the file they came from, so a region
//! covering lines 40-60 answers `line(47)` even though it owns only 21 lines.
//! All line numbers are 1-based and inclusive.

use crate::history::{Change, EditHistory};
use anyhow::{Context, Result};
use std::path::Path;

/// Sentinel appended by [`LineBuffer::content`] when the end of the file
/// should be made explicit to the decision process.
pub const EOF_TOKEN: &str = "{END OF FILE}";

/// Template used to prefix absolute line numbers; `*` is replaced by the
/// line number (with an `(extra)` marker for boundary context lines).
const LINE_TAG: &str = "[*:]";

/// Merge `comment` into `line` as a trailing `//` comment.
///
/// A code line that already carries an inline comment has that comment
/// replaced rather than gaining a second marker. A line that is itself a
/// comment keeps its text and gains one trailing segment at most.
pub fn merge_trailing_comment(line: &str, comment: &str) -> String {
    if line.trim_start().starts_with("//") {
        let first = line.find("//");
        let last = line.rfind("//");
        if first == last {
            format!("{} // {}", line, comment)
        } else {
            // last is Some whenever the line starts with a comment marker
            format!("{}// {}", &line[..last.unwrap_or(0)], comment)
        }
    } else if let Some(idx) = line.find("//") {
        format!("{} // {}", line[..idx].trim_end(), comment)
    } else {
        format!("{} // {}", line.trim_end(), comment)
    }
}

/// A mutable, line-addressed text region with its own undo/redo history.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    /// Buffer name, usually the source file name
    pub name: String,
    /// Free-form description (set on region buffers by the partition)
    pub description: String,
    lines: Vec<String>,
    start_line: usize,
    end_line: usize,
    history: EditHistory,
}

impl LineBuffer {
    /// Create a buffer from raw text.
    ///
    /// Bounds default to `start = 1` and `end = start + line_count - 1`; pass
    /// explicit bounds when the text is a slice of a larger file.
    pub fn from_content(
        name: &str,
        content: &str,
        start_line: Option<usize>,
        end_line: Option<usize>,
    ) -> Self {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let start = start_line.unwrap_or(1);
        let end = end_line.unwrap_or_else(|| (start + lines.len()).saturating_sub(1));
        debug_assert_eq!((end + 1).saturating_sub(start), lines.len());
        Self {
            name: name.to_string(),
            description: String::new(),
            lines,
            start_line: start,
            end_line: end,
            history: EditHistory::new(),
        }
    }

    /// Load a full source file into a buffer. The buffer name is the file name.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source file {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_content(&name, &content, None, None))
    }

    /// First absolute line number owned by this buffer.
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Last absolute line number owned by this buffer (inclusive).
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// Number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// This buffer's edit history.
    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Map an absolute line number to a vector offset, clamping out-of-range
    /// numbers to the nearest valid line instead of erroring.
    fn clamp_offset(&self, line_idx: usize) -> usize {
        let offset = line_idx.saturating_sub(self.start_line);
        offset.min(self.lines.len().saturating_sub(1))
    }

    /// Get a line by absolute line number.
    ///
    /// Out-of-range numbers clamp to the nearest boundary line; this never
    /// panics and never returns an error.
    pub fn line(&self, line_idx: usize) -> &str {
        self.lines
            .get(self.clamp_offset(line_idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn lineate_line(line: &str, line_num: usize, is_extra: bool) -> String {
        let tag = if is_extra {
            format!("{} (extra)", line_num)
        } else {
            line_num.to_string()
        };
        format!("{} {}", LINE_TAG.replace('*', &tag), line)
    }

    /// Render the buffer text.
    ///
    /// With `lineate`, each line is prefixed with its absolute line number;
    /// lines within `extra_lines` of either boundary are tagged as extra
    /// context. `include_eof` appends the end-of-file sentinel. Deterministic,
    /// no side effects.
    pub fn content(&self, lineate: bool, extra_lines: usize, include_eof: bool) -> String {
        let mut text = if lineate {
            self.lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let line_num = self.start_line + i;
                    let is_extra = i < extra_lines || self.lines.len() - i <= extra_lines;
                    Self::lineate_line(line, line_num, is_extra)
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            self.lines.join("\n")
        };
        if include_eof {
            text.push('\n');
            text.push_str(EOF_TOKEN);
        }
        text
    }

    /// Plain rendering with no line numbers or sentinel.
    pub fn text(&self) -> String {
        self.content(false, 0, false)
    }

    /// Cut a new, independent buffer holding a value copy of lines
    /// `[start, end]`. The slice keeps absolute line numbering and starts
    /// with an empty history.
    pub fn slice(&self, start: usize, end: usize) -> LineBuffer {
        let lo = start
            .saturating_sub(self.start_line)
            .min(self.lines.len());
        let hi = (end + 1)
            .saturating_sub(self.start_line)
            .min(self.lines.len())
            .max(lo);
        LineBuffer {
            name: self.name.clone(),
            description: String::new(),
            lines: self.lines[lo..hi].to_vec(),
            start_line: start,
            end_line: end,
            history: EditHistory::new(),
        }
    }

    /// Value copy with the same text and bounds but a fresh, empty history.
    pub fn fresh_copy(&self) -> LineBuffer {
        LineBuffer {
            name: self.name.clone(),
            description: self.description.clone(),
            lines: self.lines.clone(),
            start_line: self.start_line,
            end_line: self.end_line,
            history: EditHistory::new(),
        }
    }

    /// Overwrite a line directly, without touching history or whitespace.
    fn replace_line(&mut self, line_idx: usize, text: &str) {
        tracing::trace!(
            "replacing line {} in {} ({}..={})",
            line_idx,
            self.name,
            self.start_line,
            self.end_line
        );
        let offset = self.clamp_offset(line_idx);
        if let Some(slot) = self.lines.get_mut(offset) {
            *slot = text.to_string();
        }
    }

    /// Replace a line and record the edit on the undo stack.
    ///
    /// If `comment` is given it is merged into `new_text` as a trailing `//`
    /// comment. The rewritten text is stripped and the original line's leading
    /// whitespace re-prepended, so edits never change indentation style. The
    /// normalized text is what gets stored in the returned [`Change`].
    pub fn apply_change(
        &mut self,
        line_idx: usize,
        new_text: &str,
        mutation_class: &str,
        description: &str,
        comment: Option<&str>,
    ) -> Change {
        let merged = match comment {
            Some(comment) => merge_trailing_comment(new_text, comment),
            None => new_text.to_string(),
        };
        let old_line = self.line(line_idx).to_string();
        let indent = &old_line[..old_line.len() - old_line.trim_start().len()];
        let new_line = format!("{}{}", indent, merged.trim());
        let change = Change::new(
            line_idx,
            old_line,
            new_line,
            mutation_class.to_string(),
            description.to_string(),
            self.name.clone(),
        );
        self.replace_line(line_idx, &change.new_line);
        self.history.push(change.clone());
        change
    }

    /// Replay pre-built changes, recording each on the undo stack.
    pub fn apply_batch(&mut self, changes: Vec<Change>) {
        for change in changes {
            self.replace_line(change.line_idx, &change.new_line);
            self.history.push(change);
        }
    }

    /// Undo the most recent change. Returns `false` with no effect when the
    /// undo stack is empty.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_undo() {
            Some(change) => {
                self.replace_line(change.line_idx, &change.old_line);
                true
            }
            None => false,
        }
    }

    /// Redo the most recently undone change. Returns `false` with no effect
    /// when the redo stack is empty.
    pub fn redo(&mut self) -> bool {
        match self.history.pop_redo() {
            Some(change) => {
                self.replace_line(change.line_idx, &change.new_line);
                true
            }
            None => false,
        }
    }

    /// Fold `other`'s current text into this buffer: every absolute line in
    /// `other`'s range that differs becomes a synthesized change, applied as
    /// a batch.
    pub fn update(&mut self, other: &LineBuffer) {
        let changes: Vec<Change> = (other.start_line..=other.end_line)
            .filter(|&num| self.line(num) != other.line(num))
            .map(|num| Change::edit(num, self.line(num), other.line(num)))
            .collect();
        self.apply_batch(changes);
    }
}
