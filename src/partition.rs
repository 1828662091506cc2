//! Region partitioning of a full source file.
//!
//! Regions are slices of the full buffer, addressed by insertion order.
//! Region boundaries are produced outside this crate; regions may overlap or
//! leave gaps between boundaries and no exclusivity invariant is enforced.

use crate::buffer::LineBuffer;
use std::ops::{Index, IndexMut};

/// An ordered collection of region buffers cut from one full-file buffer.
#[derive(Debug, Clone)]
pub struct Partition {
    full: LineBuffer,
    regions: Vec<LineBuffer>,
}

impl Partition {
    /// Create a partition over a value copy of `full`.
    ///
    /// The copy starts with an empty edit history; the caller's buffer is
    /// never aliased.
    pub fn new(full: &LineBuffer) -> Self {
        Self {
            full: full.fresh_copy(),
            regions: Vec::new(),
        }
    }

    /// Slice a region out of the full buffer and append it to the region
    /// list. Insertion order is the region's stable index.
    pub fn add_region(&mut self, start_line: usize, end_line: usize, description: &str) {
        let mut region = self.full.slice(start_line, end_line);
        region.description = description.to_string();
        self.regions.push(region);
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when no regions have been added yet.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Get a region by index.
    pub fn get(&self, idx: usize) -> Option<&LineBuffer> {
        self.regions.get(idx)
    }

    /// Get a region by index, mutably.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut LineBuffer> {
        self.regions.get_mut(idx)
    }

    /// Iterate regions in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineBuffer> {
        self.regions.iter()
    }

    /// The full-file buffer in its current folded state.
    pub fn full(&self) -> &LineBuffer {
        &self.full
    }

    /// Fold every region's current text back into the full buffer and return
    /// the complete file content.
    ///
    /// This is the only path by which region edits reach one coherent output
    /// file. Calling it twice with no intervening edits yields byte-identical
    /// output both times.
    pub fn materialize(&mut self) -> String {
        for region in &self.regions {
            self.full.update(region);
        }
        self.full.text()
    }
}

impl Index<usize> for Partition {
    type Output = LineBuffer;

    fn index(&self, idx: usize) -> &LineBuffer {
        &self.regions[idx]
    }
}

impl IndexMut<usize> for Partition {
    fn index_mut(&mut self, idx: usize) -> &mut LineBuffer {
        &mut self.regions[idx]
    }
}
