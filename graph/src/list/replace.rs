use std::ops::Range;

/// Rows `[from, to)` of the old indexing became `new_count` rows.
///
/// Rows before `from` keep their index; rows at or after `to` move by
/// `new_count - (to - from)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Replace {
    pub from: usize,
    pub to: usize,
    pub new_count: usize,
}

impl Replace {
    pub fn new(from: usize, to: usize, new_count: usize) -> Self {
        debug_assert!(from <= to);
        Self { from, to, new_count }
    }

    /// Number of old rows removed
    pub fn removed(&self) -> usize {
        self.to - self.from
    }

    pub fn delta(&self) -> isize {
        self.new_count as isize - self.removed() as isize
    }

    /// New-index range of the rows needing recomputation
    pub fn new_range(&self) -> Range<usize> {
        self.from..self.from + self.new_count
    }

    /// Size of a list after applying this replace
    pub fn apply_to_len(&self, len: usize) -> usize {
        (len as isize + self.delta()) as usize
    }

    /// Where an old row lands: `None` for replaced rows
    pub fn map_row(&self, row: usize) -> Option<usize> {
        if row < self.from {
            Some(row)
        } else if row < self.to {
            None
        } else {
            Some((row as isize + self.delta()) as usize)
        }
    }
}

/// A [`Replace`] stamped with the graph generation that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    pub replace: Replace,
    pub generation: u64,
}
