use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{Cell, Contradiction};

/// Display number handed out by a [`KnowledgeBase`](crate::KnowledgeBase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SentenceId(pub u64);

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n.{}", self.0)
    }
}

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// The cell set only ever shrinks, through [`Sentence::mark_mine`] and
/// [`Sentence::mark_safe`]. Equality compares cells and count; the id is
/// only a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    id: SentenceId,
    cells: HashSet<Cell>,
    count: usize,
}

impl Sentence {
    /// Unchecked: [`KnowledgeBase::push`](crate::KnowledgeBase::push) is the
    /// public way in, and rejects counts larger than the cell set.
    pub(crate) fn new(
        id: SentenceId,
        cells: impl IntoIterator<Item = Cell>,
        count: usize,
    ) -> Self {
        Self {
            id,
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn id(&self) -> SentenceId {
        self.id
    }

    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// An empty sentence carries no information and is ignored by inference.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_consistent(&self) -> bool {
        self.count <= self.cells.len()
    }

    pub fn is_subset_of(&self, other: &Sentence) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// The cells known to be mines: all of them when the count covers every
    /// cell, none otherwise. The returned set is a copy.
    pub fn known_mines(&self) -> HashSet<Cell> {
        if self.cells.len() == self.count {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// The cells known to be safe: all of them when the count is zero, none
    /// otherwise. The returned set is a copy.
    pub fn known_safes(&self) -> HashSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// Removes a known mine from the sentence, lowering the count with it.
    ///
    /// Returns whether the sentence changed. A cell not in the sentence is a
    /// no-op. Removing a mine from a sentence with no mines left is a
    /// contradiction and leaves the sentence untouched.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, Contradiction> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(Contradiction::NegativeCount {
                sentence: self.id,
                cell,
            });
        }

        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Removes a known safe cell from the sentence; the count is unchanged.
    ///
    /// Removing a cell from a sentence where every cell must be a mine is a
    /// contradiction and leaves the sentence untouched.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, Contradiction> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count >= self.cells.len() {
            return Err(Contradiction::CountExceedsCells {
                sentence: self.id,
                cell,
            });
        }

        self.cells.remove(&cell);
        Ok(true)
    }
}

impl PartialEq for Sentence {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.cells == other.cells
    }
}

impl Eq for Sentence {}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {{{}}} = {}",
            self.id,
            self.cells.iter().sorted().join(", "),
            self.count
        )
    }
}
