use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::{Cell, Contradiction, Sentence, SentenceId};

/// The ordered collection of everything the agent knows about the board.
///
/// Sentences are appended and never removed; they only shrink in place when
/// a cell is marked as a mine or as safe. Sentences whose cells have all been
/// resolved stay behind as inert, empty entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    sentences: Vec<Sentence>,
    next_id: u64,
}

/// Outcome of a single subset-elimination pass.
#[derive(Debug, Default)]
pub struct CrossCheck {
    /// Number of new sentences appended to the knowledge base.
    pub added: usize,
    /// Pairs of sentences that could not both be true.
    pub contradictions: Vec<Contradiction>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.iter()
    }

    /// Whether a sentence with the same cells and count is already known.
    pub fn contains(&self, cells: &HashSet<Cell>, count: usize) -> bool {
        self.sentences
            .iter()
            .any(|s| s.count() == count && s.cells() == cells)
    }

    fn next_id(&mut self) -> SentenceId {
        let id = SentenceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a new sentence, even if an equal one or an empty one is
    /// already present. A sentence claiming more mines than it has cells is
    /// rejected.
    pub fn push(
        &mut self,
        cells: impl IntoIterator<Item = Cell>,
        count: usize,
    ) -> Result<SentenceId, Contradiction> {
        let cells: HashSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(Contradiction::Overcounted {
                count,
                cells: cells.len(),
            });
        }

        let sentence = Sentence::new(self.next_id(), cells, count);
        let id = sentence.id();
        self.sentences.push(sentence);
        Ok(id)
    }

    /// Removes a known mine from every sentence.
    pub fn mark_mine(&mut self, cell: Cell) -> Vec<Contradiction> {
        self.sentences
            .iter_mut()
            .filter_map(|sentence| sentence.mark_mine(cell).err())
            .collect()
    }

    /// Removes a known safe cell from every sentence.
    pub fn mark_safe(&mut self, cell: Cell) -> Vec<Contradiction> {
        self.sentences
            .iter_mut()
            .filter_map(|sentence| sentence.mark_safe(cell).err())
            .collect()
    }

    /// Subset elimination over the sentences present when the pass starts.
    ///
    /// For every pair of non-empty sentences where one's cells are contained in
    /// the other's, the difference is itself a sentence: the extra cells hold
    /// the extra mines. New, non-empty differences that are not already known
    /// are appended.
    pub fn cross_check(&mut self) -> CrossCheck {
        let mut outcome = CrossCheck::default();
        let snapshot_len = self.sentences.len();

        for (i, j) in (0..snapshot_len).tuple_combinations() {
            let (first, second) = (&self.sentences[i], &self.sentences[j]);
            if first.is_empty() || second.is_empty() {
                continue;
            }

            let (subset, superset) = if first.is_subset_of(second) {
                (first, second)
            } else if second.is_subset_of(first) {
                (second, first)
            } else {
                continue;
            };

            let Some(count) = superset.count().checked_sub(subset.count()) else {
                outcome.contradictions.push(Contradiction::NegativeDerivation {
                    subset: subset.id(),
                    superset: superset.id(),
                });
                continue;
            };

            let cells: HashSet<Cell> = superset
                .cells()
                .difference(subset.cells())
                .copied()
                .collect();

            if count > cells.len() {
                outcome.contradictions.push(Contradiction::Overcounted {
                    count,
                    cells: cells.len(),
                });
                continue;
            }
            // Equal cell sets leave nothing to say.
            if cells.is_empty() || self.contains(&cells, count) {
                continue;
            }

            let (subset_id, superset_id) = (subset.id(), superset.id());
            let id = self.next_id();
            let derived = Sentence::new(id, cells, count);
            debug!(%subset_id, %superset_id, %derived, "derived sentence");
            self.sentences.push(derived);
            outcome.added += 1;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn test_ids_increase_per_sentence() {
        let mut kb = KnowledgeBase::new();
        let a = kb.push(cells(&[(0, 0)]), 0).unwrap();
        let b = kb.push(cells(&[(0, 0)]), 0).unwrap();
        assert_eq!(a, SentenceId(0));
        assert_eq!(b, SentenceId(1));

        // Duplicates are kept on the plain append path
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn test_push_rejects_overcounted_sentence() {
        let mut kb = KnowledgeBase::new();
        let result = kb.push(cells(&[(0, 0)]), 2);
        assert_eq!(
            result,
            Err(Contradiction::Overcounted { count: 2, cells: 1 })
        );
        assert!(kb.is_empty());
    }

    #[test]
    fn test_cross_check_subset_elimination() {
        // {(0,0),(0,1)} = 1 and {(0,0),(0,1),(0,2)} = 2 give {(0,2)} = 1
        let mut kb = KnowledgeBase::new();
        kb.push(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        kb.push(cells(&[(0, 0), (0, 1), (0, 2)]), 2).unwrap();

        let outcome = kb.cross_check();
        assert_eq!(outcome.added, 1);
        assert!(outcome.contradictions.is_empty());

        let derived = kb.get(2).unwrap();
        assert_eq!(derived.cells(), &HashSet::from([Cell::new(0, 2)]));
        assert_eq!(derived.count(), 1);
        assert_eq!(derived.known_mines(), HashSet::from([Cell::new(0, 2)]));

        // A second pass finds nothing new
        assert_eq!(kb.cross_check().added, 0);
        assert_eq!(kb.len(), 3);
    }

    #[test]
    fn test_cross_check_either_order() {
        // The superset may come first in the list
        let mut kb = KnowledgeBase::new();
        kb.push(cells(&[(1, 0), (1, 1), (1, 2)]), 1).unwrap();
        kb.push(cells(&[(1, 0), (1, 1)]), 1).unwrap();

        assert_eq!(kb.cross_check().added, 1);
        assert!(kb.contains(&HashSet::from([Cell::new(1, 2)]), 0));
    }

    #[test]
    fn test_cross_check_skips_empty_and_equal_sentences() {
        let mut kb = KnowledgeBase::new();
        kb.push(Vec::new(), 0).unwrap();
        kb.push(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        kb.push(cells(&[(0, 1), (0, 0)]), 1).unwrap();

        let outcome = kb.cross_check();
        assert_eq!(outcome.added, 0);
        assert!(outcome.contradictions.is_empty());
    }

    #[test]
    fn test_cross_check_reports_negative_derivation() {
        let mut kb = KnowledgeBase::new();
        kb.push(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        kb.push(cells(&[(0, 0), (0, 1), (0, 2)]), 1).unwrap();

        let outcome = kb.cross_check();
        assert_eq!(outcome.added, 0);
        assert_eq!(
            outcome.contradictions,
            vec![Contradiction::NegativeDerivation {
                subset: SentenceId(0),
                superset: SentenceId(1),
            }]
        );
    }

    #[test]
    fn test_mark_propagates_to_every_sentence() {
        let mut kb = KnowledgeBase::new();
        kb.push(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        kb.push(cells(&[(0, 0), (1, 0), (1, 1)]), 2).unwrap();

        assert!(kb.mark_mine(Cell::new(0, 0)).is_empty());
        assert!(kb.iter().all(|s| !s.cells().contains(&Cell::new(0, 0))));
        assert_eq!(kb.get(0).unwrap().count(), 0);
        assert_eq!(kb.get(1).unwrap().count(), 1);

        assert!(kb.mark_safe(Cell::new(0, 1)).is_empty());
        assert!(kb.get(0).unwrap().is_empty());
    }

    #[test]
    fn test_mark_reports_contradictions() {
        let mut kb = KnowledgeBase::new();
        kb.push(cells(&[(0, 0), (0, 1)]), 0).unwrap();

        let faults = kb.mark_mine(Cell::new(0, 1));
        assert_eq!(faults.len(), 1);
        assert_eq!(kb.get(0).unwrap().len(), 2);
    }
}
