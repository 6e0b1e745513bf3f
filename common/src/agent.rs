use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

use crate::{AgentError, Cell, Contradiction, GameConfig, KnowledgeBase, Result};

/// How far inference runs after each new piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClosurePolicy {
    /// One `infer`, one `cross_check`, one more `infer`. Facts that need a
    /// longer chain wait for the next piece of evidence.
    SinglePass,
    /// Alternate `infer` and `cross_check` until neither produces anything new.
    #[default]
    FixedPoint,
}

/// A Minesweeper player that reasons over a knowledge base of sentences.
///
/// The agent never looks at the board. It is told which cell was revealed and
/// how many mines surround it, and answers with the next cell to play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinesweeperAI {
    config: GameConfig,
    policy: ClosurePolicy,
    /// Cells already played.
    moves_made: HashSet<Cell>,
    /// Cells proven to be mine-free.
    safes: HashSet<Cell>,
    /// Cells proven to hold a mine. Always disjoint from `safes`.
    mines: HashSet<Cell>,
    knowledge: KnowledgeBase,
    contradictions: Vec<Contradiction>,
}

impl MinesweeperAI {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            policy: ClosurePolicy::default(),
            moves_made: HashSet::new(),
            safes: HashSet::new(),
            mines: HashSet::new(),
            knowledge: KnowledgeBase::new(),
            contradictions: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: ClosurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn policy(&self) -> ClosurePolicy {
        self.policy
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Every integrity fault seen so far, without repeats.
    pub fn contradictions(&self) -> &[Contradiction] {
        &self.contradictions
    }

    pub fn is_consistent(&self) -> bool {
        self.contradictions.is_empty()
    }

    /// Whether every mine on the board has been found.
    pub fn is_saturated(&self) -> bool {
        self.mines.len() >= self.config.mines
    }

    /// Deserializes an agent from bytes.
    pub fn deserialize(bts: &[u8]) -> Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the agent to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    fn record(&mut self, faults: impl IntoIterator<Item = Contradiction>) {
        for fault in faults {
            if !self.contradictions.contains(&fault) {
                warn!(%fault, "contradictory knowledge");
                self.contradictions.push(fault);
            }
        }
    }

    // --- Mark Propagation ---

    /// Marks a cell as a mine and removes it from every sentence.
    ///
    /// Returns whether the cell was newly learned. A cell already known to be
    /// safe is never added, the clash is recorded instead.
    pub fn mark_mine(&mut self, cell: Cell) -> bool {
        if self.safes.contains(&cell) {
            self.record([Contradiction::MineAndSafe { cell }]);
            return false;
        }

        let added = self.mines.insert(cell);
        if added {
            trace!(%cell, "marked mine");
        }
        let faults = self.knowledge.mark_mine(cell);
        self.record(faults);
        added
    }

    /// Marks a cell as safe and removes it from every sentence.
    pub fn mark_safe(&mut self, cell: Cell) -> bool {
        if self.mines.contains(&cell) {
            self.record([Contradiction::MineAndSafe { cell }]);
            return false;
        }

        let added = self.safes.insert(cell);
        if added {
            trace!(%cell, "marked safe");
        }
        let faults = self.knowledge.mark_safe(cell);
        self.record(faults);
        added
    }

    // --- Inference ---

    /// Direct resolution: promotes every sentence that is all mines or all
    /// safe into the global sets. Returns whether anything new was learned.
    pub fn infer(&mut self) -> bool {
        let mut changed = false;

        for index in 0..self.knowledge.len() {
            let Some(sentence) = self.knowledge.get(index) else {
                break;
            };
            // Copies: marking mutates the sentence these came from.
            let safes = sentence.known_safes();
            let mines = sentence.known_mines();

            if !safes.is_empty() {
                debug!(%sentence, "sentence resolved to safe cells");
            } else if !mines.is_empty() {
                debug!(%sentence, "sentence resolved to mines");
            }

            for cell in safes {
                changed |= self.mark_safe(cell);
            }
            for cell in mines {
                changed |= self.mark_mine(cell);
            }
        }

        changed | self.saturate()
    }

    /// Once every mine is accounted for, every other cell is safe.
    fn saturate(&mut self) -> bool {
        if !self.is_saturated() {
            return false;
        }

        let remaining: Vec<Cell> = self
            .config
            .cells()
            .filter(|cell| !self.mines.contains(cell) && !self.safes.contains(cell))
            .collect();

        let mut changed = false;
        for cell in remaining {
            changed |= self.mark_safe(cell);
        }
        changed
    }

    /// Subset elimination. Returns the number of sentences added.
    pub fn cross_check(&mut self) -> usize {
        let outcome = self.knowledge.cross_check();
        self.record(outcome.contradictions);
        outcome.added
    }

    /// Runs inference as far as the configured policy allows.
    pub fn close(&mut self) {
        match self.policy {
            ClosurePolicy::SinglePass => {
                self.infer();
                self.cross_check();
                self.infer();
            }
            ClosurePolicy::FixedPoint => loop {
                let inferred = self.infer();
                let derived = self.cross_check();
                if !inferred && derived == 0 {
                    break;
                }
            },
        }
    }

    // --- Evidence ---

    /// Called when the board reveals that `cell` is safe and has `count` mines
    /// among its neighbors.
    ///
    /// The cell is recorded as played and marked safe, a sentence over its
    /// neighbors that are not yet known safe is added, and inference runs
    /// before returning.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) -> Result<()> {
        let GameConfig { height, width, .. } = self.config;
        if !cell.in_bounds(height, width) {
            return Err(AgentError::OutOfBounds {
                cell,
                height,
                width,
            });
        }
        if self.mines.contains(&cell) {
            return Err(AgentError::RevealedMine { cell });
        }

        let neighbors: Vec<Cell> = cell.neighbors(height, width).collect();
        if count > neighbors.len() {
            return Err(AgentError::CountTooLarge {
                cell,
                count,
                neighbors: neighbors.len(),
            });
        }

        self.moves_made.insert(cell);
        self.mark_safe(cell);

        // Known mines stay in the sentence so the reported count still
        // matches its cells; they are marked out right after.
        let cells: HashSet<Cell> = neighbors
            .into_iter()
            .filter(|neighbor| !self.safes.contains(neighbor))
            .collect();
        let known_mines: Vec<Cell> = cells
            .iter()
            .filter(|&neighbor| self.mines.contains(neighbor))
            .copied()
            .collect();

        match self.knowledge.push(cells, count) {
            Ok(id) => debug!(%cell, count, sentence = %id, "added knowledge"),
            Err(fault) => self.record([fault]),
        }
        for mine in known_mines {
            self.mark_mine(mine);
        }

        self.close();
        Ok(())
    }

    // --- Move Selection ---

    /// A cell known to be safe that has not been played yet.
    ///
    /// Does not modify the agent. Which qualifying cell is returned is
    /// unspecified.
    pub fn make_safe_move(&self) -> Option<Cell> {
        self.safes
            .iter()
            .find(|&&cell| !self.moves_made.contains(&cell) && !self.mines.contains(&cell))
            .copied()
    }

    /// A uniformly random cell that has not been played and is not a known
    /// mine. Returns `None` once every mine has been found or nothing is left.
    pub fn make_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        if self.is_saturated() {
            return None;
        }

        let mut candidates: Vec<Cell> = self
            .config
            .cells()
            .filter(|cell| !self.moves_made.contains(cell))
            .collect();

        while !candidates.is_empty() {
            let index = rng.random_range(0..candidates.len());
            let cell = candidates.swap_remove(index);
            if !self.mines.contains(&cell) {
                return Some(cell);
            }
        }
        None
    }
}
