use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Cell, SentenceId};

/// Knowledge that cannot hold on any real board.
///
/// These are raised when the counts reported by the board disagree with what
/// the agent has already derived. The mutation that would have caused the
/// inconsistency is skipped, so the knowledge base stays usable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contradiction {
    #[error("{sentence} has no mines left to account for mine {cell}")]
    NegativeCount { sentence: SentenceId, cell: Cell },
    #[error("{sentence} needs every cell to be a mine, but {cell} is safe")]
    CountExceedsCells { sentence: SentenceId, cell: Cell },
    #[error("{count} mines cannot fit in {cells} cells")]
    Overcounted { count: usize, cells: usize },
    #[error("{subset} claims more mines than its superset {superset}")]
    NegativeDerivation {
        subset: SentenceId,
        superset: SentenceId,
    },
    #[error("{cell} is known to be both safe and a mine")]
    MineAndSafe { cell: Cell },
}

/// Invalid input handed to the agent by its caller.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("{cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },
    #[error("{cell} reports {count} nearby mines but only has {neighbors} neighbors")]
    CountTooLarge {
        cell: Cell,
        count: usize,
        neighbors: usize,
    },
    #[error("{cell} is a known mine and cannot have been revealed")]
    RevealedMine { cell: Cell },
    #[error("agent state codec failed: {0}")]
    Codec(#[from] bcs::Error),
}

pub type Result<T, E = AgentError> = core::result::Result<T, E>;
