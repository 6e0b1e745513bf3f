use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashSet;
use std::fmt;

use crate::{Cell, GameConfig};

/// The hidden mine layout the agent plays against.
///
/// The agent never reads this directly; a driver asks the board about the cell
/// it played and forwards the answer through
/// [`MinesweeperAI::add_knowledge`](crate::MinesweeperAI::add_knowledge).
#[derive(Debug, Clone)]
pub struct Board {
    config: GameConfig,
    mines: HashSet<Cell>,
    /// Cells the player has flagged as mines.
    mines_found: HashSet<Cell>,
}

impl Board {
    /// Places `config.mines` mines uniformly at random.
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> anyhow::Result<Self> {
        if config.mines >= config.total_cells() {
            anyhow::bail!("total mines must be less than the number of cells on the board");
        }

        let cells: Vec<Cell> = config.cells().collect();
        let mines = cells.choose_multiple(rng, config.mines).copied().collect();

        Ok(Self {
            config,
            mines,
            mines_found: HashSet::new(),
        })
    }

    /// A board with mines at exactly the given cells.
    pub fn from_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> anyhow::Result<Self> {
        let mines: HashSet<Cell> = mines.into_iter().collect();
        if let Some(cell) = mines.iter().find(|cell| !cell.in_bounds(height, width)) {
            anyhow::bail!("mine {cell} is outside the {height}x{width} board");
        }

        Ok(Self {
            config: GameConfig::new(height, width, mines.len()),
            mines,
            mines_found: HashSet::new(),
        })
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines within one row and column of `cell`, not including
    /// the cell itself.
    pub fn nearby_mines(&self, cell: Cell) -> usize {
        cell.neighbors(self.config.height, self.config.width)
            .filter(|&neighbor| self.is_mine(neighbor))
            .count()
    }

    /// Flags a cell as a mine. Returns whether the flag is new.
    pub fn flag(&mut self, cell: Cell) -> bool {
        self.mines_found.insert(cell)
    }

    /// The game is won once exactly the mined cells have been flagged.
    pub fn won(&self) -> bool {
        self.mines_found == self.mines
    }
}

impl fmt::Display for Board {
    /// Text rendering of where mines are located.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = format!("{}-", "--".repeat(self.config.width));
        for row in 0..self.config.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.config.width {
                let mark = if self.is_mine(Cell::new(row, col)) { 'X' } else { ' ' };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "{rule}")
    }
}
