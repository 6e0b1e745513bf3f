use serde::{Deserialize, Serialize};

pub use agent::*;
pub use board::*;
pub use cell::*;
pub use error::*;
pub use knowledge::*;
pub use sentence::*;

mod agent;
mod board;
mod cell;
mod error;
mod knowledge;
#[cfg(test)]
mod oracle;
mod sentence;

/// Static board configuration shared by the agent and the board it plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    /// Total number of mines on the board.
    pub mines: usize,
}

impl GameConfig {
    pub const fn new(height: usize, width: usize, mines: usize) -> Self {
        Self {
            height,
            width,
            mines,
        }
    }

    pub const fn total_cells(&self) -> usize {
        self.height * self.width
    }

    /// Every cell on the board, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| Cell::new(row, col)))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(8, 8, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_cells() {
        let config = GameConfig::new(2, 3, 1);
        let cells: Vec<Cell> = config.cells().collect();
        assert_eq!(cells.len(), config.total_cells());
        assert_eq!(cells.first(), Some(&Cell::new(0, 0)));
        assert_eq!(cells.last(), Some(&Cell::new(1, 2)));
    }
}
