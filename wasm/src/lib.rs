use minesweeper_ai as ms;
use wasm_bindgen::prelude::*;

fn load(bts: &[u8]) -> Result<ms::MinesweeperAI, String> {
    ms::MinesweeperAI::deserialize(bts).map_err(|e| e.to_string())
}

fn coords(cell: ms::Cell) -> Result<[u32; 2], String> {
    let row = u32::try_from(cell.row).map_err(|e| format!("row of {cell}: {e}"))?;
    let col = u32::try_from(cell.col).map_err(|e| format!("column of {cell}: {e}"))?;
    Ok([row, col])
}

#[wasm_bindgen]
pub fn create_agent(height: usize, width: usize, mines: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let agent = ms::MinesweeperAI::new(ms::GameConfig::new(height, width, mines));
    agent.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn add_knowledge(bts: Vec<u8>, row: usize, col: usize, count: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut agent = load(&bts)?;
    agent
        .add_knowledge(ms::Cell::new(row, col), count)
        .map_err(|e| e.to_string())?;
    agent.serialize().map_err(|e| e.to_string())
}

/// `[row, col, 1]` for a proven safe cell, `[row, col, 0]` for a guess, or
/// empty when no move is left.
#[wasm_bindgen]
pub fn next_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let agent = load(&bts)?;
    let chosen = match agent.make_safe_move() {
        Some(cell) => Some((cell, 1)),
        None => agent
            .make_random_move(&mut rand::rng())
            .map(|cell| (cell, 0)),
    };

    match chosen {
        Some((cell, safe)) => {
            let [row, col] = coords(cell)?;
            Ok(vec![row, col, safe])
        }
        None => Ok(Vec::new()),
    }
}

/// Known mines flattened as `[row, col, row, col, ...]`.
#[wasm_bindgen]
pub fn known_mines(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let agent = load(&bts)?;
    let mut flat = Vec::with_capacity(agent.mines().len() * 2);
    for &cell in agent.mines() {
        flat.extend(coords(cell)?);
    }
    Ok(flat)
}

/// `false` once the agent has seen evidence that no board could produce.
#[wasm_bindgen]
pub fn is_consistent(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    Ok(load(&bts)?.is_consistent())
}
