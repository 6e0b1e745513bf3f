//! SAT-backed reference used by tests to check that the agent's deductions
//! are forced by the evidence it was given.

use itertools::Itertools;
use std::collections::HashMap;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver};

use crate::{Cell, GameConfig};

pub struct Oracle {
    solver: Solver<'static>,
    vars: HashMap<Cell, Lit>,
}

impl Oracle {
    /// Encodes every revealed cell as safe with exactly `count` mined
    /// neighbors, plus the total mine count over the whole board.
    pub fn new(config: GameConfig, evidence: &[(Cell, usize)]) -> Self {
        let mut solver = Solver::new();
        let vars: HashMap<Cell, Lit> = config
            .cells()
            .map(|cell| (cell, Lit::from_var(solver.new_var(), true)))
            .collect();

        let mut formula = CnfFormula::new();
        for &(cell, count) in evidence {
            formula.add_clause(&[!vars[&cell]]);
            let neighbors: Vec<Lit> = cell
                .neighbors(config.height, config.width)
                .map(|neighbor| vars[&neighbor])
                .collect();
            encode_exactly_k(&mut formula, &neighbors, count);
        }

        let everything: Vec<Lit> = vars.values().copied().collect();
        encode_exactly_k(&mut formula, &everything, config.mines);

        solver.add_formula(&formula);
        Self { solver, vars }
    }

    /// `Some(true)` if every assignment makes `cell` a mine, `Some(false)` if
    /// none does, `None` if both are possible (or the evidence is unsatisfiable).
    pub fn forced(&mut self, cell: Cell) -> Option<bool> {
        let lit = self.vars[&cell];
        match (self.satisfiable_with(lit), self.satisfiable_with(!lit)) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }

    fn satisfiable_with(&mut self, lit: Lit) -> bool {
        self.solver.assume(&[lit]);
        let result = self.solver.solve().unwrap_or(false);
        self.solver.assume(&[]);
        result
    }
}

/// Naive "exactly k" encoding: no k+1 literals are all true, and no
/// n-k+1 literals are all false. Only suitable for small boards.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    if k > lits.len() {
        formula.add_clause(&[]);
        return;
    }

    if k < lits.len() {
        for combo in lits.iter().copied().combinations(k + 1) {
            let clause: Vec<Lit> = combo.into_iter().map(|lit| !lit).collect();
            formula.add_clause(&clause);
        }
    }
    if k > 0 {
        for combo in lits.iter().copied().combinations(lits.len() - k + 1) {
            formula.add_clause(&combo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_forced_cells() {
        // A 1 in the corner of a 1x3 strip with one mine
        let config = GameConfig::new(1, 3, 1);
        let mut oracle = Oracle::new(config, &[(Cell::new(0, 0), 1)]);

        assert_eq!(oracle.forced(Cell::new(0, 0)), Some(false));
        assert_eq!(oracle.forced(Cell::new(0, 1)), Some(true));
        assert_eq!(oracle.forced(Cell::new(0, 2)), Some(false));
    }

    #[test]
    fn test_oracle_undetermined() {
        let config = GameConfig::new(2, 2, 1);
        let mut oracle = Oracle::new(config, &[]);
        assert_eq!(oracle.forced(Cell::new(1, 1)), None);
    }
}
