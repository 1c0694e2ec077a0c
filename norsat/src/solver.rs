//! Boolean satisfiability solver.
use std::io;

use anyhow::Error;
use log::info;
use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use norsat_dimacs::DimacsParser;
use norsat_formula::{CnfFormula, Lit, Var};

use crate::config::{ConfigError, SolverConfig, SolverConfigUpdate};
use crate::context::{config_changed, ensure_var_count, Context, SatStateP, SolverConfigP, StatsP};
use crate::load::load_clause;
use crate::schedule::schedule_step;
use crate::state::SatState;
use crate::stats::SolverStats;

/// Outcome of a [`Solver::solve`] call.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SolveResult {
    /// A satisfying assignment was found, available via [`Solver::model`].
    Sat,
    /// No assignment satisfies the formula.
    Unsat,
    /// The configured conflict budget was exhausted before a verdict was reached.
    Unknown,
}

/// A boolean satisfiability solver.
pub struct Solver {
    ctx: Box<Context>,
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::new()
    }
}

impl Solver {
    /// Create a new solver with the default configuration.
    pub fn new() -> Solver {
        Solver::with_config(SolverConfig::default())
    }

    /// Create a new solver with the given configuration.
    pub fn with_config(config: SolverConfig) -> Solver {
        let mut solver = Solver {
            ctx: Box::new(Context::default()),
        };
        solver.ctx.solver_config = config;

        let mut ctx = solver.ctx.into_partial_ref_mut();
        config_changed(ctx.borrow(), &SolverConfigUpdate::new());

        solver
    }

    /// Change the solver configuration.
    ///
    /// Returns an error and leaves the configuration unchanged when a value is out of range.
    pub fn config(&mut self, update: &SolverConfigUpdate) -> Result<(), ConfigError> {
        update.apply(&mut self.ctx.solver_config)?;

        let mut ctx = self.ctx.into_partial_ref_mut();
        config_changed(ctx.borrow(), update);

        Ok(())
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Add a single clause to the solver.
    pub fn add_clause(&mut self, clause: &[Lit]) {
        let mut ctx = self.ctx.into_partial_ref_mut();

        let var_count = clause.iter().map(|lit| lit.index() + 1).max().unwrap_or(0);
        ensure_var_count(ctx.borrow(), var_count);

        load_clause(ctx.borrow(), clause);
    }

    /// Read and add a formula in DIMACS CNF format.
    ///
    /// The input is parsed and loaded in chunks, so this does not buffer the complete formula.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Check the satisfiability of the current formula.
    ///
    /// With a configured conflict budget this returns [`SolveResult::Unknown`] when the budget
    /// is used up before a verdict is reached. The solver stays usable, another call continues
    /// the search with a fresh budget.
    pub fn solve(&mut self) -> SolveResult {
        let mut ctx = self.ctx.into_partial_ref_mut();

        let budget = ctx.part(SolverConfigP).conflict_budget;
        let conflicts_before = ctx.part(StatsP).conflicts;

        while *ctx.part(SatStateP) == SatState::Unknown {
            if let Some(budget) = budget {
                if ctx.part(StatsP).conflicts - conflicts_before >= budget {
                    return SolveResult::Unknown;
                }
            }
            if !schedule_step(ctx.borrow()) {
                break;
            }
        }

        match *ctx.part(SatStateP) {
            SatState::Sat => SolveResult::Sat,
            SatState::Unsat => SolveResult::Unsat,
            SatState::Unknown => SolveResult::Unknown,
        }
    }

    /// Set of literals that satisfy the formula.
    ///
    /// `Some` iff the last [`solve`](Solver::solve) call returned [`SolveResult::Sat`] and the
    /// formula was not changed since.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if *ctx.part(SatStateP) != SatState::Sat {
            return None;
        }
        Some(
            self.ctx
                .assignment
                .assignment()
                .iter()
                .enumerate()
                .flat_map(|(index, assignment)| {
                    assignment.map(|value| Lit::from_var(Var::from_index(index), value))
                })
                .collect(),
        )
    }

    /// Counters describing the work performed so far.
    pub fn stats(&self) -> SolverStats {
        self.ctx.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use norsat_dimacs::write_dimacs;

    use crate::test::{pigeonhole_formula, sat_formula};

    #[test]
    fn empty_formula_is_sat() {
        let mut solver = Solver::new();

        assert_eq!(solver.solve(), SolveResult::Sat);
        assert_eq!(solver.model(), Some(vec![]));
        assert_eq!(solver.stats().decisions, 0);
    }

    #[test]
    fn budget_exhaustion_is_not_final() {
        let mut solver = Solver::new();

        let mut update = SolverConfigUpdate::new();
        update.conflict_budget = Some(1);
        solver.config(&update).unwrap();

        let mut formula = CnfFormula::new();
        for clause in [
            [1, 2, 3],
            [-1, -2, 3],
            [1, -2, -3],
            [-1, 2, -3],
            [-1, -2, -3],
            [1, 2, -3],
            [1, -2, 3],
            [-1, 2, 3],
        ]
        .iter()
        {
            formula.add_clause(clause.iter().map(|&l| Lit::from_dimacs(l)));
        }

        solver.add_formula(&formula);

        let mut unknowns = 0;
        loop {
            match solver.solve() {
                SolveResult::Unknown => unknowns += 1,
                SolveResult::Unsat => break,
                SolveResult::Sat => panic!("unsat formula reported as sat"),
            }
            assert!(unknowns < 100, "conflict budget does not make progress");
        }

        assert!(unknowns > 0);
    }

    proptest! {
        #[test]
        fn pigeonhole_unsat(formula in pigeonhole_formula(1..6usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Unsat);
            prop_assert_eq!(solver.model(), None);
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 1..6usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Sat);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 1..6usize)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve(), SolveResult::Sat);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_with_luby_restarts(formula in sat_formula(4..20usize, 10..100usize, 1..6usize)) {
            let mut solver = Solver::new();

            let mut update = SolverConfigUpdate::new();
            update.restart_strategy = Some(crate::config::RestartStrategy::Luby);
            update.restart_base = Some(1);
            solver.config(&update).unwrap();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), SolveResult::Sat);

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn pigeonhole_incremental_clauses(formula in pigeonhole_formula(1..6usize)) {
            let mut solver = Solver::new();

            let mut last_result = SolveResult::Sat;

            for clause in formula.iter() {
                let single_clause = CnfFormula::from(Some(clause));
                solver.add_formula(&single_clause);

                let result = solver.solve();
                if result != last_result {
                    prop_assert_eq!(result, SolveResult::Unsat);
                    prop_assert_eq!(last_result, SolveResult::Sat);
                    last_result = result;
                }
            }

            prop_assert_eq!(last_result, SolveResult::Unsat);
        }
    }
}
