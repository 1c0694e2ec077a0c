//! End to end tests of the solver library.
use proptest::prelude::*;

use rand::seq::SliceRandom;

use norsat::{twosat, CnfFormula, Lit, SolveResult, Solver, SolverConfigUpdate};

/// Build a formula from clauses in DIMACS integer notation.
fn formula(clauses: &[&[isize]]) -> CnfFormula {
    CnfFormula::from(
        clauses
            .iter()
            .map(|clause| clause.iter().map(|&lit| Lit::from_dimacs(lit))),
    )
}

fn assert_model_satisfies(formula: &CnfFormula, model: &[Lit]) {
    for clause in formula.iter() {
        assert!(
            clause.iter().any(|lit| model.contains(lit)),
            "clause {:?} not satisfied by {:?}",
            clause,
            model
        );
    }
}

#[test]
fn simple_sat() {
    let formula = formula(&[&[1, 2], &[-1, 3], &[-2, -3]]);

    let mut solver = Solver::new();
    solver.add_formula(&formula);

    assert_eq!(solver.solve(), SolveResult::Sat);
    assert_model_satisfies(&formula, &solver.model().unwrap());
}

#[test]
fn contradictory_binary_clauses() {
    let formula = formula(&[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]]);

    let mut solver = Solver::new();
    solver.add_formula(&formula);

    assert_eq!(solver.solve(), SolveResult::Unsat);
    assert_eq!(solver.model(), None);
}

#[test]
fn pigeonhole_three_pigeons_two_holes() {
    // Variable (i - 1) * 2 + j is true when pigeon i sits in hole j.
    let formula = formula(&[
        &[1, 2],
        &[3, 4],
        &[5, 6],
        &[-1, -3],
        &[-1, -5],
        &[-3, -5],
        &[-2, -4],
        &[-2, -6],
        &[-4, -6],
    ]);

    let mut solver = Solver::new();
    solver.add_formula(&formula);

    assert_eq!(solver.solve(), SolveResult::Unsat);
}

#[test]
fn implication_chain_needs_no_decisions() {
    let formula = formula(&[&[1], &[-1, 2], &[-2, 3], &[-3, 4]]);

    let mut solver = Solver::new();
    solver.add_formula(&formula);

    assert_eq!(solver.solve(), SolveResult::Sat);

    let model = solver.model().unwrap();
    for number in 1..=4 {
        assert!(model.contains(&Lit::from_dimacs(number)));
    }

    let stats = solver.stats();
    assert_eq!(stats.decisions, 0);
    assert!(stats.propagations >= 4);
}

#[test]
fn empty_formula_is_sat() {
    let mut solver = Solver::new();

    assert_eq!(solver.solve(), SolveResult::Sat);
    assert_eq!(solver.model(), Some(vec![]));
}

#[test]
fn empty_clause_is_unsat() {
    let mut solver = Solver::new();
    solver.add_clause(&[]);

    assert_eq!(solver.solve(), SolveResult::Unsat);
    assert_eq!(solver.stats().decisions, 0);
}

#[test]
fn single_unit_clause() {
    let mut solver = Solver::new();
    solver.add_clause(&[Lit::from_dimacs(-3)]);

    assert_eq!(solver.solve(), SolveResult::Sat);

    let model = solver.model().unwrap();
    assert!(model.contains(&Lit::from_dimacs(-3)));
    assert_eq!(solver.stats().decisions, 0);
}

#[test]
fn twosat_rejects_wide_clauses() {
    let formula = formula(&[&[1, 2, 3], &[-1, 2], &[1, -3]]);

    let err = twosat::solve_2sat(&formula).unwrap_err();
    assert_eq!(err.index, 0);
    assert_eq!(err.len, 3);
}

#[test]
fn twosat_triangle_unsat() {
    let formula = formula(&[
        &[1, 2],
        &[-1, -2],
        &[2, 3],
        &[-2, -3],
        &[1, 3],
        &[-1, -3],
    ]);

    assert_eq!(twosat::solve_2sat(&formula).unwrap(), None);

    // The CDCL core agrees.
    let mut solver = Solver::new();
    solver.add_formula(&formula);
    assert_eq!(solver.solve(), SolveResult::Unsat);
}

#[test]
fn tight_learned_clause_limit() {
    // A small limit forces reductions without changing the verdict.
    let formula = formula(&[
        &[1, 2],
        &[3, 4],
        &[5, 6],
        &[-1, -3],
        &[-1, -5],
        &[-3, -5],
        &[-2, -4],
        &[-2, -6],
        &[-4, -6],
    ]);

    let mut solver = Solver::new();

    let mut update = SolverConfigUpdate::new();
    update.learned_clause_limit = Some(1);
    update.restart_strategy = Some(norsat::RestartStrategy::Luby);
    update.restart_base = Some(1);
    update.restart_postponing = Some(false);
    solver.config(&update).unwrap();

    solver.add_formula(&formula);

    assert_eq!(solver.solve(), SolveResult::Unsat);
}

proptest! {
    /// The verdict does not depend on the order of clauses or of literals within clauses.
    #[test]
    fn verdict_is_permutation_invariant(
        clauses in proptest::collection::vec(
            proptest::collection::vec(-8isize..=8, 1..5),
            1..40,
        ),
        seed in 0u64..1000,
    ) {
        use rand::SeedableRng;

        let clauses: Vec<Vec<Lit>> = clauses
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .filter(|&&lit| lit != 0)
                    .map(|&lit| Lit::from_dimacs(lit))
                    .collect()
            })
            .collect();

        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

        let mut shuffled = clauses.clone();
        for clause in shuffled.iter_mut() {
            clause.shuffle(&mut rng);
        }
        shuffled.shuffle(&mut rng);

        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::from(clauses.iter()));
        let verdict = solver.solve();

        let mut shuffled_solver = Solver::new();
        shuffled_solver.add_formula(&CnfFormula::from(shuffled.iter()));
        let shuffled_verdict = shuffled_solver.solve();

        prop_assert_eq!(verdict, shuffled_verdict);

        if verdict == SolveResult::Sat {
            let model = solver.model().unwrap();
            for clause in clauses.iter() {
                if !clause.is_empty() {
                    prop_assert!(clause.iter().any(|lit| model.contains(lit)));
                }
            }
        }
    }
}
