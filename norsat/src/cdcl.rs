//! Conflict driven clause learning.

use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::activity::{bump_clause_activity, decay_clause_activities};
use crate::clause::{assess_learned_clause, db};
use crate::context::{
    AnalyzeConflictP, AssignmentP, BinaryClausesP, ClauseActivityP, ClauseAllocP, ClauseDbP,
    Context, ImplGraphP, RngP, SatStateP, ScheduleP, ScratchP, SolverConfigP, StatsP, TrailP,
    VsidsP, WatchlistsP,
};
use crate::decision::make_decision;
use crate::glue::compute_glue;
use crate::prop::{backtrack, enqueue_assignment, propagate, Conflict, Reason};
use crate::state::SatState;

/// Find a conflict, learn a clause and backjump.
///
/// When no conflict is left the formula is satisfiable and the solver state is updated instead.
pub fn conflict_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut RngP,
        mut SatStateP,
        mut ScheduleP,
        mut ScratchP,
        mut StatsP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) {
    let conflict = match find_conflict(ctx.borrow()) {
        Ok(()) => {
            *ctx.part_mut(SatStateP) = SatState::Sat;
            return;
        }
        Err(conflict) => conflict,
    };

    ctx.part_mut(StatsP).conflicts += 1;

    let trail_size = ctx.part(TrailP).trail().len();

    let backtrack_to = analyze_conflict(ctx.borrow(), conflict);

    let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);

    for &cref in analyze.involved() {
        bump_clause_activity(ctx.borrow(), cref);
    }

    decay_clause_activities(ctx.borrow());

    let clause = analyze.clause();

    if clause.is_empty() {
        *ctx.part_mut(SatStateP) = SatState::Unsat;
        return;
    }

    // The glue level is computed while the clause is still conflicting, so it counts the
    // current decision level once more than it will after backjumping, when the clause becomes
    // asserting.
    let glue = (compute_glue(ctx.borrow(), clause) - 1).max(1);

    let (config, mut ctx) = ctx.split_part(SolverConfigP);

    ctx.part_mut(ScheduleP)
        .note_conflict(config, glue, trail_size);

    let stats = ctx.part_mut(StatsP);
    stats.learned_clauses += 1;
    if glue <= config.glue_threshold {
        stats.glue_clauses += 1;
    }

    backtrack(ctx.borrow(), backtrack_to);

    let reason = match *clause {
        [_] => Reason::Unit,
        [lit_0, lit_1] => {
            ctx.part_mut(BinaryClausesP).insert([lit_0, lit_1]);
            Reason::Binary([lit_1])
        }
        _ => {
            let header = assess_learned_clause(config, glue);
            let cref = db::add_clause(ctx.borrow(), header, clause);
            ctx.part_mut(WatchlistsP)
                .watch_clause(cref, [clause[0], clause[1]]);
            Reason::Long(cref)
        }
    };

    enqueue_assignment(ctx.borrow(), clause[0], reason);
}

/// Find a conflict.
///
/// Returns `Err` with the conflict when one was found and `Ok` when a satisfying assignment was
/// found instead.
fn find_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut RngP,
        mut StatsP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        BinaryClausesP,
        ClauseDbP,
        SolverConfigP,
    ),
) -> Result<(), Conflict> {
    loop {
        propagate(ctx.borrow())?;

        if !make_decision(ctx.borrow()) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use partial_ref::IntoPartialRefMut;

    use norsat_formula::cnf_formula;

    use crate::context::set_var_count;
    use crate::load::load_clause;
    use crate::state::SatState;

    use crate::test::{pigeonhole_formula, sat_formula};

    #[test]
    fn level_0_unsat() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1, 2, 3;
            -1;
            1, -2;
            2, -3;
        ];

        set_var_count(ctx.borrow(), formula.var_count());

        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        while *ctx.part(SatStateP) == SatState::Unknown {
            conflict_step(ctx.borrow());
        }

        assert_eq!(*ctx.part(SatStateP), SatState::Unsat);
    }

    proptest! {
        #[test]
        fn pigeonhole_unsat(formula in pigeonhole_formula(1..6usize)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            while *ctx.part(SatStateP) == SatState::Unknown {
                conflict_step(ctx.borrow());
            }

            prop_assert_eq!(*ctx.part(SatStateP), SatState::Unsat);
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 1..6usize)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            while *ctx.part(SatStateP) == SatState::Unknown {
                conflict_step(ctx.borrow());
            }

            prop_assert_eq!(*ctx.part(SatStateP), SatState::Sat);

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|&lit| ctx.part(AssignmentP).lit_is_true(lit)));
            }
        }

        #[test]
        fn pigeonhole_incremental_clauses(formula in pigeonhole_formula(1..6usize)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            let mut last_state = SatState::Sat;

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
                while *ctx.part(SatStateP) == SatState::Unknown {
                    conflict_step(ctx.borrow());
                }

                if *ctx.part(SatStateP) != last_state {
                    prop_assert_eq!(*ctx.part(SatStateP), SatState::Unsat);
                    prop_assert_eq!(last_state, SatState::Sat);
                    last_state = *ctx.part(SatStateP);
                }
            }

            prop_assert_eq!(last_state, SatState::Unsat);
        }
    }
}
