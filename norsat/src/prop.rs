//! Unit propagation.
pub mod assignment;
pub mod binary;
pub mod graph;
pub mod long;
pub mod watch;

pub use assignment::{backtrack, enqueue_assignment, Assignment, Trail};
pub use graph::{Conflict, ImplGraph, Reason};
pub use watch::{Watch, Watchlists};

use partial_ref::{partial, PartialRef};

use crate::context::{
    AssignmentP, BinaryClausesP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, StatsP, TrailP,
    VsidsP, WatchlistsP,
};

/// Propagate all enqueued assignments.
///
/// Returns `Ok` when a fixed point is reached without a conflicting assignment and
/// `Err(conflict)` as soon as a clause with no non-false literal is found. Trail entries are
/// consumed strictly in assignment order. For each entry the implications of binary clauses are
/// followed before the long clauses watched by the entry are examined.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
        BinaryClausesP,
        ClauseDbP,
    ),
) -> Result<(), Conflict> {
    enable_watchlists(ctx.borrow());

    while let Some(lit) = ctx.part_mut(TrailP).pop_queue() {
        binary::propagate_binary(ctx.borrow(), lit)?;
        long::propagate_long(ctx.borrow(), lit)?;
    }

    Ok(())
}

/// Rebuild the watchlists from the clause database when they are disabled.
///
/// Initial watch attachment and reattachment after a garbage collection both go through this.
pub fn enable_watchlists(
    mut ctx: partial!(Context, mut WatchlistsP, ClauseAllocP, ClauseDbP),
) {
    if ctx.part(WatchlistsP).enabled() {
        return;
    }

    let (watchlists, mut ctx) = ctx.split_part_mut(WatchlistsP);
    let (db, ctx) = ctx.split_part(ClauseDbP);
    let alloc = ctx.part(ClauseAllocP);

    watchlists.enable();

    for &cref in db.clauses() {
        if alloc.header(cref).deleted() {
            continue;
        }
        let lits = alloc.lits(cref);
        watchlists.watch_clause(cref, [lits[0], lits[1]]);
    }
}

/// Undo all decisions.
pub fn restart(mut ctx: partial!(Context, mut AssignmentP, mut TrailP, mut VsidsP)) {
    backtrack(ctx.borrow(), 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;
    use proptest::prelude::*;

    use crate::context::set_var_count;
    use crate::decision::make_decision;
    use crate::load::load_clause;
    use crate::test::sat_formula;

    proptest! {
        /// After every propagation fixed point each clause is satisfied or watched by two
        /// non-false literals, and every propagated entry's reason clause has exactly the
        /// propagated literal true with all other literals false at lower or equal levels.
        #[test]
        fn watch_and_reason_invariants(
            formula in sat_formula(4..20usize, 20..80usize, 1..6usize),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            loop {
                if propagate(ctx.borrow()).is_err() {
                    break;
                }

                for &cref in ctx.part(ClauseDbP).clauses() {
                    if ctx.part(ClauseAllocP).header(cref).deleted() {
                        continue;
                    }
                    let lits = ctx.part(ClauseAllocP).lits(cref);

                    let satisfied = lits
                        .iter()
                        .any(|&lit| ctx.part(AssignmentP).lit_is_true(lit));
                    let watches_non_false = !ctx.part(AssignmentP).lit_is_false(lits[0])
                        && !ctx.part(AssignmentP).lit_is_false(lits[1]);

                    prop_assert!(satisfied || watches_non_false);
                }

                for &lit in ctx.part(TrailP).trail() {
                    if let &Reason::Long(cref) = ctx.part(ImplGraphP).reason(lit.var()) {
                        let lits = ctx.part(ClauseAllocP).lits(cref);

                        prop_assert_eq!(lits[0], lit);
                        for &other in &lits[1..] {
                            prop_assert!(ctx.part(AssignmentP).lit_is_false(other));
                            prop_assert!(
                                ctx.part(ImplGraphP).level(other.var())
                                    <= ctx.part(ImplGraphP).level(lit.var())
                            );
                        }
                    }
                }

                if !make_decision(ctx.borrow()) {
                    break;
                }
            }
        }
    }
}
