//! Clause database reduction.
use std::mem::replace;

use ordered_float::OrderedFloat;
use partial_ref::{partial, PartialRef};
use vec_mut_scan::VecMutScan;

use crate::context::{
    AssignmentP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, SolverConfigP, StatsP, TrailP,
    WatchlistsP,
};

use super::db::{self, Tier};
use super::gc::collect_garbage;

/// Reduce the number of learned clauses.
///
/// Local tier clauses are ordered by ascending glue level with higher activity breaking ties.
/// Together with the protected core tier clauses, the best of them fill half of the configured
/// learned clause limit; the rest are deleted. Clauses that are currently the reason of a
/// propagation stay.
///
/// Has to run at decision level 0 so that deleted clauses cannot be reasons of entries above
/// the backtracking horizon.
pub fn reduce_learned(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut StatsP,
        mut WatchlistsP,
        AssignmentP,
        SolverConfigP,
        TrailP,
    ),
) {
    debug_assert_eq!(ctx.part(TrailP).current_level(), 0);

    let limit = ctx.part(SolverConfigP).learned_clause_limit;

    let mut locals = replace(
        &mut ctx.part_mut(ClauseDbP).by_tier[Tier::Local as usize],
        vec![],
    );

    {
        let alloc = ctx.part(ClauseAllocP);
        locals.retain(|&cref| !alloc.header(cref).deleted());
        locals.sort_unstable_by_key(|&cref| {
            let header = alloc.header(cref);
            (header.glue(), OrderedFloat(-header.activity()))
        });
    }

    let protected = ctx.part(ClauseDbP).count_by_tier(Tier::Core);
    let keep = (limit / 2).saturating_sub(protected);

    let mut deleted = 0u64;
    let mut kept = 0;

    let mut scan = VecMutScan::new(&mut locals);

    while let Some(cref) = scan.next() {
        if kept < keep {
            kept += 1;
            continue;
        }
        if db::try_delete_clause(ctx.borrow(), *cref) {
            cref.remove();
            deleted += 1;
        }
    }

    drop(scan);

    ctx.part_mut(StatsP).deleted_clauses += deleted;
    ctx.part_mut(StatsP).reductions += 1;
    ctx.part_mut(ClauseDbP).by_tier[Tier::Local as usize] = locals;

    collect_garbage(ctx.borrow());
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use norsat_formula::cnf_formula;

    use crate::clause::assess_learned_clause;
    use crate::config::SolverConfig;
    use crate::context::set_var_count;
    use crate::prop::{enqueue_assignment, Reason};

    #[test]
    fn keeps_protected_and_active_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 20);

        let mut config = SolverConfig::default();
        config.learned_clause_limit = 4;
        *ctx.part_mut(SolverConfigP) = config;

        let formula = cnf_formula![
            1, 2, 3;
            4, 5, 6;
            7, 8, 9;
            10, 11, 12;
            13, 14, 15;
        ];

        let glues = [2, 3, 4, 5, 6];

        let mut crefs = vec![];
        for (lits, &glue) in formula.iter().zip(glues.iter()) {
            let header = assess_learned_clause(ctx.part(SolverConfigP), glue);
            crefs.push(db::add_clause(ctx.borrow(), header, lits));
        }

        // The glue 3 clause is locked as a reason and must survive.
        let locked_lit = ctx.part(ClauseAllocP).lits(crefs[1])[0];
        enqueue_assignment(ctx.borrow(), locked_lit, Reason::Long(crefs[1]));

        reduce_learned(ctx.borrow());

        let alloc = ctx.part(ClauseAllocP);
        let deleted: Vec<bool> = crefs
            .iter()
            .map(|&cref| alloc.header(cref).deleted())
            .collect();

        // The protected glue 2 clause is kept, the keep budget of one local clause goes to
        // the locked glue 3 clause, everything else is deleted.
        assert_eq!(deleted, vec![false, false, true, true, true]);

        assert_eq!(ctx.part(StatsP).deleted_clauses, 3);
        assert_eq!(ctx.part(StatsP).reductions, 1);
        assert_eq!(ctx.part(ClauseDbP).count_by_tier(Tier::Local), 1);

        // Deleted clauses have no remaining watches.
        for (&cref, lits) in crefs.iter().zip(formula.iter()) {
            if ctx.part(ClauseAllocP).header(cref).deleted() {
                for &lit in &lits[..2] {
                    assert!(ctx
                        .part(WatchlistsP)
                        .watched_by(!lit)
                        .iter()
                        .all(|watch| watch.cref != cref));
                }
            }
        }
    }
}
