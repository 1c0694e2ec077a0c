//! Loading a formula into the solver.
use partial_ref::{partial, PartialRef};

use norsat_formula::Lit;

use crate::clause::{db, ClauseHeader, Tier};
use crate::context::{
    AssignmentP, BinaryClausesP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, SatStateP,
    ScratchP, StatsP, TrailP, VsidsP, WatchlistsP,
};
use crate::prop::{backtrack, enqueue_assignment, Reason};
use crate::state::SatState;

/// Add a clause to the current formula.
///
/// The clause is normalized first: duplicate literals collapse, tautologies and clauses
/// already satisfied at level 0 are dropped entirely, and literals false at level 0 are
/// removed. What remains is dispatched by length: the empty clause makes the formula
/// unsatisfiable, units are placed on the level 0 trail, binary clauses go to the implication
/// lists and everything longer into the clause arena.
///
/// The variable count is not adjusted here, grow it before calling this.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SatStateP,
        mut ScratchP,
        mut StatsP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) {
    match *ctx.part(SatStateP) {
        SatState::Unsat => return,
        SatState::Sat => {
            *ctx.part_mut(SatStateP) = SatState::Unknown;
        }
        SatState::Unknown => {}
    }

    // New clauses invalidate the current search progress.
    backtrack(ctx.borrow(), 0);

    let (scratch, mut ctx) = ctx.split_part_mut(ScratchP);

    scratch.clause.clear();
    scratch.clause.extend_from_slice(lits);
    scratch.clause.sort_unstable();

    // After sorting by code, duplicates are adjacent and so are the two literals of one
    // variable. A single pass catches repeated literals, tautologies, and literal values fixed
    // at level 0.
    scratch.kept.clear();
    let mut previous = None;

    for &lit in scratch.clause.iter() {
        if previous == Some(lit) {
            continue;
        }
        if previous == Some(!lit) {
            // The clause contains a variable in both polarities.
            return;
        }
        previous = Some(lit);

        match ctx.part(AssignmentP).lit_value(lit) {
            Some(true) => return,
            Some(false) => {}
            None => scratch.kept.push(lit),
        }
    }

    match scratch.kept[..] {
        [] => *ctx.part_mut(SatStateP) = SatState::Unsat,
        [unit] => enqueue_assignment(ctx.borrow(), unit, Reason::Unit),
        [a, b] => ctx.part_mut(BinaryClausesP).insert([a, b]),
        ref clause => {
            let mut header = ClauseHeader::new();
            header.set_tier(Tier::Irred);

            let cref = db::add_clause(ctx.borrow(), header, clause);
            ctx.part_mut(WatchlistsP)
                .watch_clause(cref, [clause[0], clause[1]]);
        }
    }
}
