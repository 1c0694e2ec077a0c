//! Propagation of long clauses.
use std::mem::take;

use partial_ref::{partial, PartialRef};

use norsat_formula::Lit;

use crate::context::{
    AssignmentP, ClauseAllocP, Context, ImplGraphP, StatsP, TrailP, WatchlistsP,
};

use super::enqueue_assignment;
use super::{Conflict, Reason, Watch};

/// Propagate all literals implied by long clauses watched by the given literal.
///
/// On conflict return the clause propagating the conflicting assignment.
///
/// See [`prop::watch`](crate::prop::watch) for the invariants that this has to uphold.
pub fn propagate_long(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let (watchlists, mut ctx) = ctx.split_part_mut(WatchlistsP);
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);

    // The watchlist of lit is taken out while it is scanned. Replacement watches are only ever
    // added to the lists of other literals, so nothing is lost by this.
    let mut watches = take(watchlists.watched_by_mut(lit));

    let false_lit = !lit;

    // Watches are compacted in place. Everything below write stays on this list.
    let mut write = 0;
    let mut read = 0;

    let mut conflict = None;

    'watches: while read < watches.len() {
        let watch = watches[read];
        read += 1;

        // If the blocking literal (which is part of the watched clause) is already true, the
        // watched clause is satisfied and we don't even have to look at it.
        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            watches[write] = watch;
            write += 1;
            continue;
        }

        let cref = watch.cref;

        let lits = alloc.lits_mut(cref);

        // Move the literal that just became false into position 1. Future propagations of this
        // clause require the propagating literal in position 0, and the scan below only looks
        // at positions 2 and up.
        if lits[0] == false_lit {
            lits.swap(0, 1);
        }
        let first = lits[0];

        debug_assert_eq!(lits[1], false_lit);

        // The watch is recreated with the other watched literal as blocking literal. It either
        // replaces the processed watch or moves to the list of a replacement literal.
        let new_watch = Watch {
            cref,
            blocking: first,
        };

        // If the other watched literal (now in position 0) is true, the clause is satisfied.
        if first != watch.blocking && ctx.part(AssignmentP).lit_is_true(first) {
            watches[write] = new_watch;
            write += 1;
            continue;
        }

        // Search the unwatched literals for a non-false replacement watch.
        for pos in 2..lits.len() {
            let replacement = lits[pos];
            if !ctx.part(AssignmentP).lit_is_false(replacement) {
                lits[1] = replacement;
                lits[pos] = false_lit;

                // The replacement literal is unassigned or true, so it cannot be watched by the
                // list that is currently taken out.
                debug_assert_ne!(!replacement, lit);
                watchlists.add_watch(!replacement, new_watch);
                continue 'watches;
            }
        }

        // No replacement, so the clause is unit or conflicting and stays watched as is.
        watches[write] = new_watch;
        write += 1;

        if ctx.part(AssignmentP).lit_is_false(first) {
            // Keep the watches not processed yet.
            while read < watches.len() {
                watches[write] = watches[read];
                write += 1;
                read += 1;
            }

            conflict = Some(Conflict::Long(cref));
            break;
        }

        enqueue_assignment(ctx.borrow(), first, Reason::Long(cref));
    }

    watches.truncate(write);
    *watchlists.watched_by_mut(lit) = watches;

    match conflict {
        None => Ok(()),
        Some(conflict) => Err(conflict),
    }
}
