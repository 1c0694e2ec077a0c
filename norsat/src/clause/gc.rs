//! Garbage collection of long clauses.
//!
//! Deleted clauses only free their space when the arena is rebuilt. Compaction copies every
//! live clause into a fresh arena, which invalidates all existing [`ClauseRef`]s: the
//! implication graph entries of reason clauses are rewritten on the spot, and the watchlists
//! are invalidated wholesale and rebuilt on the next propagation.
use partial_ref::{partial, PartialRef};

use crate::context::{ClauseAllocP, ClauseDbP, Context, ImplGraphP, TrailP, WatchlistsP};
use crate::prop::Reason;

use super::{ClauseAlloc, ClauseRef, Tier};

/// Compact the clause arena when at least half of it is garbage.
///
/// The threshold amortizes the copying costs over the deletions.
pub fn collect_garbage(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut WatchlistsP,
        TrailP,
    ),
) {
    let garbage = ctx.part(ClauseDbP).garbage_size;
    if garbage * 2 > ctx.part(ClauseAllocP).buffer_size() {
        compact(ctx.borrow());
    }
}

/// Targets of the clauses moved during one compaction.
struct MovedClauses {
    alloc: ClauseAlloc,
    clauses: Vec<ClauseRef>,
    by_tier: [Vec<ClauseRef>; Tier::count()],
}

impl MovedClauses {
    /// Copy one clause out of the old arena.
    ///
    /// The old clause is marked so that it is not moved a second time.
    fn move_clause(&mut self, old: &mut ClauseAlloc, cref: ClauseRef) -> ClauseRef {
        let mut header = old.header(cref).clone();
        debug_assert!(!header.deleted() && !header.mark());

        header.set_mark(false);
        let tier = header.tier();

        let new_cref = self.alloc.add_clause(header, old.lits(cref));
        old.header_mut(cref).set_mark(true);

        self.clauses.push(new_cref);
        self.by_tier[tier as usize].push(new_cref);

        new_cref
    }
}

/// Rebuild the arena from the live clauses.
fn compact(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut WatchlistsP,
        TrailP,
    ),
) {
    // Watch entries hold clause references, so they all become stale now.
    ctx.part_mut(WatchlistsP).disable();

    let (db, mut ctx) = ctx.split_part_mut(ClauseDbP);
    let (impl_graph, mut ctx) = ctx.split_part_mut(ImplGraphP);
    let (trail, mut ctx) = ctx.split_part(TrailP);
    let alloc = ctx.part_mut(ClauseAllocP);

    assert!(
        db.garbage_size <= alloc.buffer_size(),
        "garbage accounting out of sync with the arena"
    );
    let live_size = alloc.buffer_size() - db.garbage_size;

    let mut moved = MovedClauses {
        // Leave headroom so the next learned clauses do not grow the buffer right away.
        alloc: ClauseAlloc::with_capacity(live_size + live_size / 2),
        clauses: Vec::with_capacity(db.clauses.len()),
        by_tier: Default::default(),
    };

    // Reason clauses go first. Their trail entries know the old reference, so the new one can
    // be recorded in the implication graph while both are at hand.
    for &lit in trail.trail() {
        if let &Reason::Long(cref) = impl_graph.reason(lit.var()) {
            let new_cref = moved.move_clause(alloc, cref);
            impl_graph.update_reason(lit.var(), Reason::Long(new_cref));
        }
    }

    // Everything else follows, skipping deleted clauses and the reasons moved above.
    for &cref in db.clauses.iter() {
        let header = alloc.header(cref);
        if !header.deleted() && !header.mark() {
            moved.move_clause(alloc, cref);
        }
    }

    *ctx.part_mut(ClauseAllocP) = moved.alloc;
    db.clauses = moved.clauses;
    db.by_tier = moved.by_tier;
    db.garbage_size = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use norsat_formula::{cnf_formula, Lit};

    use crate::clause::{db, ClauseHeader};
    use crate::context::set_var_count;
    use crate::prop::enqueue_assignment;

    #[test]
    fn compaction_keeps_live_clauses_and_reasons() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 12);

        let keep = cnf_formula![
            1, 2, 3;
            4, 5, 6, 7;
            8, -9, 10;
        ];
        let drop = cnf_formula![
            -1, -2, -3, -4, -5;
            -6, -7, -8, -9, -10;
            1, 3, 5, 7, 9, 11;
        ];

        let mut kept_refs = vec![];
        for lits in keep.iter() {
            kept_refs.push(db::add_clause(ctx.borrow(), ClauseHeader::new(), lits));
        }

        // The second kept clause is the reason of its first literal.
        let propagated = ctx.part(ClauseAllocP).lits(kept_refs[1])[0];
        enqueue_assignment(ctx.borrow(), propagated, Reason::Long(kept_refs[1]));

        let mut dropped_refs = vec![];
        for lits in drop.iter() {
            dropped_refs.push(db::add_clause(ctx.borrow(), ClauseHeader::new(), lits));
        }
        for &cref in dropped_refs.iter() {
            db::delete_clause(ctx.borrow(), cref);
        }

        let size_before = ctx.part(ClauseAllocP).buffer_size();

        collect_garbage(ctx.borrow());

        // More than half of the arena was garbage, so it was rebuilt.
        assert!(ctx.part(ClauseAllocP).buffer_size() < size_before);
        assert_eq!(ctx.part(ClauseDbP).garbage_size, 0);
        assert!(!ctx.part(WatchlistsP).enabled());

        // Exactly the live clauses survive, none of them marked.
        let mut surviving: Vec<Vec<Lit>> = vec![];
        for &cref in ctx.part(ClauseDbP).clauses() {
            assert!(!ctx.part(ClauseAllocP).header(cref).mark());
            surviving.push(ctx.part(ClauseAllocP).lits(cref).to_vec());
        }
        surviving.sort();

        let mut expected: Vec<Vec<Lit>> = keep.iter().map(|lits| lits.to_vec()).collect();
        expected.sort();

        assert_eq!(surviving, expected);

        // The trail entry's reason was remapped to the moved clause.
        let lit = ctx.part(TrailP).trail()[0];
        match *ctx.part(ImplGraphP).reason(lit.var()) {
            Reason::Long(cref) => {
                assert_eq!(ctx.part(ClauseAllocP).lits(cref)[0], lit);
            }
            ref other => panic!("reason changed kind: {:?}", other),
        }
    }
}
