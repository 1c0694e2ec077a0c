//! Database for long clauses.
use std::mem::transmute;

use partial_ref::{partial, PartialRef};

use crate::context::{AssignmentP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, WatchlistsP};
use crate::prop::Reason;

use norsat_formula::Lit;

use super::{header::HEADER_LEN, ClauseHeader, ClauseRef};

/// Partitions of the clause database.
///
/// Clauses of the input formula are `Irred` and always kept. Learned clauses whose LBD at
/// learning time was at or below the configured glue threshold are `Core` and also never
/// deleted. All other learned clauses are `Local` and candidates for deletion when the database
/// is reduced.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Tier {
    Irred = 0,
    Core = 1,
    Local = 2,
}

impl Tier {
    /// Total number of tiers.
    pub const fn count() -> usize {
        3
    }

    /// Cast an index into the corresponding tier.
    ///
    /// # Safety
    /// The index must be below `Tier::count()`.
    pub unsafe fn from_index(index: usize) -> Tier {
        debug_assert!(index < Tier::count());
        transmute(index as u8)
    }
}

/// Database for long clauses.
///
/// Deleted clauses are only marked in their header, removal from the `clauses` and `by_tier`
/// lists is delayed until the next garbage collection or reduction. Code iterating over these
/// lists has to check the deleted flag.
#[derive(Default)]
pub struct ClauseDb {
    /// All long clauses, may contain deleted clauses.
    pub(super) clauses: Vec<ClauseRef>,
    /// Long clauses by tier, may contain deleted clauses.
    pub(super) by_tier: [Vec<ClauseRef>; Tier::count()],
    /// These counts are always up to date.
    pub(super) count_by_tier: [usize; Tier::count()],
    /// Size of deleted but not yet collected clauses.
    pub(super) garbage_size: usize,
}

impl ClauseDb {
    /// The number of long clauses of a given tier.
    pub fn count_by_tier(&self, tier: Tier) -> usize {
        self.count_by_tier[tier as usize]
    }

    /// The number of stored learned clauses.
    pub fn learned_count(&self) -> usize {
        self.count_by_tier(Tier::Core) + self.count_by_tier(Tier::Local)
    }

    /// All long clauses.
    ///
    /// May contain clauses marked as deleted.
    pub fn clauses(&self) -> &[ClauseRef] {
        &self.clauses
    }
}

/// Add a long clause to the database.
pub fn add_clause(
    mut ctx: partial!(Context, mut ClauseDbP, mut ClauseAllocP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let tier = header.tier();

    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);

    let db = ctx.part_mut(ClauseDbP);

    db.clauses.push(cref);
    db.by_tier[tier as usize].push(cref);
    db.count_by_tier[tier as usize] += 1;

    cref
}

/// Delete a long clause from the database.
///
/// The clause is only marked here. The caller is responsible for making sure no watches and no
/// reasons on the trail refer to the clause.
pub fn delete_clause(mut ctx: partial!(Context, mut ClauseDbP, mut ClauseAllocP), cref: ClauseRef) {
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);
    let db = ctx.part_mut(ClauseDbP);

    let header = alloc.header_mut(cref);

    debug_assert!(!header.deleted(), "delete_clause for already deleted clause");

    header.set_deleted(true);

    db.count_by_tier[header.tier() as usize] -= 1;

    db.garbage_size += header.len() + HEADER_LEN;
}

/// Whether a long clause is the reason of an assignment on the trail.
pub fn clause_is_locked(
    ctx: partial!(Context, AssignmentP, ClauseAllocP, ImplGraphP),
    cref: ClauseRef,
) -> bool {
    // A propagating clause has the propagated literal in position 0.
    let propagated = ctx.part(ClauseAllocP).lits(cref)[0];

    ctx.part(AssignmentP).lit_is_true(propagated)
        && ctx.part(ImplGraphP).reason(propagated.var()) == &Reason::Long(cref)
}

/// Delete a long clause unless it is the reason of an assignment on the trail.
///
/// On deletion the clause's watches are removed. Returns whether the clause was deleted.
pub fn try_delete_clause(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut WatchlistsP,
        AssignmentP,
        ImplGraphP
    ),
    cref: ClauseRef,
) -> bool {
    if clause_is_locked(ctx.borrow(), cref) {
        return false;
    }

    let lits = ctx.part(ClauseAllocP).lits(cref);
    let watched = [lits[0], lits[1]];
    ctx.part_mut(WatchlistsP).detach_clause(cref, watched);

    delete_clause(ctx.borrow(), cref);

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use norsat_formula::cnf_formula;

    #[test]
    fn tier_counts_and_deletes() {
        let mut ctx = Context::default();

        let mut ctx = ctx.into_partial_ref_mut();

        let clauses = cnf_formula![
            1, 2, 3;
            4, -5, 6;
            -2, 3, -4;
            -3, 5, 2, 7, 5;
        ];

        let tiers = vec![Tier::Irred, Tier::Core, Tier::Local, Tier::Local];

        let mut crefs = vec![];

        for (clause, &tier) in clauses.iter().zip(tiers.iter()) {
            let mut header = ClauseHeader::new();
            header.set_tier(tier);
            let cref = add_clause(ctx.borrow(), header, clause);
            crefs.push(cref);
        }

        assert_eq!(ctx.part(ClauseDbP).count_by_tier(Tier::Irred), 1);
        assert_eq!(ctx.part(ClauseDbP).count_by_tier(Tier::Core), 1);
        assert_eq!(ctx.part(ClauseDbP).count_by_tier(Tier::Local), 2);
        assert_eq!(ctx.part(ClauseDbP).learned_count(), 3);

        delete_clause(ctx.borrow(), crefs[0]);
        delete_clause(ctx.borrow(), crefs[2]);

        assert_eq!(ctx.part(ClauseDbP).count_by_tier(Tier::Irred), 0);
        assert_eq!(ctx.part(ClauseDbP).count_by_tier(Tier::Core), 1);
        assert_eq!(ctx.part(ClauseDbP).count_by_tier(Tier::Local), 1);
        assert!(ctx.part(ClauseDbP).garbage_size > 0);
    }
}
