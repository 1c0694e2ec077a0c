//! Clause activities.
//!
//! Each long clause carries an activity in its header. Clauses resolved on during conflict
//! analysis are bumped, and after every conflict the bump amount grows, which implicitly ages
//! all earlier bumps. The reduction pass uses activities to break ties between clauses of
//! equal glue level.
use partial_ref::{partial, PartialRef};

use crate::{
    config::SolverConfig,
    context::{parts::*, Context},
};

use super::ClauseRef;

/// All activities and the increment are divided by this amount when an activity grows past it.
const RESCALE_AT: f32 = 1e30;

/// Global state for bumping clause activities.
pub struct ClauseActivity {
    /// Amount added to a clause's activity when it is bumped.
    increment: f32,
    /// Factor by which the increment grows after each conflict.
    decay: f32,
}

impl Default for ClauseActivity {
    fn default() -> ClauseActivity {
        ClauseActivity {
            increment: 1.0,
            decay: SolverConfig::default().clause_activity_decay,
        }
    }
}

impl ClauseActivity {
    /// Change the decay factor.
    pub fn set_decay(&mut self, decay: f32) {
        assert!(decay > 1.0 / 16.0 && decay < 1.0);
        self.decay = decay;
    }
}

/// Increase the activity of a clause.
pub fn bump_clause_activity(
    mut ctx: partial!(
        Context,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
    ),
    cref: ClauseRef,
) {
    let increment = ctx.part(ClauseActivityP).increment;

    let header = ctx.part_mut(ClauseAllocP).header_mut(cref);
    let bumped = header.activity() + increment;
    header.set_activity(bumped);

    if bumped > RESCALE_AT {
        rescale_all(ctx.borrow());
    }
}

/// Age all clause activities by growing the increment.
pub fn decay_clause_activities(
    mut ctx: partial!(
        Context,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
    ),
) {
    let activity = ctx.part_mut(ClauseActivityP);
    activity.increment /= activity.decay;
    if activity.increment > RESCALE_AT {
        rescale_all(ctx.borrow());
    }
}

/// Scale every stored activity and the increment down to stay within f32 range.
///
/// Only the relative order of activities matters, so this does not change any reduction
/// decision.
fn rescale_all(
    mut ctx: partial!(
        Context,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
    ),
) {
    let factor = 1.0 / RESCALE_AT;

    let (db, mut ctx) = ctx.split_part(ClauseDbP);
    {
        let alloc = ctx.part_mut(ClauseAllocP);
        for &cref in db.clauses() {
            let header = alloc.header_mut(cref);
            if !header.deleted() {
                header.set_activity(header.activity() * factor);
            }
        }
    }

    ctx.part_mut(ClauseActivityP).increment *= factor;
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use norsat_formula::cnf_formula;

    use crate::clause::{db, ClauseHeader};

    #[test]
    fn bumps_age_and_rescale() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1, 2, 3;
            4, 5, 6;
        ];

        let mut crefs = vec![];
        for lits in formula.iter() {
            crefs.push(db::add_clause(ctx.borrow(), ClauseHeader::new(), lits));
        }

        bump_clause_activity(ctx.borrow(), crefs[0]);
        decay_clause_activities(ctx.borrow());
        bump_clause_activity(ctx.borrow(), crefs[1]);

        // The later bump is worth more.
        let first = ctx.part(ClauseAllocP).header(crefs[0]).activity();
        let second = ctx.part(ClauseAllocP).header(crefs[1]).activity();
        assert!(second > first);

        // Force a rescale and check that the order is preserved.
        for _ in 0..200_000 {
            decay_clause_activities(ctx.borrow());
        }
        bump_clause_activity(ctx.borrow(), crefs[0]);

        let first = ctx.part(ClauseAllocP).header(crefs[0]).activity();
        let second = ctx.part(ClauseAllocP).header(crefs[1]).activity();
        assert!(first > second);
        assert!(first.is_finite());
        assert!(ctx.part(ClauseActivityP).increment <= RESCALE_AT);
    }
}
