//! Propagation of binary clauses.
use partial_ref::{partial, PartialRef};

use norsat_formula::Lit;

use crate::context::{AssignmentP, BinaryClausesP, Context, ImplGraphP, StatsP, TrailP};

use super::enqueue_assignment;
use super::{Conflict, Reason};

/// Follow all binary implications of a newly assigned literal.
///
/// Each implied literal is either already true (nothing to do), unassigned (enqueue it), or
/// false, in which case the binary clause is conflicting and returned.
pub fn propagate_binary(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut StatsP,
        mut TrailP,
        BinaryClausesP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let (binary_clauses, mut ctx) = ctx.split_part(BinaryClausesP);

    for &implied in binary_clauses.implied_by(lit) {
        match ctx.part(AssignmentP).lit_value(implied) {
            Some(true) => {}
            Some(false) => return Err(Conflict::Binary([implied, !lit])),
            None => enqueue_assignment(ctx.borrow(), implied, Reason::Binary([!lit])),
        }
    }

    Ok(())
}
