//! Glue levels of clauses.
//!
//! The glue level of a clause, also called literal block distance (LBD), is the number of
//! distinct decision levels among its literals. Clauses with a low glue level connect few
//! decisions and tend to stay useful, which the clause database reduction and the Glucose
//! restart policy both rely on.
use partial_ref::{partial, PartialRef};

use norsat_formula::Lit;

use crate::context::{parts::*, Context};

/// Number of distinct decision levels among the given literals.
///
/// All literals have to be assigned.
pub fn compute_glue(mut ctx: partial!(Context, mut ScratchP, ImplGraphP), lits: &[Lit]) -> usize {
    let (scratch, ctx) = ctx.split_part_mut(ScratchP);
    let graph = ctx.part(ImplGraphP);

    let mut distinct = 0;

    for &lit in lits {
        let seen = &mut scratch.level_flags[graph.level(lit.var())];
        if !*seen {
            *seen = true;
            distinct += 1;
        }
    }

    // Leave the flags clean for the next caller.
    for &lit in lits {
        scratch.level_flags[graph.level(lit.var())] = false;
    }

    distinct
}
