//! Decision heuristics.
pub mod vsids;

use partial_ref::{partial, PartialRef};

use norsat_formula::{Lit, Var};

use crate::context::{
    AssignmentP, Context, ImplGraphP, RngP, SolverConfigP, StatsP, TrailP, VsidsP,
};
use crate::prop::{enqueue_assignment, Reason};

/// Make a decision and enqueue it.
///
/// The decision variable is the unassigned variable with the highest VSIDS activity, its
/// polarity comes from [`pick_phase`].
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut RngP,
        mut StatsP,
        mut TrailP,
        mut VsidsP,
        SolverConfigP,
    ),
) -> bool {
    // The heap can contain variables that were assigned since they were last inserted, those
    // are skipped here.
    let decision_var = loop {
        match ctx.part_mut(VsidsP).pop() {
            None => return false,
            Some(var) => {
                if ctx.part(AssignmentP).var_value(var).is_none() {
                    break var;
                }
            }
        }
    };

    let polarity = pick_phase(ctx.borrow(), decision_var);
    let decision = Lit::from_var(decision_var, polarity);

    ctx.part_mut(TrailP).new_decision_level();

    let level = ctx.part(TrailP).current_level();
    let stats = ctx.part_mut(StatsP);
    stats.decisions += 1;
    if level > stats.max_decision_level {
        stats.max_decision_level = level;
    }

    enqueue_assignment(ctx.borrow(), decision, Reason::Decision);

    true
}

/// Select the polarity for a decision variable.
///
/// With phase saving enabled this is the polarity the variable had when it was last unassigned,
/// and the configured initial phase for never assigned variables. The optional random phase
/// diversification overrides the saved phase.
fn pick_phase(
    mut ctx: partial!(Context, mut RngP, AssignmentP, SolverConfigP),
    var: Var,
) -> bool {
    let (config, mut ctx) = ctx.split_part(SolverConfigP);

    if config.random_phase_freq > 0.0
        && ctx.part_mut(RngP).chance(config.random_phase_freq as f64)
    {
        ctx.part_mut(RngP).chance(0.5)
    } else if config.phase_saving {
        ctx.part(AssignmentP)
            .saved_phase(var)
            .unwrap_or(config.initial_phase)
    } else {
        config.initial_phase
    }
}

/// Insert a variable into the decision heap if not already present.
pub fn make_available(mut ctx: partial!(Context, mut VsidsP), var: Var) {
    ctx.part_mut(VsidsP).make_available(var);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use crate::context::set_var_count;
    use crate::prop::backtrack;

    #[test]
    fn decisions_use_saved_phases() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 3);

        // Initial phase is used for variables that were never assigned.
        assert!(make_decision(ctx.borrow()));
        assert!(make_decision(ctx.borrow()));
        assert!(make_decision(ctx.borrow()));
        assert!(!make_decision(ctx.borrow()));

        let trail: Vec<_> = ctx.part(TrailP).trail().iter().cloned().collect();
        assert!(trail.iter().all(|lit| lit.is_positive()));

        backtrack(ctx.borrow(), 0);

        ctx.part_mut(SolverConfigP).initial_phase = false;

        // Now the saved positive phase wins over the initial phase.
        assert!(make_decision(ctx.borrow()));
        assert!(ctx.part(TrailP).trail()[0].is_positive());

        backtrack(ctx.borrow(), 0);

        ctx.part_mut(SolverConfigP).phase_saving = false;

        assert!(make_decision(ctx.borrow()));
        assert!(ctx.part(TrailP).trail()[0].is_negative());

        assert_eq!(ctx.part(StatsP).decisions, 5);
        assert_eq!(ctx.part(StatsP).max_decision_level, 3);
    }
}
