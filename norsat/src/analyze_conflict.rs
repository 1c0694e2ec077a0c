//! Learns a new clause by analyzing a conflict.
use partial_ref::{partial, split_borrow, PartialRef};

use vec_mut_scan::VecMutScan;

use norsat_formula::{Lit, Var};

use crate::clause::{ClauseAlloc, ClauseRef};
use crate::context::{AnalyzeConflictP, ClauseAllocP, Context, ImplGraphP, TrailP, VsidsP};
use crate::prop::{Conflict, ImplGraph, Reason};

/// Working state of the conflict analysis.
#[derive(Default)]
pub struct AnalyzeConflict {
    /// The learned clause under construction.
    clause: Vec<Lit>,
    /// Number of current-level literals that still have to be resolved away.
    pending: usize,
    /// Per-variable flag: in the clause, pending, or known redundant.
    seen: Vec<bool>,
    /// Variables whose `seen` flag has to be cleared when the analysis is done.
    seen_vars: Vec<Var>,
    /// Long clauses resolved on, reported for activity bumping.
    involved: Vec<ClauseRef>,
    /// Worklist of the minimization search.
    stack: Vec<Lit>,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.seen.resize(count, false);
    }

    /// The learned clause.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }

    /// Long clauses involved in the conflict.
    pub fn involved(&self) -> &[ClauseRef] {
        &self.involved
    }
}

/// Learn a clause from a conflict by resolution to the first unique implication point.
///
/// Starting from the conflicting clause, literals of the current decision level are resolved
/// with their reasons in reverse trail order until one is left; its negation becomes the
/// asserting literal. Literals of other levels collect in the learned clause and are then
/// minimized. The clause ends up with the asserting literal in position 0 and a literal of the
/// returned backjump level in position 1, so watching positions 0 and 1 makes it propagate as
/// soon as the backjump finishes.
///
/// Returns the backjump level. A conflict at level 0 yields the empty clause, meaning the
/// formula is unsatisfiable.
pub fn analyze_conflict(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut VsidsP,
        ClauseAllocP,
        ImplGraphP,
        TrailP,
    ),
    conflict: Conflict,
) -> usize {
    split_borrow!(alloc_ctx = &(ClauseAllocP) ctx);
    let alloc = alloc_ctx.part(ClauseAllocP);

    {
        let analyze = ctx.part_mut(AnalyzeConflictP);
        analyze.clause.clear();
        analyze.involved.clear();
        analyze.pending = 0;
    }

    if ctx.part(TrailP).current_level() == 0 {
        return 0;
    }

    for &lit in conflict.lits(alloc) {
        note_literal(ctx.borrow(), lit);
    }
    if let Conflict::Long(cref) = conflict {
        ctx.part_mut(AnalyzeConflictP).involved.push(cref);
    }

    split_borrow!(trail_ctx = &(TrailP) ctx);
    let trail = trail_ctx.part(TrailP).trail();

    // Resolve in reverse chronological order until one current-level literal remains.
    let mut pos = trail.len();
    let asserting = loop {
        debug_assert!(pos > 0, "ran out of trail during conflict analysis");
        pos -= 1;
        let lit = trail[pos];

        {
            let analyze = ctx.part_mut(AnalyzeConflictP);
            if !analyze.seen[lit.index()] {
                continue;
            }
            analyze.seen[lit.index()] = false;
            analyze.pending -= 1;
            if analyze.pending == 0 {
                break lit;
            }
        }

        let (graph, mut ctx) = ctx.split_part(ImplGraphP);
        let reason = graph.reason(lit.var());

        for &reason_lit in reason.lits(alloc) {
            note_literal(ctx.borrow(), reason_lit);
        }
        if let &Reason::Long(cref) = reason {
            ctx.part_mut(AnalyzeConflictP).involved.push(cref);
        }
    };

    // The learned clause asserts the negation of the first UIP, in position 0.
    {
        let analyze = ctx.part_mut(AnalyzeConflictP);
        analyze.clause.push(!asserting);
        let end = analyze.clause.len() - 1;
        analyze.clause.swap(0, end);
    }

    minimize_clause(ctx.borrow());

    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);

    for var in analyze.seen_vars.drain(..) {
        analyze.seen[var.index()] = false;
    }

    // The deepest remaining level is the backjump target; its literal moves to position 1 to
    // become the second watch.
    let mut backjump = 0;

    if analyze.clause.len() > 1 {
        let graph = ctx.part(ImplGraphP);

        let mut deepest = 1;
        for pos in 1..analyze.clause.len() {
            let level = graph.level(analyze.clause[pos].var());
            if level > backjump {
                backjump = level;
                deepest = pos;
            }
        }
        analyze.clause.swap(1, deepest);
    }

    ctx.part_mut(VsidsP).decay();

    backjump
}

/// Merge one literal into the clause under construction.
///
/// Bumps the literal's variable. Current-level literals only raise the pending count, all
/// others join the clause. Level 0 literals are false outright and duplicates resolve away, so
/// both are skipped.
fn note_literal(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut VsidsP,
        ImplGraphP,
        TrailP
    ),
    lit: Lit,
) {
    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let level = ctx.part(ImplGraphP).level(lit.var());

    if level == 0 || analyze.seen[lit.index()] {
        return;
    }

    ctx.part_mut(VsidsP).bump(lit.var());
    analyze.seen[lit.index()] = true;

    if level == ctx.part(TrailP).current_level() {
        analyze.pending += 1;
    } else {
        analyze.clause.push(lit);
        analyze.seen_vars.push(lit.var());
    }
}

/// Approximate set of decision levels, hashed into one bit each.
#[derive(Default)]
struct LevelSet {
    bits: u64,
}

impl LevelSet {
    fn insert(&mut self, level: usize) {
        self.bits |= 1 << (level & 63);
    }

    /// May report levels that were never inserted, never the other way around.
    fn contains(&self, level: usize) -> bool {
        self.bits & (1 << (level & 63)) != 0
    }
}

/// Drop clause literals that are implied by the rest of the clause.
///
/// A literal is redundant when walking the implication graph backwards from it stays within
/// the variables already known to be implied, see [`literal_is_redundant`]. Redundant literals
/// keep their `seen` flag, so later searches stop at them early; that is also why the flag
/// cleanup in [`analyze_conflict`] runs after this.
fn minimize_clause(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        ClauseAllocP,
        ImplGraphP,
        TrailP,
    ),
) {
    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);
    split_borrow!(alloc_ctx = &(ClauseAllocP) ctx);
    let alloc = alloc_ctx.part(ClauseAllocP);
    let graph = ctx.part(ImplGraphP);

    let mut clause_levels = LevelSet::default();
    for &lit in analyze.clause.iter() {
        clause_levels.insert(graph.level(lit.var()));
    }

    let AnalyzeConflict {
        clause,
        seen,
        seen_vars,
        stack,
        ..
    } = analyze;

    let mut scan = VecMutScan::new(clause);

    // The asserting literal always stays.
    scan.next();

    while let Some(lit) = scan.next() {
        let reason = graph.reason(lit.var());
        if reason.is_decision() || reason.is_unit() {
            continue;
        }

        if literal_is_redundant(seen, seen_vars, stack, graph, alloc, &clause_levels, *lit) {
            lit.remove();
        }
    }
}

/// Whether a clause literal is implied by the other literals of the clause.
///
/// Depth-first search through the reasons of the literal's variable. The search only passes
/// variables whose `seen` flag is set, i.e. clause members or variables already shown to be
/// implied by them. Finding a decision, or any variable of a level with no literal in the
/// clause, proves the literal is needed; the flags set underway are rolled back in that case
/// and kept otherwise, pruning the searches for the remaining literals.
fn literal_is_redundant(
    seen: &mut Vec<bool>,
    seen_vars: &mut Vec<Var>,
    stack: &mut Vec<Lit>,
    graph: &ImplGraph,
    alloc: &ClauseAlloc,
    clause_levels: &LevelSet,
    lit: Lit,
) -> bool {
    stack.clear();
    stack.push(!lit);

    let rollback_from = seen_vars.len();

    while let Some(current) = stack.pop() {
        for &reason_lit in graph.reason(current.var()).lits(alloc) {
            let level = graph.level(reason_lit.var());

            if seen[reason_lit.index()] || level == 0 {
                continue;
            }

            if graph.reason(reason_lit.var()).is_decision() || !clause_levels.contains(level) {
                for var in seen_vars.drain(rollback_from..) {
                    seen[var.index()] = false;
                }
                return false;
            }

            seen[reason_lit.index()] = true;
            seen_vars.push(reason_lit.var());
            stack.push(!reason_lit);
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use norsat_formula::{lit, lits};

    use crate::clause::{db, ClauseHeader};
    use crate::context::set_var_count;
    use crate::prop::enqueue_assignment;

    #[test]
    fn first_uip_with_minimization() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 6);

        let c1 = db::add_clause(ctx.borrow(), ClauseHeader::new(), &lits![3, -1, -2]);
        let c2 = db::add_clause(ctx.borrow(), ClauseHeader::new(), &lits![4, -3, -1]);
        let c3 = db::add_clause(ctx.borrow(), ClauseHeader::new(), &lits![-4, -3, -2]);

        ctx.part_mut(TrailP).new_decision_level();
        enqueue_assignment(ctx.borrow(), lit![1], Reason::Decision);

        ctx.part_mut(TrailP).new_decision_level();
        enqueue_assignment(ctx.borrow(), lit![2], Reason::Decision);
        enqueue_assignment(ctx.borrow(), lit![3], Reason::Long(c1));
        enqueue_assignment(ctx.borrow(), lit![4], Reason::Long(c2));

        // All literals of c3 are false now.
        let backjump = analyze_conflict(ctx.borrow(), Conflict::Long(c3));

        assert_eq!(backjump, 1);
        assert_eq!(ctx.part(AnalyzeConflictP).clause(), &lits![-2, -1]);
        assert_eq!(ctx.part(AnalyzeConflictP).involved(), &[c3, c2, c1]);
    }

    #[test]
    fn conflict_without_decisions_learns_the_empty_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        let cref = db::add_clause(ctx.borrow(), ClauseHeader::new(), &lits![1, 2, 3]);

        enqueue_assignment(ctx.borrow(), lit![-1], Reason::Unit);
        enqueue_assignment(ctx.borrow(), lit![-2], Reason::Unit);
        enqueue_assignment(ctx.borrow(), lit![-3], Reason::Unit);

        let backjump = analyze_conflict(ctx.borrow(), Conflict::Long(cref));

        assert_eq!(backjump, 0);
        assert!(ctx.part(AnalyzeConflictP).clause().is_empty());
    }
}
