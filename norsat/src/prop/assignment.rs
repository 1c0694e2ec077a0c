//! Partial assignment and backtracking.
use partial_ref::{partial, PartialRef};

use norsat_formula::{lit::LitIdx, Lit, Var};

use crate::context::{AssignmentP, Context, ImplGraphP, StatsP, TrailP, VsidsP};
use crate::decision::make_available;

use super::Reason;

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    /// Truth value per variable, `None` while unassigned.
    values: Vec<Option<bool>>,
    /// Truth value each variable had when it was last unassigned.
    saved_phase: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.values.resize(count, None);
        self.saved_phase.resize(count, None);
    }

    /// Current partial assignment as slice.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.values
    }

    /// Value assigned to a variable.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.values[var.index()]
    }

    /// Polarity a variable had when it was last unassigned.
    ///
    /// `None` if the variable was never unassigned.
    pub fn saved_phase(&self, var: Var) -> Option<bool> {
        self.saved_phase[var.index()]
    }

    /// Value assigned to a literal.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.values[lit.index()].map(|value| value ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.values[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.values[lit.index()] == Some(lit.is_negative())
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.values[lit.index()] = Some(lit.is_positive())
    }
}

/// History of all current assignments in the order they were made.
#[derive(Default)]
pub struct Trail {
    /// All literals assigned true, decisions and propagations alike.
    assigned: Vec<Lit>,
    /// Index of the first assignment whose consequences are unexplored.
    next_unpropagated: usize,
    /// Index into `assigned` where each decision level starts.
    level_starts: Vec<LitIdx>,
}

impl Trail {
    /// Take the next assignment out of the propagation queue.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        let next = self.assigned.get(self.next_unpropagated).copied();
        if next.is_some() {
            self.next_unpropagated += 1;
        }
        next
    }

    /// All current assignments in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.assigned
    }

    /// Open a new decision level.
    ///
    /// The decision itself is enqueued separately.
    pub fn new_decision_level(&mut self) {
        self.level_starts.push(self.assigned.len() as LitIdx)
    }

    /// Number of decisions currently on the trail.
    pub fn current_level(&self) -> usize {
        self.level_starts.len()
    }
}

/// Assign a literal true and put it on the trail.
///
/// The variable must be unassigned. No propagation happens here, the literal only joins the
/// queue.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut StatsP, mut TrailP),
    lit: Lit,
    reason: Reason,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == None);
    assignment.assign_lit(lit);

    if !reason.is_decision() {
        ctx.part_mut(StatsP).propagations += 1;
    }

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    trail.assigned.push(lit);

    let level = trail.level_starts.len();
    ctx.part_mut(ImplGraphP).record(lit.var(), reason, level);
}

/// Remove all assignments of decision levels above the given one.
///
/// Every removed variable has its polarity saved for phase saving and is requeued for
/// decisions. The propagation queue is rewound to the surviving trail.
pub fn backtrack(
    mut ctx: partial!(Context, mut AssignmentP, mut TrailP, mut VsidsP),
    level: usize,
) {
    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    if level == trail.current_level() {
        return;
    }

    let keep = trail.level_starts[level] as usize;
    trail.level_starts.truncate(level);
    trail.next_unpropagated = keep;

    for lit in trail.assigned.drain(keep..) {
        let value = &mut assignment.values[lit.index()];
        assignment.saved_phase[lit.index()] = *value;
        *value = None;

        make_available(ctx.borrow(), lit.var());
    }
}
