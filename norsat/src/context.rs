//! Central solver data structure.
//!
//! All solver state lives in the single [`Context`] struct. Functions that need several pieces
//! of it take a partial reference (via the `partial_ref` crate) naming exactly the parts they
//! read or mutate. That keeps the data dependencies explicit and lets disjoint parts be
//! borrowed simultaneously without threading individual references everywhere.
//!
//! When a new part is added, check whether the notification functions at the bottom of this
//! module need to handle it.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use crate::analyze_conflict::AnalyzeConflict;
use crate::binary::BinaryClauses;
use crate::clause::{ClauseActivity, ClauseAlloc, ClauseDb};
use crate::config::{SolverConfig, SolverConfigUpdate};
use crate::decision::vsids::Vsids;
use crate::prop::{Assignment, ImplGraph, Trail, Watchlists};
use crate::rng::SolverRng;
use crate::schedule::Schedule;
use crate::scratch::Scratch;
use crate::state::SatState;
use crate::stats::SolverStats;

/// Part declarations for the [`Context`] struct.
pub mod parts {
    use super::*;

    // Clause storage
    part!(pub BinaryClausesP: BinaryClauses);
    part!(pub ClauseAllocP: ClauseAlloc);
    part!(pub ClauseDbP: ClauseDb);

    // Search state
    part!(pub AssignmentP: Assignment);
    part!(pub ImplGraphP: ImplGraph);
    part!(pub TrailP: Trail);
    part!(pub WatchlistsP: Watchlists);

    // Heuristics and scheduling
    part!(pub AnalyzeConflictP: AnalyzeConflict);
    part!(pub ClauseActivityP: ClauseActivity);
    part!(pub RngP: SolverRng);
    part!(pub ScheduleP: Schedule);
    part!(pub VsidsP: Vsids);

    // Bookkeeping
    part!(pub SatStateP: SatState);
    part!(pub ScratchP: Scratch);
    part!(pub SolverConfigP: SolverConfig);
    part!(pub StatsP: SolverStats);
}

pub use parts::*;

/// Central solver data structure holding all solver state.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    // Clause storage
    #[part(BinaryClausesP)]
    pub binary_clauses: BinaryClauses,
    #[part(ClauseAllocP)]
    pub clause_alloc: ClauseAlloc,
    #[part(ClauseDbP)]
    pub clause_db: ClauseDb,

    // Search state
    #[part(AssignmentP)]
    pub assignment: Assignment,
    #[part(ImplGraphP)]
    pub impl_graph: ImplGraph,
    #[part(TrailP)]
    pub trail: Trail,
    #[part(WatchlistsP)]
    pub watchlists: Watchlists,

    // Heuristics and scheduling
    #[part(AnalyzeConflictP)]
    pub analyze_conflict: AnalyzeConflict,
    #[part(ClauseActivityP)]
    pub clause_activity: ClauseActivity,
    #[part(RngP)]
    pub rng: SolverRng,
    #[part(ScheduleP)]
    pub schedule: Schedule,
    #[part(VsidsP)]
    pub vsids: Vsids,

    // Bookkeeping
    #[part(SatStateP)]
    pub sat_state: SatState,
    #[part(ScratchP)]
    pub scratch: Scratch,
    #[part(SolverConfigP)]
    pub solver_config: SolverConfig,
    #[part(StatsP)]
    pub stats: SolverStats,
}

/// Resize all per-variable and per-literal structures for a new variable count.
pub fn set_var_count(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ImplGraphP,
        mut ScratchP,
        mut VsidsP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    ctx.part_mut(AnalyzeConflictP).set_var_count(count);
    ctx.part_mut(AssignmentP).set_var_count(count);
    ctx.part_mut(BinaryClausesP).set_var_count(count);
    ctx.part_mut(ImplGraphP).set_var_count(count);
    ctx.part_mut(ScratchP).set_var_count(count);
    ctx.part_mut(VsidsP).set_var_count(count);
    ctx.part_mut(WatchlistsP).set_var_count(count);
}

/// Grow the variable count to at least the given value.
///
/// Shrinking is not supported, a smaller count does nothing.
pub fn ensure_var_count(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ImplGraphP,
        mut ScratchP,
        mut VsidsP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    if count > ctx.part(AssignmentP).assignment().len() {
        set_var_count(ctx.borrow(), count)
    }
}

/// Push updated configuration values into the parts that cache them.
pub fn config_changed(
    mut ctx: partial!(Context, mut ClauseActivityP, mut RngP, mut VsidsP, SolverConfigP),
    _update: &SolverConfigUpdate,
) {
    let (config, mut ctx) = ctx.split_part(SolverConfigP);
    ctx.part_mut(VsidsP).set_decay(config.vsids_decay);
    ctx.part_mut(ClauseActivityP)
        .set_decay(config.clause_activity_decay);
    ctx.part_mut(RngP).reseed(config.random_seed);
}
