//! Scheduling of restarts and clause database reductions.
use std::collections::VecDeque;

use log::info;

use partial_ref::{partial, PartialRef};

use crate::cdcl::conflict_step;
use crate::clause::reduce::reduce_learned;
use crate::clause::Tier;
use crate::config::{RestartStrategy, SolverConfig};
use crate::context::{
    AnalyzeConflictP, AssignmentP, BinaryClausesP, ClauseActivityP, ClauseAllocP, ClauseDbP,
    Context, ImplGraphP, RngP, SatStateP, ScheduleP, ScratchP, SolverConfigP, StatsP, TrailP,
    VsidsP, WatchlistsP,
};
use crate::prop::restart;
use crate::state::SatState;

mod glucose;
mod luby;

use glucose::GlucoseRestart;
use luby::luby;

/// Number of recent conflicts considered when deciding whether to postpone a restart.
const POSTPONING_WINDOW: usize = 50;

/// Restart and reduction scheduling state.
#[derive(Default)]
pub struct Schedule {
    /// Conflict count at which the next Luby restart is due.
    next_luby_restart: Option<u64>,
    /// Position in the Luby sequence of the next restart.
    luby_index: u64,
    glucose: GlucoseRestart,
    /// Trail sizes at the most recent conflicts.
    trail_sizes: VecDeque<u32>,
    /// Sum over `trail_sizes`.
    trail_size_sum: u64,
}

impl Schedule {
    /// Record the learned clause LBD and the trail size of a conflict.
    pub fn note_conflict(&mut self, config: &SolverConfig, glue: usize, trail_size: usize) {
        if config.restart_strategy == RestartStrategy::Glucose {
            self.glucose.note_lbd(glue, config.glucose_lbd_window);
        }

        if config.restart_postponing {
            self.trail_sizes.push_back(trail_size as u32);
            self.trail_size_sum += trail_size as u64;
            while self.trail_sizes.len() > POSTPONING_WINDOW {
                self.trail_size_sum -= self.trail_sizes.pop_front().unwrap() as u64;
            }
        }
    }

    /// Whether the configured restart strategy asks for a restart.
    fn restart_due(&mut self, config: &SolverConfig, conflicts: u64) -> bool {
        match config.restart_strategy {
            RestartStrategy::Luby => {
                if self.next_luby_restart.is_none() {
                    self.next_luby_restart =
                        Some(conflicts + config.restart_base * luby(self.luby_index));
                }
                conflicts >= self.next_luby_restart.unwrap()
            }
            RestartStrategy::Glucose => self
                .glucose
                .should_restart(config.glucose_k, config.glucose_lbd_window),
        }
    }

    /// Whether a due restart is cancelled because the trail keeps growing.
    ///
    /// A trail that is much larger than at recent conflicts means the search is closing in on
    /// a total assignment, which a restart would throw away.
    fn restart_postponed(&self, config: &SolverConfig, trail_size: usize) -> bool {
        if !config.restart_postponing || self.trail_sizes.len() < POSTPONING_WINDOW {
            return false;
        }

        let recent_avg = self.trail_size_sum as f64 / self.trail_sizes.len() as f64;

        trail_size as f64 > recent_avg * config.postponing_threshold as f64
    }

    /// A restart was performed.
    fn note_restart(&mut self, config: &SolverConfig, conflicts: u64) {
        match config.restart_strategy {
            RestartStrategy::Luby => {
                self.luby_index += 1;
                self.next_luby_restart =
                    Some(conflicts + config.restart_base * luby(self.luby_index));
            }
            RestartStrategy::Glucose => {
                self.glucose.clear_window();
            }
        }
    }
}

/// Perform one step of the schedule.
///
/// Checks restart and reduction triggers, then performs one conflict step. Returns `false` when
/// the satisfiability status is already decided.
pub fn schedule_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut RngP,
        mut SatStateP,
        mut ScheduleP,
        mut ScratchP,
        mut StatsP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) -> bool {
    if *ctx.part(SatStateP) != SatState::Unknown {
        return false;
    }

    let conflicts = ctx.part(StatsP).conflicts;

    if conflicts > 0 && conflicts % 5000 == 0 {
        let db = ctx.part(ClauseDbP);
        info!(
            "confl: {}k rest: {} red: {} bin: {} irred: {} core: {} local: {}",
            conflicts / 1000,
            ctx.part(StatsP).restarts,
            ctx.part(StatsP).reductions,
            ctx.part(BinaryClausesP).count(),
            db.count_by_tier(Tier::Irred),
            db.count_by_tier(Tier::Core),
            db.count_by_tier(Tier::Local),
        );
    }

    {
        let (schedule, mut ctx) = ctx.split_part_mut(ScheduleP);

        let trail_size = ctx.part(TrailP).trail().len();

        let restart_now = {
            let config = ctx.part(SolverConfigP);
            schedule.restart_due(config, conflicts)
                && !schedule.restart_postponed(config, trail_size)
        };

        if restart_now {
            restart(ctx.borrow());
            schedule.note_restart(ctx.part(SolverConfigP), conflicts);
            ctx.part_mut(StatsP).restarts += 1;

            let limit = ctx.part(SolverConfigP).learned_clause_limit;
            if ctx.part(ClauseDbP).learned_count() > limit {
                reduce_learned(ctx.borrow());
            }
        }
    }

    conflict_step(ctx.borrow());

    true
}
