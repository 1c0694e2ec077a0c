//! A CDCL based SAT solver.
//!
//! The main entry point is the [`Solver`](solver::Solver) struct, which implements conflict
//! driven clause learning with two watched literals, first-UIP learning, VSIDS branching, phase
//! saving, Luby or Glucose style restarts and LBD based clause database reduction. For formulas
//! where every clause has exactly two literals there is also the linear-time
//! [`solve_2sat`](twosat::solve_2sat) entry point.
pub mod config;
pub mod solver;
pub mod stats;
pub mod twosat;

mod analyze_conflict;
mod binary;
mod cdcl;
mod clause;
mod context;
mod decision;
mod glue;
mod load;
mod prop;
mod rng;
mod schedule;
mod scratch;
mod state;


pub use norsat_formula::{CnfFormula, Lit, Var};

pub use config::{ConfigError, RestartStrategy, SolverConfig, SolverConfigUpdate};
pub use solver::{SolveResult, Solver};
pub use stats::SolverStats;
