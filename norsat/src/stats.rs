//! Solver statistics.

/// Counters describing the work performed during solving.
///
/// Counters are cumulative over the lifetime of a solver instance and are never reset, not even
/// by restarts or repeated `solve` calls.
#[derive(Copy, Clone, Debug, Default)]
pub struct SolverStats {
    /// Number of decisions made.
    pub decisions: u64,
    /// Number of propagated assignments.
    pub propagations: u64,
    /// Number of conflicts found.
    pub conflicts: u64,
    /// Number of learned clauses, including unit and binary clauses.
    pub learned_clauses: u64,
    /// Number of learned clauses that were protected as glue clauses.
    pub glue_clauses: u64,
    /// Number of learned clauses deleted during reductions.
    pub deleted_clauses: u64,
    /// Number of restarts performed.
    pub restarts: u64,
    /// Number of clause database reductions performed.
    pub reductions: u64,
    /// Largest decision level reached.
    pub max_decision_level: usize,
}
