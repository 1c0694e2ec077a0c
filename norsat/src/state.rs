//! Satisfiability status.

/// Current satisfiability status of the loaded formula.
///
/// Stored directly as a part of the context; every search step checks it before doing work and
/// the terminal states are only left when the user adds further clauses.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    /// Not decided yet, the search can make progress.
    Unknown,
    /// The current assignment satisfies every clause.
    Sat,
    /// The formula has no satisfying assignment.
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}
