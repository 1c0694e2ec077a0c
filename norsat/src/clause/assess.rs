//! Clause assessment.
use crate::config::SolverConfig;

use super::{ClauseHeader, Tier};

/// Generate the header for a newly learned clause with the given glue level.
///
/// Clauses at or below the configured glue threshold go to the protected core tier, all other
/// learned clauses are local and may be deleted during reductions.
pub fn assess_learned_clause(config: &SolverConfig, glue: usize) -> ClauseHeader {
    let mut header = ClauseHeader::new();

    header.set_glue(glue);
    header.set_tier(if glue <= config.glue_threshold {
        Tier::Core
    } else {
        Tier::Local
    });

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glue_threshold_selects_tier() {
        let config = SolverConfig::default();

        assert_eq!(assess_learned_clause(&config, 1).tier(), Tier::Core);
        assert_eq!(assess_learned_clause(&config, 2).tier(), Tier::Core);
        assert_eq!(assess_learned_clause(&config, 3).tier(), Tier::Local);
        assert_eq!(assess_learned_clause(&config, 7).tier(), Tier::Local);
    }
}
