//! Solver configuration.
use serde::Deserialize;
use thiserror::Error;

/// Restart scheduling strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartStrategy {
    /// Restart after a number of conflicts following the Luby sequence.
    Luby,
    /// Restart adaptively when recently learned clauses have unusually high LBD values.
    Glucose,
}

/// Configurable parameters used during solving.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic.
    ///
    /// Must be within (0.5, 1.0). Default: 0.95
    pub vsids_decay: f32,

    /// Multiplicative decay for clause activities.
    ///
    /// Must be within (1/16, 1.0). Default: 0.999
    pub clause_activity_decay: f32,

    /// Restart strategy. Default: glucose
    pub restart_strategy: RestartStrategy,

    /// Scaling factor for Luby sequence based restarts (number of conflicts). Default: 100
    pub restart_base: u64,

    /// Number of recent LBD values making up the short-term average for Glucose style
    /// restarts. Default: 50
    pub glucose_lbd_window: usize,

    /// Trigger a Glucose style restart when the short-term LBD average exceeds the long-term
    /// average times this factor.
    ///
    /// Must be within (0, 1). Default: 0.8
    pub glucose_k: f32,

    /// Cancel a pending restart while the trail keeps growing. Default: true
    pub restart_postponing: bool,

    /// Cancel a restart when the trail is larger than the recent average times this factor.
    ///
    /// Must be at least 1. Default: 1.4
    pub postponing_threshold: f32,

    /// Branch on the polarity a variable was last assigned. Default: true
    pub phase_saving: bool,

    /// Polarity used for variables that were never assigned. Default: true
    pub initial_phase: bool,

    /// Probability of picking a random polarity for a decision.
    ///
    /// Must be within [0, 1]. A random polarity overrides the saved phase. Default: 0
    pub random_phase_freq: f32,

    /// Seed for the solver's random number generator. Default: 42
    pub random_seed: u64,

    /// Number of learned clauses that triggers a reduction of the clause database.
    ///
    /// Must be positive. Default: 10000
    pub learned_clause_limit: usize,

    /// Learned clauses with an LBD at or below this value are never deleted. Default: 2
    pub glue_threshold: usize,

    /// Give up and report an unknown result after this many conflicts. Default: unlimited
    pub conflict_budget: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            vsids_decay: 0.95,
            clause_activity_decay: 0.999,
            restart_strategy: RestartStrategy::Glucose,
            restart_base: 100,
            glucose_lbd_window: 50,
            glucose_k: 0.8,
            restart_postponing: true,
            postponing_threshold: 1.4,
            phase_saving: true,
            initial_phase: true,
            random_phase_freq: 0.0,
            random_seed: 42,
            learned_clause_limit: 10_000,
            glue_threshold: 2,
            conflict_budget: None,
        }
    }
}

impl SolverConfig {
    /// Description of all configuration options.
    pub fn help() -> &'static str {
        concat!(
            "vsids_decay            float in (0.5, 1.0), decay of variable activities [0.95]\n",
            "clause_activity_decay  float in (1/16, 1.0), decay of clause activities [0.999]\n",
            "restart_strategy       'luby' or 'glucose' [glucose]\n",
            "restart_base           positive integer, Luby restart scale in conflicts [100]\n",
            "glucose_lbd_window     positive integer, short-term LBD window size [50]\n",
            "glucose_k              float in (0, 1), restart threshold multiplier [0.8]\n",
            "restart_postponing     bool, cancel restarts while the trail grows [true]\n",
            "postponing_threshold   float >= 1, trail growth factor for postponing [1.4]\n",
            "phase_saving           bool, reuse the last assigned polarity [true]\n",
            "initial_phase          bool, polarity for never assigned variables [true]\n",
            "random_phase_freq      float in [0, 1], probability of a random polarity [0]\n",
            "random_seed            integer, seed of the solver's RNG [42]\n",
            "learned_clause_limit   positive integer, learned clauses kept before reduction [10000]\n",
            "glue_threshold         positive integer, LBD at or below which clauses are kept [2]\n",
            "conflict_budget        integer, conflicts before giving up [unlimited]\n",
        )
    }
}

/// Error while applying a configuration update.
#[derive(Debug, Error)]
#[error("config option {option}: {message}")]
pub struct ConfigError {
    pub option: &'static str,
    pub message: String,
}

fn config_error(option: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError {
        option,
        message: message.into(),
    }
}

/// A partial solver configuration.
///
/// Every field is optional. This can be deserialized from TOML, so configuration files and
/// `key = value` command line options share one code path. All present values are range checked
/// before any of them is applied.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfigUpdate {
    pub vsids_decay: Option<f32>,
    pub clause_activity_decay: Option<f32>,
    pub restart_strategy: Option<RestartStrategy>,
    pub restart_base: Option<u64>,
    pub glucose_lbd_window: Option<usize>,
    pub glucose_k: Option<f32>,
    pub restart_postponing: Option<bool>,
    pub postponing_threshold: Option<f32>,
    pub phase_saving: Option<bool>,
    pub initial_phase: Option<bool>,
    pub random_phase_freq: Option<f32>,
    pub random_seed: Option<u64>,
    pub learned_clause_limit: Option<usize>,
    pub glue_threshold: Option<usize>,
    pub conflict_budget: Option<u64>,
}

impl SolverConfigUpdate {
    /// Create an empty configuration update.
    pub fn new() -> SolverConfigUpdate {
        SolverConfigUpdate::default()
    }

    /// Merge another update into this one, with the other update taking precedence.
    pub fn merge(&mut self, other: SolverConfigUpdate) {
        macro_rules! merge_fields {
            ( $( $field:ident ),* ) => {
                $( if other.$field.is_some() { self.$field = other.$field; } )*
            };
        }
        merge_fields!(
            vsids_decay,
            clause_activity_decay,
            restart_strategy,
            restart_base,
            glucose_lbd_window,
            glucose_k,
            restart_postponing,
            postponing_threshold,
            phase_saving,
            initial_phase,
            random_phase_freq,
            random_seed,
            learned_clause_limit,
            glue_threshold,
            conflict_budget
        );
    }

    /// Check all present values against their allowed ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(value) = self.vsids_decay {
            if !(value > 0.5 && value < 1.0) {
                return Err(config_error("vsids_decay", "must be within (0.5, 1.0)"));
            }
        }
        if let Some(value) = self.clause_activity_decay {
            if !(value > 1.0 / 16.0 && value < 1.0) {
                return Err(config_error(
                    "clause_activity_decay",
                    "must be within (1/16, 1.0)",
                ));
            }
        }
        if let Some(value) = self.restart_base {
            if value == 0 {
                return Err(config_error("restart_base", "must be positive"));
            }
        }
        if let Some(value) = self.glucose_lbd_window {
            if value == 0 {
                return Err(config_error("glucose_lbd_window", "must be positive"));
            }
        }
        if let Some(value) = self.glucose_k {
            if !(value > 0.0 && value < 1.0) {
                return Err(config_error("glucose_k", "must be within (0, 1)"));
            }
        }
        if let Some(value) = self.postponing_threshold {
            if !(value >= 1.0) {
                return Err(config_error("postponing_threshold", "must be at least 1"));
            }
        }
        if let Some(value) = self.random_phase_freq {
            if !(0.0..=1.0).contains(&value) {
                return Err(config_error("random_phase_freq", "must be within [0, 1]"));
            }
        }
        if let Some(value) = self.learned_clause_limit {
            if value == 0 {
                return Err(config_error("learned_clause_limit", "must be positive"));
            }
        }
        if let Some(value) = self.glue_threshold {
            if value == 0 {
                return Err(config_error("glue_threshold", "must be positive"));
            }
        }
        Ok(())
    }

    /// Apply this update to a configuration.
    ///
    /// When any present value is out of range, an error is returned and the configuration is
    /// left unchanged.
    pub fn apply(&self, config: &mut SolverConfig) -> Result<(), ConfigError> {
        self.validate()?;

        macro_rules! apply_fields {
            ( $( $field:ident ),* ) => {
                $( if let Some(value) = self.$field { config.$field = value; } )*
            };
        }
        apply_fields!(
            vsids_decay,
            clause_activity_decay,
            restart_strategy,
            restart_base,
            glucose_lbd_window,
            glucose_k,
            restart_postponing,
            postponing_threshold,
            phase_saving,
            initial_phase,
            random_phase_freq,
            random_seed,
            learned_clause_limit,
            glue_threshold
        );
        if let Some(value) = self.conflict_budget {
            config.conflict_budget = Some(value);
        }
        Ok(())
    }
}
