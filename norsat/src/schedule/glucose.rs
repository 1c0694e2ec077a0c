//! Adaptive restarts driven by LBD values.
//!
//! This follows the scheme of the Glucose solver: a sliding window tracks the LBD values of the
//! most recently learned clauses. When the average over that window exceeds the average over
//! all learned clauses by a configurable factor, the clauses being learned are unusually bad
//! and a restart is triggered.
use std::collections::VecDeque;

/// LBD bookkeeping for Glucose style restarts.
#[derive(Default)]
pub struct GlucoseRestart {
    /// LBD values of the most recently learned clauses.
    window: VecDeque<u32>,
    /// Sum over `window`.
    window_sum: u64,
    /// Sum of the LBD values of all learned clauses.
    total_sum: u64,
    /// Number of all learned clauses.
    total_count: u64,
}

impl GlucoseRestart {
    /// Record the LBD of a learned clause.
    pub fn note_lbd(&mut self, lbd: usize, window_size: usize) {
        self.total_sum += lbd as u64;
        self.total_count += 1;

        self.window.push_back(lbd as u32);
        self.window_sum += lbd as u64;
        while self.window.len() > window_size {
            self.window_sum -= self.window.pop_front().unwrap() as u64;
        }
    }

    /// Whether the short-term LBD average exceeds the long-term average by the factor `k`.
    ///
    /// Never triggers before the window is filled.
    pub fn should_restart(&self, k: f32, window_size: usize) -> bool {
        if self.window.len() < window_size || self.total_count == 0 {
            return false;
        }

        let short_term = self.window_sum as f64 / self.window.len() as f64;
        let long_term = self.total_sum as f64 / self.total_count as f64;

        short_term > long_term * k as f64
    }

    /// Forget the short-term window.
    ///
    /// Called when a restart is performed, so the next restart requires a full window of fresh
    /// samples.
    pub fn clear_window(&mut self) {
        self.window.clear();
        self.window_sum = 0;
    }
}
