//! Scratch buffers shared between solver passes.
use norsat_formula::Lit;

/// Reusable buffers for passes that need temporary storage.
///
/// Users leave `level_flags` all-false when they are done. The literal buffers carry no
/// invariant between uses.
#[derive(Default)]
pub struct Scratch {
    /// Clause literals being normalized while loading.
    pub clause: Vec<Lit>,
    /// Literals that survive normalization.
    pub kept: Vec<Lit>,
    /// One flag per decision level.
    pub level_flags: Vec<bool>,
}

impl Scratch {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        // There can be one decision level per variable, plus level 0.
        self.level_flags.resize(count + 1, false);
    }
}
