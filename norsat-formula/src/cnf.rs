//! CNF formulas.
use std::cmp::max;
use std::fmt;
use std::iter::Extend;

use crate::lit::Lit;

/// A formula in conjunctive normal form.
///
/// All clauses share one literal buffer. A second table stores where each clause ends, so
/// clause `i` covers the literals between the end of clause `i - 1` and `clause_ends[i]`. This
/// needs one `usize` per clause instead of a `Vec` per clause.
#[derive(Default, Eq)]
pub struct CnfFormula {
    var_count: usize,
    literals: Vec<Lit>,
    clause_ends: Vec<usize>,
}

impl CnfFormula {
    /// Create an empty CNF formula.
    pub fn new() -> CnfFormula {
        CnfFormula::default()
    }

    /// Number of variables, counting unused indices below the largest used one.
    ///
    /// A vector of this length can be indexed with every variable present in the formula.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Grow the number of variables; a count at or below the current one does nothing.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Number of clauses in the formula.
    pub fn len(&self) -> usize {
        self.clause_ends.len()
    }

    /// Whether the formula has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clause_ends.is_empty()
    }

    /// Append a clause to the formula.
    ///
    /// Grows the variable count to cover every added literal.
    pub fn add_clause<L>(&mut self, literals: impl IntoIterator<Item = L>)
    where
        Vec<Lit>: Extend<L>,
    {
        let begin = self.literals.len();
        self.literals.extend(literals);

        for &lit in &self.literals[begin..] {
            self.var_count = max(self.var_count, lit.index() + 1);
        }

        self.clause_ends.push(self.literals.len());
    }

    /// The literals of the clause with the given index.
    fn clause(&self, index: usize) -> &[Lit] {
        let end = self.clause_ends[index];
        let begin = match index {
            0 => 0,
            _ => self.clause_ends[index - 1],
        };
        &self.literals[begin..end]
    }

    /// Iterator over all clauses.
    pub fn iter(&self) -> impl Iterator<Item = &[Lit]> {
        (0..self.len()).map(move |index| self.clause(index))
    }

    /// Whether an assignment, given as a set of true literals, satisfies every clause.
    ///
    /// A clause is satisfied when at least one of its literals is in the set. This is a linear
    /// scan intended for checking models in tests and small scripts, not for solving.
    pub fn eval(&self, true_lits: &[Lit]) -> bool {
        self.iter()
            .all(|clause| clause.iter().any(|lit| true_lits.contains(lit)))
    }
}

/// Convert any iterable of [`Lit`] iterables into a CnfFormula.
impl<Clauses, Clause, L> From<Clauses> for CnfFormula
where
    Clauses: IntoIterator<Item = Clause>,
    Clause: IntoIterator<Item = L>,
    Vec<Lit>: Extend<L>,
{
    fn from(clauses: Clauses) -> CnfFormula {
        let mut formula = CnfFormula::new();
        for clause in clauses {
            formula.add_clause(clause);
        }
        formula
    }
}

impl fmt::Debug for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "vars: {} ", self.var_count)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for CnfFormula {
    fn eq(&self, other: &CnfFormula) -> bool {
        self.var_count == other.var_count
            && self.len() == other.len()
            && self.iter().eq(other.iter())
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    /// Strategy for a single clause over the variables `0..vars`.
    fn clause(vars: usize, len: SizeRange) -> impl Strategy<Value = Vec<Lit>> {
        collection::vec((0..vars, any::<bool>()), len).prop_map(|lits| {
            lits.into_iter()
                .map(|(index, polarity)| Lit::from_index(index, polarity))
                .collect()
        })
    }

    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        // Independent flat map, otherwise shrinking gets too expensive.
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(clause(vars, clause_len.clone()), clauses.clone())
        })
    }

    pub fn cnf_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = CnfFormula> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        vars.prop_ind_flat_map(move |vars| {
            collection::vec(clause(vars, clause_len.clone()), clauses.clone())
                .prop_map(move |clause_vecs| {
                    let mut formula = CnfFormula::from(clause_vecs);
                    // Keep variables that no clause mentions.
                    formula.set_var_count(vars);
                    formula
                })
                .no_shrink() // Shrinking too expensive without this
        })
    }
}
