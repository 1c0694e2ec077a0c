//! Watchlists to detect clauses that became unit.
//!
//! Each long clause is watched by two of its literals, kept in positions 0 and 1 of the clause.
//! As long as the clause is not unit, the two watched literals are non-false. A watch is stored
//! in the list of the _negation_ of the watched literal, so that assigning a literal true leads
//! straight to the clauses whose watched literal just became false. Scanning those clauses
//! either finds a replacement watch, detects a new unit clause, or detects a conflict.
//!
//! Backtracking cannot invalidate the watch invariant, so watchlists stay untouched during
//! backtracking.
//!
//! Each watch additionally stores a blocking literal of the clause. When the blocking literal
//! is already true the clause is satisfied and does not have to be dereferenced at all, see
//! ["MINISAT 2.1 and MINISAT++ 1.0 — SAT Race 2008 Editions"][minisat-2.1].
//!
//! The watchlists can be disabled wholesale. This is used when clause references are
//! invalidated by a garbage collection. Re-enabling rebuilds every watch from the clause
//! database, see [`enable_watchlists`](super::enable_watchlists).
//!
//! [minisat-2.1]: https://www.cril.univ-artois.fr/SAT09/solvers/booklet.pdf

use norsat_formula::Lit;

use crate::clause::ClauseRef;

/// A watch on a long clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause which has the referring lit in position 0 or 1.
    pub cref: ClauseRef,
    /// A lit of the clause, different from the referring lit.
    pub blocking: Lit,
}

/// Watchlists to detect clauses that became unit.
#[derive(Default)]
pub struct Watchlists {
    /// Watches of clauses whose watched literal is the negation of the indexing literal.
    watches: Vec<Vec<Watch>>,
    /// Whether the watches are up to date with the clause database.
    enabled: bool,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Whether the watchlists are up to date with the clause database.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Drop all watches and mark the watchlists as out of date.
    pub fn disable(&mut self) {
        for watch_list in self.watches.iter_mut() {
            watch_list.clear();
        }
        self.enabled = false;
    }

    /// Mark the watchlists as up to date.
    ///
    /// The caller is responsible for registering every clause of the database afterwards.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Start watching a clause.
    ///
    /// `lits` have to be the first two literals of the given clause. While the watchlists are
    /// disabled this is a no-op, the clause is picked up when they are rebuilt.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        if !self.enabled {
            return;
        }
        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.watches[(!lits[i]).code()].push(watch);
        }
    }

    /// Stop watching a clause.
    ///
    /// `lits` have to be the two watched literals, i.e. the first two literals of the clause.
    /// Only used while deleting clauses during a reduction.
    pub fn detach_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        if !self.enabled {
            return;
        }
        for &lit in lits.iter() {
            self.watches[(!lit).code()].retain(|watch| watch.cref != cref);
        }
    }

    /// Return watches for a given literal.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Watches for a given literal.
    pub fn watched_by(&self, lit: Lit) -> &[Watch] {
        &self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[lit.code()].push(watch)
    }
}
