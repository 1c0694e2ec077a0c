//! Basic formula data types used by the Norsat SAT solver.
//!
//! The macros below build literals and formulas from DIMACS style integers. They are for
//! tests only and hidden behind the `internal-testing` feature.

/// A literal from a DIMACS integer, e.g. `lit![-3]`.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lit {
    ($x:expr) => {
        $crate::Lit::from_dimacs($x)
    };
}

/// A variable from a DIMACS integer, e.g. `var![3]`.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! var {
    ($x:expr) => {
        $crate::Var::from_dimacs($x)
    };
}

/// An array of literals from DIMACS integers, e.g. `lits![1, -2]`.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lits {
    ( $( $x:expr ),* $(,)? ) => {
        [ $( $crate::Lit::from_dimacs($x) ),* ]
    };
}

/// An array of clause slices from `;` separated DIMACS integer lists.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! cnf {
    ( $( $( $x:expr ),* );* ; ) => {
        [ $( {
            let clause: Vec<$crate::Lit> = $crate::lits![ $( $x ),* ].to_vec();
            clause
        } ),* ]
    };
}

/// A [`CnfFormula`] from `;` separated DIMACS integer lists.
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! cnf_formula {
    ( $( $t:tt )* ) => {
        $crate::CnfFormula::from($crate::cnf![ $($t)* ].iter().cloned())
    };
}

pub mod cnf;
pub mod lit;

pub use cnf::CnfFormula;
pub use lit::{Lit, Var};
