#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! CNF building blocks shared by the puzzle encoders.
//!
//! Propositional variables are strictly positive integers; a literal is a
//! nonzero `i32` whose sign carries the polarity. A clause is the disjunction
//! of its literals and a formula is the conjunction of its clauses.

use itertools::Itertools;
use smallvec::SmallVec;

/// A nonzero signed integer; positive asserts the variable, negative denies it.
pub type Literal = i32;

/// A strictly positive integer naming one propositional variable.
pub type Variable = usize;

/// One disjunction of literals. The widest clause any encoder emits holds nine
/// literals, so the inline capacity keeps clause storage off the heap.
pub type Clause = SmallVec<[Literal; 9]>;

/// A satisfying assignment as returned by a solver: one signed entry per
/// variable in `[1, num_vars]`, in variable order.
pub type Model = Vec<Literal>;

/// A CNF formula together with the size of its variable space.
///
/// `num_vars` is the analytic size of the encoding's variable range, not the
/// largest literal that happens to appear; the DIMACS header reports it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    pub num_vars: usize,
    pub clauses: Vec<Clause>,
}

impl Cnf {
    #[must_use]
    pub const fn new(num_vars: usize, clauses: Vec<Clause>) -> Self {
        Self { num_vars, clauses }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Checks a model against every clause. A clause is satisfied when the
    /// model asserts at least one of its literals; the model is indexed by
    /// variable, so `model[v - 1]` must be `±v`.
    #[must_use]
    pub fn is_satisfied_by(&self, model: &[Literal]) -> bool {
        self.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|&lit| model.get(lit.unsigned_abs() as usize - 1) == Some(&lit))
        })
    }
}

/// The disjunction of all variables in the group: at least one must hold.
#[must_use]
pub fn at_least_one(vars: &[Literal]) -> Clause {
    Clause::from_slice(vars)
}

/// One binary clause `(¬x ∨ ¬y)` per unordered pair: at most one may hold.
/// This is the quadratic pairwise encoding, `C(|vars|, 2)` clauses.
#[must_use]
pub fn at_most_one(vars: &[Literal]) -> Vec<Clause> {
    vars.iter()
        .tuple_combinations()
        .map(|(&x, &y)| Clause::from_slice(&[-x, -y]))
        .collect()
}

/// Exactly one variable of the group holds: the at-least-one clause followed
/// by the pairwise at-most-one clauses, `1 + C(|vars|, 2)` in total.
#[must_use]
pub fn exactly_one(vars: &[Literal]) -> Vec<Clause> {
    let mut clauses = vec![at_least_one(vars)];
    clauses.extend(at_most_one(vars));
    clauses
}
