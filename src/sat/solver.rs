//! The interface shared by solver implementations and the types they report.

use crate::sat::assignment::Valuation;
use crate::sat::cnf::Cnf;
use std::fmt::{self, Display, Formatter};

/// The state of a clause set at one point of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// No variable occurs with both polarities, so reading the literals off
    /// the clauses gives a model.
    Satisfiable,
    /// Some clause is empty.
    Unsatisfiable,
    /// Neither of the above yet.
    Uncertain,
}

/// The final answer of a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// A model was found.
    Satisfiable,
    /// No valuation satisfies every clause.
    Unsatisfiable,
}

impl Verdict {
    /// Whether a model was found.
    #[must_use]
    pub const fn is_sat(self) -> bool {
        matches!(self, Self::Satisfiable)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "SATISFIABLE"),
            Self::Unsatisfiable => write!(f, "UNSATISFIABLE"),
        }
    }
}

/// Counters collected during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolutionStats {
    /// Branches taken on a guessed literal.
    pub decisions: usize,
    /// Unit clauses propagated.
    pub propagations: usize,
    /// Pure literals eliminated.
    pub pure_literals: usize,
    /// Guesses that had to be undone.
    pub backtracks: usize,
}

/// A decision procedure over a [`Cnf`].
pub trait Solver {
    /// A solver for `cnf`, nothing assigned yet.
    fn new(cnf: Cnf) -> Self;

    /// Runs the search from scratch.
    fn solve(&mut self) -> Verdict;

    /// The valuation of the last successful search path. Variables the search
    /// never had to fix stay unassigned.
    fn valuation(&self) -> &Valuation;

    /// Counters of the last search.
    fn stats(&self) -> SolutionStats;
}
