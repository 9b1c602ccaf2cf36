//! Defines the DPLL (Davis-Putnam-Logemann-Loveland) SAT solver.
//!
//! The search works on the clause set itself rather than on an assignment
//! trail. Every step simplifies the clauses destructively:
//!
//! 1.  **Unit propagation:** the literal of the first unit clause is fixed, every
//!     clause containing it is dropped and its negation is removed from the rest.
//! 2.  **Pure literal elimination:** a literal whose negation occurs nowhere is
//!     fixed and every clause containing it is dropped.
//! 3.  **Decision:** the first literal of the first clause is guessed true on a
//!     copy of the clause set. If that copy turns out unsatisfiable, a second
//!     copy is searched with the literal guessed false.
//!
//! The status of the clause set is checked before every step: an empty clause
//! means the current path is unsatisfiable, and a clause set in which no variable
//! occurs with both polarities is satisfied by its own literals.

use crate::sat::assignment::Valuation;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::solver::{SolutionStats, Solver, Status, Verdict};
use bit_vec::BitVec;
use log::debug;

/// Solver context, created once per formula.
#[derive(Debug, Clone)]
pub struct Dpll {
    /// The formula as handed to [`Solver::new`]. Searching works on copies.
    pub cnf: Cnf,
    /// Truth values fixed along the current search path.
    pub valuation: Valuation,
    stats: SolutionStats,
}

impl Solver for Dpll {
    fn new(cnf: Cnf) -> Self {
        let valuation = Valuation::new(cnf.num_vars);
        Self {
            cnf,
            valuation,
            stats: SolutionStats::default(),
        }
    }

    fn solve(&mut self) -> Verdict {
        self.valuation = Valuation::new(self.cnf.num_vars);
        self.stats = SolutionStats::default();

        let verdict = self.search(self.cnf.clone());
        debug!("{verdict} after {} decisions", self.stats.decisions);
        verdict
    }

    fn valuation(&self) -> &Valuation {
        &self.valuation
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }
}

/// Which polarities of each variable occur in a clause set.
struct Occurrences {
    positive: BitVec,
    negative: BitVec,
}

impl Occurrences {
    fn of(cnf: &Cnf) -> Self {
        let n = cnf.literals().map(Literal::index).max().unwrap_or(0) + 1;
        let mut positive = BitVec::from_elem(n, false);
        let mut negative = BitVec::from_elem(n, false);

        for lit in cnf.literals() {
            if lit.polarity() {
                positive.set(lit.index(), true);
            } else {
                negative.set(lit.index(), true);
            }
        }
        Self { positive, negative }
    }

    fn is_mixed(&self, i: usize) -> bool {
        self.positive.get(i).unwrap_or(false) && self.negative.get(i).unwrap_or(false)
    }

    fn any_mixed(&self) -> bool {
        (0..self.positive.len()).any(|i| self.is_mixed(i))
    }

    /// The pure literal with the lowest variable id.
    fn first_pure(&self) -> Option<Literal> {
        self.positive
            .iter()
            .zip(self.negative.iter())
            .enumerate()
            .find_map(|(i, (pos, neg))| {
                let var = u32::try_from(i).ok()?;
                match (pos, neg) {
                    (true, false) => Some(Literal::new(var, true)),
                    (false, true) => Some(Literal::new(var, false)),
                    _ => None,
                }
            })
    }
}

impl Dpll {
    /// Classifies `cnf`. On [`Status::Satisfiable`] the literals left in the
    /// clauses are written into the valuation.
    pub fn check_status(&mut self, cnf: &Cnf) -> Status {
        if cnf.iter().any(Clause::is_empty) {
            return Status::Unsatisfiable;
        }

        if Occurrences::of(cnf).any_mixed() {
            return Status::Uncertain;
        }

        for lit in cnf.literals() {
            self.valuation.assign(lit);
        }
        Status::Satisfiable
    }

    /// Propagates the first unit clause. Returns `false` if there is none.
    pub fn unit_propagate(&mut self, cnf: &mut Cnf) -> bool {
        let Some(lit) = cnf.iter().find(|c| c.is_unit()).map(|c| c[0]) else {
            return false;
        };

        debug!("unit literal {lit}");
        self.stats.propagations += 1;
        self.valuation.assign(lit);

        cnf.clauses.retain(|c| !c.contains(lit));
        for clause in &mut cnf.clauses {
            clause.remove_literal(-lit);
        }
        true
    }

    /// Fixes the pure literal with the lowest variable id and drops every clause
    /// containing it. Returns `false` if no literal is pure.
    pub fn eliminate_pure_literal(&mut self, cnf: &mut Cnf) -> bool {
        let Some(lit) = Occurrences::of(cnf).first_pure() else {
            return false;
        };

        debug!("pure literal {lit}");
        self.stats.pure_literals += 1;
        self.valuation.assign(lit);

        cnf.clauses.retain(|c| !c.contains(lit));
        true
    }

    /// A copy of `cnf` with the unit clause `lit` in front. `cnf` is untouched.
    #[must_use]
    pub fn branch(cnf: &Cnf, lit: Literal) -> Cnf {
        let mut clauses = Vec::with_capacity(cnf.len() + 1);
        clauses.push(Clause::unit(lit));
        clauses.extend(cnf.iter().cloned());
        Cnf::with_num_vars(clauses, cnf.num_vars)
    }

    fn search(&mut self, mut cnf: Cnf) -> Verdict {
        loop {
            match self.check_status(&cnf) {
                Status::Satisfiable => return Verdict::Satisfiable,
                Status::Unsatisfiable => return Verdict::Unsatisfiable,
                Status::Uncertain => {}
            }
            if !self.unit_propagate(&mut cnf) {
                break;
            }
        }

        loop {
            match self.check_status(&cnf) {
                Status::Satisfiable => return Verdict::Satisfiable,
                Status::Unsatisfiable => return Verdict::Unsatisfiable,
                Status::Uncertain => {}
            }
            if !self.eliminate_pure_literal(&mut cnf) {
                break;
            }
        }

        let lit = match cnf.clauses.first().map(|c| c.literals.first().copied()) {
            None => return Verdict::Satisfiable,
            Some(None) => return Verdict::Unsatisfiable,
            Some(Some(lit)) => lit,
        };

        debug!("guessing {lit}");
        self.stats.decisions += 1;
        let snapshot = self.valuation.clone();

        if self.search(Self::branch(&cnf, lit)).is_sat() {
            return Verdict::Satisfiable;
        }

        debug!("backtracking, guessing {}", -lit);
        self.stats.backtracks += 1;
        self.valuation.clone_from(&snapshot);

        let verdict = self.search(Self::branch(&cnf, -lit));
        if !verdict.is_sat() {
            self.valuation = snapshot;
        }
        verdict
    }
}
