use crate::sat::assignment::Valuation;
use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use std::fmt::{self, Display, Formatter};

/// A conjunction of clauses over the variables `1..=num_vars`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Cnf {
    /// The conjuncts, in solver order.
    pub clauses: Vec<Clause>,
    /// Largest variable id the formula may mention.
    pub num_vars: usize,
}

impl Cnf {
    /// Builds a formula from DIMACS-style signed integers.
    #[must_use]
    pub fn new(clauses: Vec<Vec<i32>>) -> Self {
        clauses.into_iter().map(Clause::from).collect()
    }

    /// Wraps `clauses`, with `num_vars` taken from the largest variable id.
    #[must_use]
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        let num_vars = clauses
            .iter()
            .flat_map(Clause::iter)
            .map(|l| l.index())
            .max()
            .unwrap_or(0);
        Self { clauses, num_vars }
    }

    /// Like [`Cnf::from_clauses`], but never reports fewer than `num_vars`.
    #[must_use]
    pub fn with_num_vars(clauses: Vec<Clause>, num_vars: usize) -> Self {
        let mut cnf = Self::from_clauses(clauses);
        cnf.num_vars = cnf.num_vars.max(num_vars);
        cnf
    }

    /// Iterates the clauses in order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// No clauses, so trivially satisfiable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether `valuation` satisfies every clause.
    #[must_use]
    pub fn verify(&self, valuation: &Valuation) -> bool {
        self.iter().all(|c| c.is_satisfied_by(valuation))
    }

    /// Every literal occurring in the formula, in clause order.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.iter().flat_map(|c| c.iter().copied())
    }
}

impl FromIterator<Clause> for Cnf {
    fn from_iter<I: IntoIterator<Item = Clause>>(iter: I) -> Self {
        Self::from_clauses(iter.into_iter().collect())
    }
}

/// Renders the formula in DIMACS CNF format.
impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            for lit in clause.iter() {
                write!(f, "{lit} ")?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}
