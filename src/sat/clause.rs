use crate::sat::assignment::Valuation;
use crate::sat::literal::Literal;
use core::ops::Index;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// A disjunction of literals. Empty means contradiction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    /// The disjuncts, without repeats.
    pub literals: SmallVec<[Literal; 8]>,
}

impl Clause {
    /// Builds a clause from signed integers, dropping repeated literals.
    #[must_use]
    pub fn new(literals: &[i32]) -> Self {
        literals.iter().copied().map(Literal::from).collect()
    }

    /// A clause holding only `lit`.
    #[must_use]
    pub fn unit(lit: Literal) -> Self {
        let mut literals = SmallVec::new();
        literals.push(lit);
        Self { literals }
    }

    /// Number of literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// The empty clause, which no valuation satisfies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Exactly one literal left.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    /// Iterates the literals in order.
    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    /// Whether `lit` occurs with this exact polarity.
    #[must_use]
    pub fn contains(&self, lit: Literal) -> bool {
        self.literals.contains(&lit)
    }

    /// Drops every occurrence of `lit`. Returns whether anything was removed.
    pub fn remove_literal(&mut self, lit: Literal) -> bool {
        let before = self.literals.len();
        self.literals.retain(|l| *l != lit);
        self.literals.len() != before
    }

    /// Contains some literal together with its negation.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        let mut seen = FxHashSet::default();
        self.literals.iter().any(|&lit| {
            seen.insert(lit);
            seen.contains(&lit.negated())
        })
    }

    /// Some literal is true under `valuation`.
    #[must_use]
    pub fn is_satisfied_by(&self, valuation: &Valuation) -> bool {
        self.iter()
            .any(|&lit| valuation.literal_value(lit) == Some(true))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<I: IntoIterator<Item = Literal>>(iter: I) -> Self {
        let mut literals: SmallVec<[Literal; 8]> = SmallVec::new();
        for lit in iter {
            if !literals.contains(&lit) {
                literals.push(lit);
            }
        }
        Self { literals }
    }
}

impl From<Vec<i32>> for Clause {
    fn from(literals: Vec<i32>) -> Self {
        Self::new(&literals)
    }
}

impl From<&Vec<i32>> for Clause {
    fn from(literals: &Vec<i32>) -> Self {
        Self::new(literals)
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        literals.into_iter().collect()
    }
}
