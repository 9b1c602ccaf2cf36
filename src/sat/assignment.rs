use crate::sat::literal::{Literal, Variable};
use core::ops::{Index, IndexMut};

/// The state of a single variable during the search.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    /// Not fixed yet.
    #[default]
    Unassigned,
    /// Fixed to the given truth value.
    Assigned(bool),
}

impl VarState {
    /// Whether the variable has a value.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    /// Whether the variable is still open.
    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        !self.is_assigned()
    }
}

/// Truth values of the variables `1..=n`. Slot 0 is unused.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Valuation(Vec<VarState>);

impl Index<Variable> for Valuation {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.0[index as usize]
    }
}

impl IndexMut<Variable> for Valuation {
    fn index_mut(&mut self, index: Variable) -> &mut Self::Output {
        &mut self.0[index as usize]
    }
}

impl Valuation {
    /// A valuation for `n` variables, all unassigned.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self(vec![VarState::Unassigned; n + 1])
    }

    /// Number of variables covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// No variables at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixes `var`, growing the valuation if `var` lies beyond it.
    pub fn set(&mut self, var: Variable, b: bool) {
        let i = var as usize;
        if i >= self.0.len() {
            self.0.resize(i + 1, VarState::Unassigned);
        }
        self.0[i] = VarState::Assigned(b);
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Literal) {
        self.set(lit.variable(), lit.polarity());
    }

    /// The value of `var`, `None` while unassigned or out of range.
    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        match self.0.get(var as usize) {
            Some(VarState::Assigned(b)) => Some(*b),
            _ => None,
        }
    }

    /// Whether `lit` is true under the valuation, `None` while its variable is open.
    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| b == lit.polarity())
    }

    /// Variables assigned true, ascending.
    #[must_use]
    pub fn true_variables(&self) -> Vec<Variable> {
        self.iter_assigned()
            .filter_map(|(v, b)| b.then_some(v))
            .collect()
    }

    /// `(variable, value)` for every assigned variable, ascending.
    pub fn iter_assigned(&self) -> impl Iterator<Item = (Variable, bool)> + '_ {
        self.0.iter().enumerate().filter_map(|(i, s)| match s {
            VarState::Assigned(b) => Variable::try_from(i).ok().map(|v| (v, *b)),
            VarState::Unassigned => None,
        })
    }

    /// The model as signed integers, in DIMACS order.
    #[must_use]
    pub fn to_dimacs(&self) -> Vec<i32> {
        self.iter_assigned()
            .map(|(v, b)| Literal::new(v, b).to_i32())
            .collect()
    }
}
