use core::ops::{Neg, Not};
use std::fmt::{self, Display, Formatter};
use std::num::NonZeroI32;

/// Variable ids start at 1; 0 is never a variable.
pub type Variable = u32;

/// A variable together with a polarity, stored as a non-zero signed integer.
///
/// The sign is the polarity and the magnitude is the variable id, so `-3` is the
/// negation of variable 3. Using [`NonZeroI32`] makes `Option<Literal>` the same
/// size as `Literal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(NonZeroI32);

impl Literal {
    /// # Panics
    ///
    /// Panics if `var` is 0 or does not fit in an `i32`.
    #[must_use]
    pub fn new(var: Variable, polarity: bool) -> Self {
        let var = i32::try_from(var).expect("literal variable overflowed");
        Self::from_i32(if polarity { var } else { -var })
    }

    /// # Panics
    ///
    /// Panics if `value` is 0, which is reserved.
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        Self(NonZeroI32::new(value).expect("literal 0 is reserved"))
    }

    /// The DIMACS form, e.g. `-3`.
    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self.0.get()
    }

    /// The variable id, ignoring polarity.
    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0.get().unsigned_abs()
    }

    /// `true` for a positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0.get().is_positive()
    }

    /// The same variable with the opposite polarity.
    #[must_use]
    pub fn negated(self) -> Self {
        Self(-self.0)
    }

    /// Index of the variable, for vectors indexed by variable id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.variable() as usize
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl From<Literal> for i32 {
    fn from(lit: Literal) -> Self {
        lit.to_i32()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Neg for &Literal {
    type Output = Literal;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for &Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negated()
    }
}
