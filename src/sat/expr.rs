use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// A propositional formula as an owned tree.
///
/// Every operator owns its operands, so rewrite passes can consume a tree and
/// build a new one without any node ending up shared between the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expr {
    /// A variable, by name.
    Var(String),
    /// Negation.
    Not(Box<Expr>),
    /// Conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Disjunction.
    Or(Box<Expr>, Box<Expr>),
    /// Implication, left to right.
    Implies(Box<Expr>, Box<Expr>),
    /// Biconditional.
    Iff(Box<Expr>, Box<Expr>),
}

/// The operator at the root of a non-leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Op {
    /// `!`
    Not,
    /// `^`
    And,
    /// `v`
    Or,
    /// `=>`
    Implies,
    /// `<=>`
    Iff,
}

impl Op {
    /// The operator as written in formulas.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::And => "^",
            Self::Or => "v",
            Self::Implies => "=>",
            Self::Iff => "<=>",
        }
    }
}

impl Expr {
    /// A variable leaf.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// `!e`
    #[must_use]
    pub fn not(e: Self) -> Self {
        Self::Not(Box::new(e))
    }

    /// `l ^ r`
    #[must_use]
    pub fn and(l: Self, r: Self) -> Self {
        Self::And(Box::new(l), Box::new(r))
    }

    /// `l v r`
    #[must_use]
    pub fn or(l: Self, r: Self) -> Self {
        Self::Or(Box::new(l), Box::new(r))
    }

    /// `l => r`
    #[must_use]
    pub fn implies(l: Self, r: Self) -> Self {
        Self::Implies(Box::new(l), Box::new(r))
    }

    /// `l <=> r`
    #[must_use]
    pub fn iff(l: Self, r: Self) -> Self {
        Self::Iff(Box::new(l), Box::new(r))
    }

    /// The root operator, or `None` for a variable.
    #[must_use]
    pub const fn op(&self) -> Option<Op> {
        match self {
            Self::Var(_) => None,
            Self::Not(_) => Some(Op::Not),
            Self::And(..) => Some(Op::And),
            Self::Or(..) => Some(Op::Or),
            Self::Implies(..) => Some(Op::Implies),
            Self::Iff(..) => Some(Op::Iff),
        }
    }

    /// A variable or a negated variable.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.as_literal().is_some()
    }

    /// Splits a literal into its variable name and polarity.
    #[must_use]
    pub fn as_literal(&self) -> Option<(&str, bool)> {
        match self {
            Self::Var(name) => Some((name, true)),
            Self::Not(e) => match e.as_ref() {
                Self::Var(name) => Some((name, false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Height of the tree, a lone variable counting as 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Var(_) => 1,
            Self::Not(e) => 1 + e.depth(),
            Self::And(l, r) | Self::Or(l, r) | Self::Implies(l, r) | Self::Iff(l, r) => {
                1 + l.depth().max(r.depth())
            }
        }
    }

    /// Distinct variable names, sorted.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names.into_iter().sorted_unstable().dedup().collect_vec()
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Var(name) => names.push(name),
            Self::Not(e) => e.collect_variables(names),
            Self::And(l, r) | Self::Or(l, r) | Self::Implies(l, r) | Self::Iff(l, r) => {
                l.collect_variables(names);
                r.collect_variables(names);
            }
        }
    }

    /// Evaluates the formula with `value` giving the truth of each variable.
    pub fn evaluate<F: Fn(&str) -> bool>(&self, value: &F) -> bool {
        match self {
            Self::Var(name) => value(name),
            Self::Not(e) => !e.evaluate(value),
            Self::And(l, r) => l.evaluate(value) && r.evaluate(value),
            Self::Or(l, r) => l.evaluate(value) || r.evaluate(value),
            Self::Implies(l, r) => !l.evaluate(value) || r.evaluate(value),
            Self::Iff(l, r) => l.evaluate(value) == r.evaluate(value),
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(_) | Self::Not(_) => write!(f, "{self}"),
            _ => write!(f, "({self})"),
        }
    }
}

/// Renders the formula in the same syntax the parser accepts, so that
/// `parse_formula(&e.to_string())` gives back `e`.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "{name}"),
            Self::Not(e) => {
                write!(f, "!")?;
                e.fmt_operand(f)
            }
            Self::And(l, r) | Self::Or(l, r) | Self::Implies(l, r) | Self::Iff(l, r) => {
                l.fmt_operand(f)?;
                if let Some(op) = self.op() {
                    write!(f, "{}", op.symbol())?;
                }
                r.fmt_operand(f)
            }
        }
    }
}
