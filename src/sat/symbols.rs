//! Mapping between variable names and the integer ids the solver works on.
//!
//! A [`SymbolTable`] turns the name in a clause token into a [`Variable`] and back.
//! [`encode`] and [`encode_clauses`] use one to turn textual clauses, as produced
//! by [`crate::sat::extract`], into a [`Cnf`].

use crate::error::EncodingError;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use rustc_hash::FxHashMap;

/// Marks a negated token in clause text.
pub const NEGATION: char = '!';

/// Maps variable names to solver ids and back.
pub trait SymbolTable {
    /// The id of `name`, or `None` if the table cannot represent it.
    ///
    /// Tables that assign ids lazily may record `name` as a side effect.
    fn variable(&mut self, name: &str) -> Option<Variable>;

    /// The name of `var`, if it has one.
    fn name(&self, var: Variable) -> Option<String>;
}

/// Single upper-case letters: `A` is 1, `Z` is 26.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Alphabet;

impl SymbolTable for Alphabet {
    fn variable(&mut self, name: &str) -> Option<Variable> {
        match name.as_bytes() {
            [c @ b'A'..=b'Z'] => Some(Variable::from(c - b'A') + 1),
            _ => None,
        }
    }

    fn name(&self, var: Variable) -> Option<String> {
        let offset = u8::try_from(var.checked_sub(1)?).ok()?;
        (offset < 26).then(|| char::from(b'A' + offset).to_string())
    }
}

/// Accepts any name, handing out ids in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    ids: FxHashMap<String, Variable>,
    names: Vec<String>,
}

impl Interner {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of names seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// No names seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The id of `name` if it has been seen, without recording it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Variable> {
        self.ids.get(name).copied()
    }
}

impl SymbolTable for Interner {
    fn variable(&mut self, name: &str) -> Option<Variable> {
        if let Some(&id) = self.ids.get(name) {
            return Some(id);
        }

        let id = Variable::try_from(self.names.len() + 1).ok()?;
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        Some(id)
    }

    fn name(&self, var: Variable) -> Option<String> {
        let i = usize::try_from(var.checked_sub(1)?).ok()?;
        self.names.get(i).cloned()
    }
}

/// Encodes a single clause token such as `B` or `!n3_r1_c2`.
///
/// # Errors
///
/// [`EncodingError::EmptyToken`] for a bare `!` and [`EncodingError::UnknownToken`]
/// for a name the table cannot represent.
pub fn encode<T: SymbolTable + ?Sized>(token: &str, table: &mut T) -> Result<Literal, EncodingError> {
    let (name, polarity) = match token.strip_prefix(NEGATION) {
        Some(rest) => (rest, false),
        None => (token, true),
    };
    if name.is_empty() {
        return Err(EncodingError::EmptyToken(token.to_string()));
    }

    table
        .variable(name)
        .map(|var| Literal::new(var, polarity))
        .ok_or_else(|| EncodingError::UnknownToken(token.to_string()))
}

/// Encodes one whitespace separated clause. Repeated literals are merged.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_clause<T: SymbolTable + ?Sized>(
    clause: &str,
    table: &mut T,
) -> Result<Clause, EncodingError> {
    clause
        .split_whitespace()
        .map(|token| encode(token, table))
        .collect()
}

/// Encodes every clause, in order.
///
/// # Errors
///
/// Stops at the first token that fails to encode. See [`encode`].
pub fn encode_clauses<S: AsRef<str>, T: SymbolTable + ?Sized>(
    clauses: &[S],
    table: &mut T,
) -> Result<Cnf, EncodingError> {
    let clauses = clauses
        .iter()
        .map(|c| encode_clause(c.as_ref(), table))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Cnf::from_clauses(clauses))
}

/// Renders a literal with its name, e.g. `!B`, or its id if it has no name.
pub fn decode<T: SymbolTable + ?Sized>(lit: Literal, table: &T) -> String {
    let name = table
        .name(lit.variable())
        .unwrap_or_else(|| lit.variable().to_string());
    if lit.polarity() {
        name
    } else {
        format!("{NEGATION}{name}")
    }
}
