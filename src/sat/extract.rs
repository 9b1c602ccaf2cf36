//! Flattening of a CNF tree into textual clauses.
//!
//! A textual clause lists its literals separated by single spaces, a negated
//! literal carrying a `!` prefix: `!A B` stands for `!A v B`. This is the format
//! the literal encoder in [`crate::sat::symbols`] consumes.

use crate::error::ParseError;
use crate::sat::expr::Expr;
use crate::sat::parser::parse_formula;
use crate::sat::transform::normalize;
use itertools::Itertools;
use log::trace;
use std::fmt::{self, Display, Formatter};

/// How clauses are ordered before they reach the solver.
///
/// The order never changes the verdict, only how quickly propagation kicks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum ClauseOrder {
    /// Shorter clauses first, ties kept in discovery order.
    #[default]
    Length,
    /// Discovery order.
    Input,
}

impl Display for ClauseOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(f, "length"),
            Self::Input => write!(f, "input"),
        }
    }
}

/// Emits one textual clause per maximal non-`And` subtree of `root`.
///
/// `None` stands for a formula with no clauses left and yields nothing.
#[must_use]
pub fn extract(root: Option<&Expr>) -> Vec<String> {
    let mut clauses = Vec::new();
    if let Some(root) = root {
        store(root, &mut clauses);
    }
    clauses
}

fn store(e: &Expr, clauses: &mut Vec<String>) {
    match e {
        Expr::And(l, r) => {
            store(l, clauses);
            store(r, clauses);
        }
        e => {
            let mut buffer = String::new();
            write_clause(e, &mut buffer);
            clauses.push(buffer);
        }
    }
}

fn write_clause(e: &Expr, buffer: &mut String) {
    match e {
        Expr::Var(name) => buffer.push_str(name),
        Expr::Not(a) => {
            buffer.push('!');
            write_clause(a, buffer);
        }
        Expr::Or(l, r) => {
            write_clause(l, buffer);
            buffer.push(' ');
            write_clause(r, buffer);
        }
        // Only reachable for trees that skipped normalization.
        Expr::And(l, r) | Expr::Implies(l, r) | Expr::Iff(l, r) => {
            write_clause(l, buffer);
            if let Some(op) = e.op() {
                buffer.push_str(op.symbol());
            }
            write_clause(r, buffer);
        }
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
#[must_use]
pub fn normalize_whitespace(clause: &str) -> String {
    clause.split_whitespace().join(" ")
}

/// Drops repeated clauses, keeping the first occurrence of each.
pub fn deduplicate<I: IntoIterator<Item = String>>(clauses: I) -> Vec<String> {
    clauses
        .into_iter()
        .map(|c| normalize_whitespace(&c))
        .filter(|c| !c.is_empty())
        .unique()
        .collect_vec()
}

/// Puts `clauses` into the requested order.
pub fn order(clauses: &mut [String], order: ClauseOrder) {
    match order {
        ClauseOrder::Length => clauses.sort_by_key(String::len),
        ClauseOrder::Input => {}
    }
}

/// Gathers the clauses of many formulas into one clause list.
#[derive(Debug, Clone, Default)]
pub struct ClauseCollector {
    clauses: Vec<String>,
    order: ClauseOrder,
}

impl ClauseCollector {
    /// An empty collector that will put its clauses in `order`.
    #[must_use]
    pub const fn new(order: ClauseOrder) -> Self {
        Self {
            clauses: Vec::new(),
            order,
        }
    }

    /// Converts `formula` to CNF and appends its clauses.
    ///
    /// Returns how many clauses the formula produced, before deduplication.
    ///
    /// # Errors
    ///
    /// Fails with the [`ParseError`] of a malformed formula; nothing is appended
    /// in that case.
    pub fn push_formula(&mut self, formula: &str) -> Result<usize, ParseError> {
        let expr = parse_formula(formula)?;
        trace!("parsed {formula} to a tree of depth {}", expr.depth());
        let cnf = normalize(expr);
        let clauses = extract(cnf.as_ref());
        trace!("{formula} -> {clauses:?}");

        let n = clauses.len();
        self.clauses.extend(clauses);
        Ok(n)
    }

    /// Appends an already textual clause.
    pub fn push_clause(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    /// Clauses collected so far, repeats included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Nothing collected yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The deduplicated and ordered clause list.
    #[must_use]
    pub fn finish(self) -> Vec<String> {
        let mut clauses = deduplicate(self.clauses);
        order(&mut clauses, self.order);
        clauses
    }
}

/// Runs a single formula through the whole pipeline.
///
/// # Errors
///
/// Fails with the [`ParseError`] of a malformed formula.
pub fn formula_to_clauses(formula: &str) -> Result<Vec<String>, ParseError> {
    let mut collector = ClauseCollector::default();
    collector.push_formula(formula)?;
    Ok(collector.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_conjunction_of_literals() {
        assert_eq!(formula_to_clauses("A^B").unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_extract_renders_or_as_space_and_not_as_bang() {
        let clauses = formula_to_clauses("(A=>B)^(CvD)").unwrap();
        assert_eq!(clauses, vec!["!A B", "C D"]);
    }

    #[test]
    fn test_extract_none_is_empty() {
        assert!(extract(None).is_empty());
        assert!(formula_to_clauses("Av!A").unwrap().is_empty());
    }

    #[test]
    fn test_deduplicate_keeps_first_occurrence() {
        let clauses = vec![
            "A B".to_string(),
            "C".to_string(),
            "A  B ".to_string(),
            "C".to_string(),
            "!A".to_string(),
        ];
        assert_eq!(deduplicate(clauses), vec!["A B", "C", "!A"]);
    }

    #[test]
    fn test_order_by_length_is_stable() {
        let mut clauses = vec![
            "A B C".to_string(),
            "B".to_string(),
            "!C D".to_string(),
            "A".to_string(),
            "C D".to_string(),
        ];
        order(&mut clauses, ClauseOrder::Length);
        assert_eq!(clauses, vec!["B", "A", "C D", "!C D", "A B C"]);

        let mut clauses = vec!["A B".to_string(), "C".to_string()];
        order(&mut clauses, ClauseOrder::Input);
        assert_eq!(clauses, vec!["A B", "C"]);
    }

    #[test]
    fn test_collector_merges_formulas() {
        let mut collector = ClauseCollector::new(ClauseOrder::Length);
        assert_eq!(collector.push_formula("A<=>B").unwrap(), 2);
        assert_eq!(collector.push_formula("(!AvB)^C").unwrap(), 2);
        collector.push_clause("C");
        assert_eq!(collector.len(), 5);
        assert_eq!(collector.finish(), vec!["C", "!A B", "!B A"]);
    }

    #[test]
    fn test_collector_rejects_bad_formula_without_side_effects() {
        let mut collector = ClauseCollector::default();
        assert!(collector.push_formula("A^(B").is_err());
        assert!(collector.is_empty());
    }

    #[test]
    fn test_sudoku_style_pairwise_exclusion() {
        let clauses = formula_to_clauses("(!n1_r1_c1 v !n1_r1_c2)").unwrap();
        assert_eq!(clauses, vec!["!n1_r1_c1 !n1_r1_c2"]);
    }
}
