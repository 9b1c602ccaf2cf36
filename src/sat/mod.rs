#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
/// Per-variable truth values.
pub mod assignment;
/// Disjunctions of literals.
pub mod clause;
/// Clause sets handed to a solver.
pub mod cnf;
/// The backtracking DPLL search.
pub mod dpll;
/// The propositional expression tree.
pub mod expr;
/// Clause text out of a normalized tree.
pub mod extract;
/// Signed integer literals.
pub mod literal;
/// Formula text into an expression tree.
pub mod parser;
/// The solver interface and its results.
pub mod solver;
/// Variable names to solver ids.
pub mod symbols;
/// Rewrites into conjunctive normal form.
pub mod transform;
