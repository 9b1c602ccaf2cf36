#![deny(missing_docs)]
//! This crate converts propositional formulas to conjunctive normal form and
//! decides them with a classical DPLL solver. A Sudoku front end encodes boards
//! as formulas and decodes the resulting valuation back into a grid.

/// Errors raised while parsing formulas, encoding literals or reading boards.
pub mod error;

/// The `sat` module implements the formula pipeline and the DPLL solver.
pub mod sat;

/// The `sudoku` module encodes Sudoku puzzles as clause text and decodes solutions.
pub mod sudoku;

pub use error::{EncodingError, Error, ParseError, Result, SudokuError};
