#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! This module encodes Sudoku puzzles as propositional clauses and decodes
//! solved valuations back into grids.

/// The `solver` module contains the board model, the clause generators and the decoder.
pub mod solver;
