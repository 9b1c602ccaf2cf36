//! Error types shared by the formula pipeline, the literal encoder and the
//! Sudoku front end.

use thiserror::Error;

/// A formula that could not be turned into an expression tree.
///
/// Variants that concern a position carry the offending fragment and its byte
/// offset in the whitespace-stripped formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The formula contained nothing but whitespace.
    #[error("empty formula")]
    EmptyFormula,

    /// The formula contains bytes outside of ASCII.
    #[error("formula contains non-ASCII input: {0:?}")]
    NonAscii(String),

    /// An operator is missing one of its operands, e.g. `A^` or `!`.
    #[error("missing operand at offset {offset} in {fragment:?}")]
    EmptyOperand {
        /// The text around the missing operand.
        fragment: String,
        /// Byte offset where the operand was expected.
        offset: usize,
    },

    /// Parentheses do not pair up inside the fragment.
    #[error("unbalanced parentheses at offset {offset} in {fragment:?}")]
    UnbalancedParens {
        /// The fragment that was being parsed.
        fragment: String,
        /// Byte offset of the parenthesis without a partner.
        offset: usize,
    },

    /// The fragment is neither an operator application nor a variable.
    #[error("unrecognised token {fragment:?} at offset {offset}")]
    UnexpectedToken {
        /// The token that could not be parsed.
        fragment: String,
        /// Byte offset of the first offending byte.
        offset: usize,
    },

    /// The requested range lies outside the formula text.
    #[error("range {start}..={end} is out of bounds for a formula of length {len}")]
    OutOfBounds {
        /// First byte of the requested range.
        start: usize,
        /// Last byte of the requested range, inclusive.
        end: usize,
        /// Length of the formula text.
        len: usize,
    },
}

/// A clause token the symbol table cannot map to a variable id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The table has no id for the variable in this token.
    #[error("unknown variable token {0:?}")]
    UnknownToken(String),

    /// A negation marker with no variable after it.
    #[error("negation marker without a variable in {0:?}")]
    EmptyToken(String),
}

/// Problems with a Sudoku board or its cell assignments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SudokuError {
    /// The side length is not 4, 9, 16 or 25.
    #[error("unsupported board size {0}, expected 4, 9, 16 or 25")]
    InvalidSize(usize),

    /// A row whose length differs from the number of rows.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// 1-based row number.
        row: usize,
        /// Cells found in the row.
        found: usize,
        /// Cells the board size requires.
        expected: usize,
    },

    /// A cell argument that is neither `RC=V` nor `R,C=V`.
    #[error("invalid cell assignment {0:?}, expected RC=V or R,C=V")]
    InvalidAssignment(String),

    /// A row, column or value outside the board.
    #[error("value out of range in {0:?}")]
    OutOfRange(String),

    /// Two cell arguments for the same cell.
    #[error("duplicate assignment at row {row}, column {col}")]
    DuplicateAssignment {
        /// 1-based row.
        row: usize,
        /// 1-based column.
        col: usize,
    },

    /// A board cell that is not a number, `.` or `_`.
    #[error("invalid cell value {0:?}")]
    InvalidValue(String),
}

/// The crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`ParseError`].
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// See [`EncodingError`].
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// See [`SudokuError`].
    #[error("sudoku error: {0}")]
    Sudoku(#[from] SudokuError),

    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
