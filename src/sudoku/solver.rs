use crate::error::{EncodingError, Error, SudokuError};
use crate::sat::assignment::Valuation;
use crate::sat::cnf::Cnf;
use crate::sat::extract::{ClauseCollector, ClauseOrder};
use crate::sat::literal::Variable as VarId;
use crate::sat::symbols::{SymbolTable, encode_clauses};
use itertools::Itertools;
use log::debug;
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Cell values by row, 0 marking an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board(Vec<Vec<usize>>);

impl Board {
    /// Wraps rows as given, unchecked.
    #[must_use]
    pub const fn new(board: Vec<Vec<usize>>) -> Self {
        Self(board)
    }

    /// A board of `size` with every cell empty.
    #[must_use]
    pub fn empty(size: Size) -> Self {
        let n = usize::from(size);
        Self(vec![vec![0; n]; n])
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value at the 1-based `row` and `col`, 0 if empty or off the board.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> usize {
        self.0
            .get(row.wrapping_sub(1))
            .and_then(|r| r.get(col.wrapping_sub(1)))
            .copied()
            .unwrap_or(0)
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.0.iter().map(Vec::as_slice)
    }

    /// `(row, col, value)` of every filled cell, 1-based, row by row.
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.0.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(c, &v)| (r + 1, c + 1, v))
        })
    }
}

impl From<Vec<Vec<usize>>> for Board {
    fn from(board: Vec<Vec<usize>>) -> Self {
        Self::new(board)
    }
}

impl<const N: usize> From<[[usize; N]; N]> for Board {
    fn from(board: [[usize; N]; N]) -> Self {
        Self::new(board.iter().map(|r| r.to_vec()).collect())
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0
    }
}

/// A 4x4 puzzle with a unique solution.
pub const EXAMPLE_FOUR: [[usize; 4]; 4] = [[1, 0, 0, 4], [0, 0, 1, 0], [0, 1, 0, 0], [4, 0, 0, 1]];

/// A classic 9x9 puzzle.
pub const EXAMPLE_NINE: [[usize; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// Supported side lengths, each the square of its block size.
#[derive(Debug, Clone, PartialEq, Eq, Copy, PartialOrd, Ord, Hash)]
pub enum Size {
    /// 4x4 with 2x2 blocks.
    Four = 4,
    /// 9x9 with 3x3 blocks.
    Nine = 9,
    /// 16x16 with 4x4 blocks.
    Sixteen = 16,
    /// 25x25 with 5x5 blocks.
    TwentyFive = 25,
}

impl TryFrom<usize> for Size {
    type Error = SudokuError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            9 => Ok(Self::Nine),
            16 => Ok(Self::Sixteen),
            25 => Ok(Self::TwentyFive),
            _ => Err(SudokuError::InvalidSize(value)),
        }
    }
}

impl From<Size> for usize {
    fn from(size: Size) -> Self {
        size as Self
    }
}

impl Size {
    /// Side length of one block.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Four => 2,
            Self::Nine => 3,
            Self::Sixteen => 4,
            Self::TwentyFive => 5,
        }
    }

    /// One variable per cell and value.
    #[must_use]
    pub const fn num_vars(self) -> usize {
        let n = self as usize;
        n * n * n
    }

    /// Every row, column and block as a list of 1-based `(row, col)` cells.
    #[must_use]
    pub fn units(self) -> Vec<Vec<(usize, usize)>> {
        let n = usize::from(self);
        let b = self.block_size();

        let rows = (1..=n).map(|r| (1..=n).map(|c| (r, c)).collect_vec());
        let cols = (1..=n).map(|c| (1..=n).map(|r| (r, c)).collect_vec());
        let blocks = (0..n).step_by(b).cartesian_product((0..n).step_by(b)).map(|(br, bc)| {
            (br + 1..=br + b)
                .cartesian_product(bc + 1..=bc + b)
                .collect_vec()
        });

        rows.chain(cols).chain(blocks).collect()
    }
}

/// "Cell (`row`, `col`) holds `num`", all 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    /// Row, from 1.
    pub row: usize,
    /// Column, from 1.
    pub col: usize,
    /// Value, from 1.
    pub num: usize,
}

impl Variable {
    /// Cell (`row`, `col`) holding `num`.
    #[must_use]
    pub const fn new(row: usize, col: usize, num: usize) -> Self {
        Self { row, col, num }
    }

    /// The solver id of this variable, in `1..=n^3`.
    #[must_use]
    pub fn encode(&self, size: Size) -> VarId {
        let n = usize::from(size);
        let id = (self.row - 1) * n * n + (self.col - 1) * n + (self.num - 1) + 1;
        VarId::try_from(id).unwrap_or(VarId::MAX)
    }

    /// Inverse of [`Variable::encode`].
    #[must_use]
    pub fn decode(id: VarId, size: Size) -> Option<Self> {
        let n = usize::from(size);
        let i = usize::try_from(id).ok()?.checked_sub(1)?;
        if i >= size.num_vars() {
            return None;
        }
        Some(Self::new(i / (n * n) + 1, (i / n) % n + 1, i % n + 1))
    }

    /// Whether every coordinate lies in `1..=size`.
    #[must_use]
    pub const fn in_range(&self, size: Size) -> bool {
        let n = size as usize;
        self.row >= 1 && self.row <= n && self.col >= 1 && self.col <= n && self.num >= 1 && self.num <= n
    }

    /// Parses the `n{num}_r{row}_c{col}` naming used in clause text.
    #[must_use]
    pub fn parse_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix('n')?;
        let (num, rest) = rest.split_once("_r")?;
        let (row, col) = rest.split_once("_c")?;
        Some(Self::new(row.parse().ok()?, col.parse().ok()?, num.parse().ok()?))
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "n{}_r{}_c{}", self.num, self.row, self.col)
    }
}

/// Maps `n{num}_r{row}_c{col}` names onto [`Variable::encode`] ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SudokuSymbols {
    size: Size,
}

impl SudokuSymbols {
    /// A table for boards of `size`.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self { size }
    }
}

impl SymbolTable for SudokuSymbols {
    fn variable(&mut self, name: &str) -> Option<VarId> {
        Variable::parse_name(name)
            .filter(|v| v.in_range(self.size))
            .map(|v| v.encode(self.size))
    }

    fn name(&self, var: VarId) -> Option<String> {
        Variable::decode(var, self.size).map(|v| v.to_string())
    }
}

/// A validated board with its size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    /// Cell values, 0 where empty.
    pub board: Board,
    /// Side length of `board`.
    pub size: Size,
}

impl Sudoku {
    /// # Errors
    ///
    /// Fails if the board is not square with a supported side length, or holds
    /// a value larger than its side length.
    pub fn new(board: Board) -> Result<Self, SudokuError> {
        let size = Size::try_from(board.len())?;
        let n = usize::from(size);

        for (i, row) in board.rows().enumerate() {
            if row.len() != n {
                return Err(SudokuError::RaggedRow {
                    row: i + 1,
                    found: row.len(),
                    expected: n,
                });
            }
            if let Some(v) = row.iter().find(|&&v| v > n) {
                return Err(SudokuError::InvalidValue(v.to_string()));
            }
        }
        Ok(Self { board, size })
    }

    /// A puzzle of `size` with no clues.
    #[must_use]
    pub fn empty(size: Size) -> Self {
        Self {
            board: Board::empty(size),
            size,
        }
    }

    /// Rows of the board.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.board.rows()
    }

    /// Clause text for the puzzle, one clause per string.
    ///
    /// The filled cells become unit clauses, each cell gets an at-least-one
    /// clause over its values, and each row, column and block forbids any value
    /// twice through pairwise exclusions.
    #[must_use]
    pub fn generate_clauses(&self) -> Vec<String> {
        let n = usize::from(self.size);
        let mut clauses = self.given_units();

        for (row, col) in (1..=n).cartesian_product(1..=n) {
            clauses.push((1..=n).map(|num| Variable::new(row, col, num)).join(" "));
        }

        for unit in self.size.units() {
            for num in 1..=n {
                for (a, b) in unit.iter().tuple_combinations() {
                    clauses.push(format!(
                        "!{} !{}",
                        Variable::new(a.0, a.1, num),
                        Variable::new(b.0, b.1, num)
                    ));
                }
            }
        }
        clauses
    }

    /// The same constraints as formulas for the formula pipeline: every cell
    /// holds exactly one value, and every row, column and block holds each
    /// value exactly once.
    #[must_use]
    pub fn generate_formulas(&self) -> Vec<String> {
        let n = usize::from(self.size);
        let mut formulas = self.given_units();

        for (row, col) in (1..=n).cartesian_product(1..=n) {
            let vars = (1..=n).map(|num| Variable::new(row, col, num)).collect_vec();
            exactly_one(&vars, &mut formulas);
        }

        for unit in self.size.units() {
            for num in 1..=n {
                let vars = unit.iter().map(|&(r, c)| Variable::new(r, c, num)).collect_vec();
                exactly_one(&vars, &mut formulas);
            }
        }
        formulas
    }

    fn given_units(&self) -> Vec<String> {
        self.board
            .filled()
            .map(|(r, c, v)| Variable::new(r, c, v).to_string())
            .collect()
    }

    /// Encodes [`Sudoku::generate_clauses`].
    ///
    /// # Errors
    ///
    /// Only if a generated name falls outside the board, which the generators
    /// never produce for a board built through [`Sudoku::new`].
    pub fn to_cnf(&self) -> Result<Cnf, EncodingError> {
        let clauses = self.generate_clauses();
        debug!("{} clauses generated for a {}x{} board", clauses.len(), self.board.len(), self.board.len());
        self.encode(&clauses)
    }

    /// Runs [`Sudoku::generate_formulas`] through the formula pipeline and
    /// encodes the result.
    ///
    /// # Errors
    ///
    /// Propagates parse and encoding failures.
    pub fn to_cnf_via_formulas(&self, order: ClauseOrder) -> Result<Cnf, Error> {
        let mut collector = ClauseCollector::new(order);
        for formula in self.generate_formulas() {
            collector.push_formula(&formula)?;
        }
        let clauses = collector.finish();
        debug!("{} clauses after conversion", clauses.len());
        Ok(self.encode(&clauses)?)
    }

    fn encode(&self, clauses: &[String]) -> Result<Cnf, EncodingError> {
        let mut cnf = encode_clauses(clauses, &mut SudokuSymbols::new(self.size))?;
        cnf.num_vars = cnf.num_vars.max(self.size.num_vars());
        Ok(cnf)
    }

    /// The grid described by the true variables of `valuation`.
    #[must_use]
    pub fn decode(&self, valuation: &Valuation) -> Self {
        let n = usize::from(self.size);
        let mut board = vec![vec![0; n]; n];
        for var in valuation
            .true_variables()
            .into_iter()
            .filter_map(|id| Variable::decode(id, self.size))
        {
            board[var.row - 1][var.col - 1] = var.num;
        }
        Self {
            board: Board::new(board),
            size: self.size,
        }
    }

    /// Every row, column and block holds each value exactly once.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        let n = usize::from(self.size);
        self.size.units().iter().all(|unit| {
            unit.iter()
                .map(|&(r, c)| self.board.get(r, c))
                .sorted_unstable()
                .eq(1..=n)
        })
    }

    /// Whether `self` keeps every filled cell of `puzzle`.
    #[must_use]
    pub fn extends(&self, puzzle: &Self) -> bool {
        puzzle
            .board
            .filled()
            .all(|(r, c, v)| self.board.get(r, c) == v)
    }
}

fn exactly_one(vars: &[Variable], formulas: &mut Vec<String>) {
    formulas.push(format!("({})", vars.iter().join(" v ")));
    for (a, b) in vars.iter().tuple_combinations() {
        formulas.push(format!("(!{a} v !{b})"));
    }
}

impl From<Sudoku> for Board {
    fn from(sudoku: Sudoku) -> Self {
        sudoku.board
    }
}

impl TryFrom<Board> for Sudoku {
    type Error = SudokuError;

    fn try_from(board: Board) -> Result<Self, Self::Error> {
        Self::new(board)
    }
}

impl Display for Sudoku {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let b = self.size.block_size();
        let width = if usize::from(self.size) > 9 { 2 } else { 1 };
        let separator = (0..b).map(|_| "-".repeat(b * width + b - 1)).join("-+-");

        for (r, row) in self.board.rows().enumerate() {
            if r > 0 && r % b == 0 {
                writeln!(f, "{separator}")?;
            }
            let line = row
                .chunks(b)
                .map(|block| {
                    block
                        .iter()
                        .map(|&v| {
                            if v == 0 {
                                format!("{:>width$}", ".")
                            } else {
                                format!("{v:>width$}")
                            }
                        })
                        .join(" ")
                })
                .join(" | ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn parse_cell(token: &str) -> Result<usize, SudokuError> {
    match token {
        "." | "_" => Ok(0),
        _ => token
            .parse()
            .map_err(|_| SudokuError::InvalidValue(token.to_string())),
    }
}

/// Parses a board, one row per line.
///
/// Cells are separated by whitespace; a row without whitespace is read one
/// character per cell. `0`, `.` and `_` mark empty cells. Blank lines and lines
/// starting with `#` or `c` are skipped.
///
/// # Errors
///
/// Fails on an unreadable cell or a board that [`Sudoku::new`] rejects.
pub fn parse_sudoku(text: &str) -> Result<Sudoku, SudokuError> {
    let rows = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('c'))
        .map(|line| {
            if line.contains(char::is_whitespace) {
                line.split_whitespace().map(parse_cell).collect()
            } else {
                line.chars()
                    .map(|ch| parse_cell(ch.encode_utf8(&mut [0; 4])))
                    .collect()
            }
        })
        .collect::<Result<Vec<Vec<usize>>, _>>()?;

    Sudoku::new(Board::new(rows))
}

/// Reads and parses a board file. See [`parse_sudoku`].
///
/// # Errors
///
/// Fails if the file cannot be read or does not hold a valid board.
pub fn parse_sudoku_file<P: AsRef<Path>>(path: P) -> Result<Sudoku, Error> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_sudoku(&text)?)
}

fn parse_index(text: &str, arg: &str) -> Result<usize, SudokuError> {
    text.trim()
        .parse()
        .map_err(|_| SudokuError::InvalidAssignment(arg.to_string()))
}

/// Builds a puzzle from `RC=V` or `R,C=V` cell arguments, all 1-based.
///
/// The compact `RC=V` form takes a single digit for the row and the column.
///
/// # Errors
///
/// Fails on a malformed argument, a value out of range for `size`, or two
/// assignments to the same cell.
pub fn parse_cell_assignments<S: AsRef<str>>(size: Size, args: &[S]) -> Result<Sudoku, SudokuError> {
    let mut sudoku = Sudoku::empty(size);

    for arg in args {
        let arg = arg.as_ref();
        let (cell, value) = arg
            .split_once('=')
            .ok_or_else(|| SudokuError::InvalidAssignment(arg.to_string()))?;

        let (row, col) = match cell.split_once(',') {
            Some((r, c)) => (parse_index(r, arg)?, parse_index(c, arg)?),
            None => match cell.as_bytes() {
                [r, c] if r.is_ascii_digit() && c.is_ascii_digit() => {
                    (usize::from(r - b'0'), usize::from(c - b'0'))
                }
                _ => return Err(SudokuError::InvalidAssignment(arg.to_string())),
            },
        };
        let value = parse_index(value, arg)?;

        if !Variable::new(row, col, value).in_range(size) {
            return Err(SudokuError::OutOfRange(arg.to_string()));
        }
        if sudoku.board.get(row, col) != 0 {
            return Err(SudokuError::DuplicateAssignment { row, col });
        }
        sudoku.board.0[row - 1][col - 1] = value;
    }
    Ok(sudoku)
}
