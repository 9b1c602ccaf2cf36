//! # prop-sat
//!
//! `prop-sat` converts propositional formulas into conjunctive normal form and
//! decides them with a DPLL solver. It also solves Sudoku puzzles by encoding
//! the board as clauses and decoding the satisfying valuation back into a grid.
//!
//! ## Formula syntax
//!
//! Variables are alphanumeric names. The connectives, from loosest to
//! tightest binding, are `<=>`, `=>`, `v`, `^` and the prefix `!`. Binary
//! operators associate to the left and whitespace is ignored.
//!
//! ## Usage
//!
//! ```sh
//! prop-sat <SUBCOMMAND> [OPTIONS]
//! ```
//!
//! 1.  **`formula`**: Solve one formula.
//!     ```sh
//!     prop-sat formula --input "(A=>B)^A"
//!     ```
//!
//! 2.  **`bnf`**: Solve the conjunction of the formulas in a file, one per line.
//!     ```sh
//!     prop-sat bnf --path problem.bnf --symbols interned
//!     ```
//!
//! 3.  **`sudoku`**: Solve a Sudoku from a file or from cell assignments.
//!     ```sh
//!     prop-sat sudoku --path puzzle.sudoku --export-dimacs
//!     prop-sat sudoku 11=5 12=3 15=7 --bnf
//!     ```
//!
//! 4.  **`dir`**: Solve every `.bnf` and `.sudoku` file below a directory.
//!
//! 5.  **`completions`**: Print a shell completion script.
//!
//! ### Common Options
//!
//! -   `-d, --debug`: Log each unit, pure literal and guess (default: `false`).
//! -   `-v, --verify <BOOL>`: Check the valuation against the clauses (default: `true`).
//! -   `-s, --stats <BOOL>`: Print statistics (default: `true`).
//! -   `-p, --print-solution`: Print the model as signed variable ids (default: `false`).
//! -   `--clause-order <ORDER>`: `length` or `input` (default: `length`).
//!
//! Logging goes through `env_logger`; `RUST_LOG` is honoured unless `--debug` is set.

mod command_line;

use clap::Parser;
use command_line::cli::{Cli, run};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.command.common().is_some_and(|c| c.debug));

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
