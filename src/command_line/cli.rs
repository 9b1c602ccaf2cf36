#![allow(clippy::cast_precision_loss)]

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use log::{debug, info};
use prop_sat::sat::assignment::Valuation;
use prop_sat::sat::cnf::Cnf;
use prop_sat::sat::dpll::Dpll;
use prop_sat::sat::extract::{ClauseCollector, ClauseOrder};
use prop_sat::sat::solver::{SolutionStats, Solver, Verdict};
use prop_sat::sat::symbols::{Alphabet, Interner, SymbolTable, encode_clauses};
use prop_sat::sudoku::solver::{Size, Sudoku, parse_cell_assignments, parse_sudoku_file};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "prop-sat",
    version,
    about = "Converts propositional formulas to CNF and decides them with DPLL"
)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a single formula, e.g. "(A=>B)^A".
    Formula {
        /// The formula. Whitespace is ignored.
        #[arg(short, long)]
        input: String,

        /// How variable names are mapped to solver ids.
        #[arg(long, value_enum, default_value_t = SymbolKind::Alphabet)]
        symbols: SymbolKind,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve the conjunction of all formulas in a file, one formula per line.
    Bnf {
        /// Path to the formula file.
        #[arg(long)]
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = SymbolKind::Alphabet)]
        symbols: SymbolKind,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Sudoku puzzle given as a file or as cell assignments.
    Sudoku {
        /// Path to a board file, one row per line.
        #[arg(long, conflicts_with = "cells")]
        path: Option<PathBuf>,

        /// Cell assignments such as `11=5` or `10,3=12`, 1-based.
        cells: Vec<String>,

        /// Side length of a board given through cell assignments.
        #[arg(long, default_value_t = 9)]
        size: usize,

        /// Generate the constraints as formulas and run them through the CNF conversion.
        #[arg(long, default_value_t = false)]
        bnf: bool,

        /// Print the generated clause set in DIMACS format and save it next to the input.
        #[arg(short, long, default_value_t = false)]
        export_dimacs: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.bnf` and `.sudoku` file below a directory.
    Dir {
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    pub(crate) const fn common(&self) -> Option<&CommonOptions> {
        match self {
            Self::Formula { common, .. }
            | Self::Bnf { common, .. }
            | Self::Sudoku { common, .. }
            | Self::Dir { common, .. } => Some(common),
            Self::Completions { .. } => None,
        }
    }
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Log every solver step.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check the found valuation against the clause set.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the model as signed variable ids.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Order in which clauses are handed to the solver.
    #[arg(long, value_enum, default_value_t = ClauseOrder::Length)]
    pub(crate) clause_order: ClauseOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum SymbolKind {
    /// Single letters `A` to `Z`.
    #[default]
    Alphabet,
    /// Any name, numbered in order of appearance.
    Interned,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alphabet => write!(f, "alphabet"),
            Self::Interned => write!(f, "interned"),
        }
    }
}

impl SymbolKind {
    fn table(self) -> Box<dyn SymbolTable> {
        match self {
            Self::Alphabet => Box::new(Alphabet),
            Self::Interned => Box::new(Interner::new()),
        }
    }
}

/// Everything the reporting functions need about one solver run.
struct Outcome {
    verdict: Verdict,
    valuation: Valuation,
    elapsed: Duration,
    stats: SolutionStats,
}

pub(crate) fn run(command: Commands) -> Result<(), String> {
    match command {
        Commands::Formula {
            input,
            symbols,
            common,
        } => solve_formulas(&[input], symbols, &common, None),
        Commands::Bnf {
            path,
            symbols,
            common,
        } => solve_bnf(&path, symbols, &common),
        Commands::Sudoku {
            path,
            cells,
            size,
            bnf,
            export_dimacs,
            common,
        } => {
            let sudoku = match &path {
                Some(path) => parse_sudoku_file(path).map_err(|e| e.to_string())?,
                None if cells.is_empty() => {
                    return Err("no Sudoku given, pass --path or cell assignments".to_string());
                }
                None => {
                    let size = Size::try_from(size).map_err(|e| e.to_string())?;
                    parse_cell_assignments(size, &cells).map_err(|e| e.to_string())?
                }
            };
            solve_sudoku(&sudoku, path.as_deref(), bnf, export_dimacs, &common)
        }
        Commands::Dir { path, common } => solve_dir(&path, &common),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Solves every `.bnf` and `.sudoku` file below `path`.
///
/// # Errors
///
/// Stops at the first file that fails to parse or to verify.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let file_path = entry.path();
        match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("bnf") => solve_bnf(file_path, SymbolKind::Interned, common)?,
            Some("sudoku") => {
                let sudoku = parse_sudoku_file(file_path).map_err(|e| e.to_string())?;
                solve_sudoku(&sudoku, Some(file_path), false, false, common)?;
            }
            _ => eprintln!("Skipping unsupported file: {}", file_path.display()),
        }
    }
    Ok(())
}

/// Solves the conjunction of the formulas in a file, one per line.
///
/// # Errors
///
/// If the file cannot be read or a line is not a valid formula.
pub(crate) fn solve_bnf(path: &Path, symbols: SymbolKind, common: &CommonOptions) -> Result<(), String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Could not read {}: {e}", path.display()))?;
    let formulas = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    solve_formulas(&formulas, symbols, common, Some(path))
}

fn solve_formulas(
    formulas: &[String],
    symbols: SymbolKind,
    common: &CommonOptions,
    label: Option<&Path>,
) -> Result<(), String> {
    let time = Instant::now();

    let mut collector = ClauseCollector::new(common.clause_order);
    for (i, formula) in formulas.iter().enumerate() {
        info!("formula: {formula}");
        let n = collector
            .push_formula(formula)
            .map_err(|e| format!("formula {}: {e}", i + 1))?;
        debug!("{n} clauses from {formula}");
    }
    let clauses = collector.finish();
    debug!("all clauses: {clauses:?}");

    let mut table = symbols.table();
    let cnf = encode_clauses(&clauses, table.as_mut()).map_err(|e| e.to_string())?;
    let parse_time = time.elapsed();

    let outcome = solve(&cnf, label, common);
    report(&cnf, &outcome, parse_time, common)?;

    if outcome.verdict.is_sat() {
        print_valuation(&outcome.valuation, table.as_ref());
    }
    Ok(())
}

/// Solves a Sudoku and prints the completed grid.
///
/// # Errors
///
/// If the clauses cannot be generated, the DIMACS export cannot be written or
/// the solution fails verification.
pub(crate) fn solve_sudoku(
    sudoku: &Sudoku,
    path: Option<&Path>,
    bnf: bool,
    export_dimacs: bool,
    common: &CommonOptions,
) -> Result<(), String> {
    let time = Instant::now();
    println!("Parsed Sudoku:\n{sudoku}");

    let cnf = if bnf {
        sudoku
            .to_cnf_via_formulas(common.clause_order)
            .map_err(|e| e.to_string())?
    } else {
        sudoku.to_cnf().map_err(|e| e.to_string())?
    };

    if export_dimacs {
        let dimacs = cnf.to_string();
        println!("DIMACS:\n{dimacs}");

        let dimacs_path = path.map_or_else(
            || PathBuf::from("sudoku.cnf"),
            |p| PathBuf::from(format!("{}.cnf", p.display())),
        );
        std::fs::write(&dimacs_path, dimacs)
            .map_err(|e| format!("Unable to write {}: {e}", dimacs_path.display()))?;
        println!("DIMACS written to: {}", dimacs_path.display());
    }

    let parse_time = time.elapsed();
    let outcome = solve(&cnf, path, common);
    report(&cnf, &outcome, parse_time, common)?;

    if outcome.verdict.is_sat() {
        let solution = sudoku.decode(&outcome.valuation);
        if common.verify && !(solution.is_solved() && solution.extends(sudoku)) {
            return Err("Decoded grid is not a valid solution".to_string());
        }
        println!("Solution:\n{solution}");
    } else {
        println!("No solution found");
    }
    Ok(())
}

fn solve(cnf: &Cnf, label: Option<&Path>, common: &CommonOptions) -> Outcome {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    if common.debug {
        println!("Variables: {}", cnf.num_vars);
        println!("Clauses: {}", cnf.len());
    }

    let _ = epoch::advance();
    let time = Instant::now();

    let mut solver = Dpll::new(cnf.clone());
    let verdict = solver.solve();

    let elapsed = time.elapsed();
    debug!("{verdict} in {elapsed:?}");

    Outcome {
        verdict,
        valuation: solver.valuation().clone(),
        elapsed,
        stats: solver.stats(),
    }
}

fn report(cnf: &Cnf, outcome: &Outcome, parse_time: Duration, common: &CommonOptions) -> Result<(), String> {
    if common.verify {
        verify_solution(cnf, outcome)?;
    }

    if common.stats {
        print_stats(parse_time, cnf, outcome, memory_usage());
    }

    if common.print_solution && outcome.verdict.is_sat() {
        let model = outcome
            .valuation
            .to_dimacs()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        println!("Model: {model}");
    }

    println!("\n{}", outcome.verdict);
    Ok(())
}

/// Checks a satisfying valuation against the clause set it was found for.
///
/// # Errors
///
/// If some clause is not satisfied.
fn verify_solution(cnf: &Cnf, outcome: &Outcome) -> Result<(), String> {
    if !outcome.verdict.is_sat() {
        return Ok(());
    }

    let ok = cnf.verify(&outcome.valuation);
    println!("Verified: {ok:?}");
    if ok {
        Ok(())
    } else {
        Err("Solution failed verification!".to_string())
    }
}

fn print_valuation(valuation: &Valuation, table: &dyn SymbolTable) {
    println!("Solution:");
    for (var, value) in valuation.iter_assigned() {
        let name = table.name(var).unwrap_or_else(|| var.to_string());
        println!("{name} = {}", if value { "True" } else { "False" });
    }
}

/// Allocated and resident memory in MiB, if jemalloc reports them.
fn memory_usage() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

pub(crate) fn stat_line(label: &str, value: impl Display) {
    println!("|  {label:<28} {value:>18}  |");
}

pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
fn print_stats(parse_time: Duration, cnf: &Cnf, outcome: &Outcome, memory: Option<(f64, f64)>) {
    let elapsed_secs = outcome.elapsed.as_secs_f64();
    let s = &outcome.stats;

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.literals().count());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Pure literals", s.pure_literals, elapsed_secs);
    stat_line_with_rate("Backtracks", s.backtracks, elapsed_secs);
    if let Some((allocated, resident)) = memory {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_formula_command() {
        let cli = Cli::try_parse_from(["prop-sat", "formula", "--input", "A^B", "--symbols", "interned"]).unwrap();
        match cli.command {
            Commands::Formula { input, symbols, common } => {
                assert_eq!(input, "A^B");
                assert_eq!(symbols, SymbolKind::Interned);
                assert!(common.verify);
                assert_eq!(common.clause_order, ClauseOrder::Length);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_sudoku_cells() {
        let cli = Cli::try_parse_from([
            "prop-sat",
            "sudoku",
            "11=5",
            "2,3=7",
            "--bnf",
            "--clause-order",
            "input",
            "--stats",
            "false",
        ])
        .unwrap();
        match cli.command {
            Commands::Sudoku { path, cells, size, bnf, common, .. } => {
                assert!(path.is_none());
                assert_eq!(cells, vec!["11=5", "2,3=7"]);
                assert_eq!(size, 9);
                assert!(bnf);
                assert!(!common.stats);
                assert_eq!(common.clause_order, ClauseOrder::Input);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_sudoku_path_conflicts_with_cells() {
        assert!(Cli::try_parse_from(["prop-sat", "sudoku", "--path", "a.sudoku", "11=5"]).is_err());
    }

    #[test]
    fn test_common_is_absent_for_completions() {
        let cli = Cli::try_parse_from(["prop-sat", "completions", "bash"]).unwrap();
        assert!(cli.command.common().is_none());
    }

    #[test]
    fn test_formula_end_to_end() {
        let common = CommonOptions {
            verify: true,
            stats: false,
            ..CommonOptions::default()
        };
        assert!(solve_formulas(&["(A=>B)^A".to_string()], SymbolKind::Alphabet, &common, None).is_ok());
        assert!(solve_formulas(&["A^(B".to_string()], SymbolKind::Alphabet, &common, None).is_err());
        assert!(solve_formulas(&["n1^B".to_string()], SymbolKind::Alphabet, &common, None).is_err());
    }
}
