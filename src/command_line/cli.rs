#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand};
use sat_puzzles::csp::{EngineConfig, Session, SolveStats};
use sat_puzzles::extract::Outcome;
use sat_puzzles::queens::Queens;
use sat_puzzles::resources::ResourcePuzzle;
use sat_puzzles::sudoku::{Board, EXAMPLE_NINE, Size, Sudoku};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;
use tikv_jemalloc_ctl::{epoch, stats};

/// Solves combinatorial puzzles by compiling them to SAT.
#[derive(Parser, Debug)]
#[command(name = "sat-puzzles", version, about = "Puzzles solved through a CDCL SAT solver")]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Buy 100 animals for 100 dollars: dogs at 15, cats at 1, mice at 25 cents.
    Resources {
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Sudoku. Without `--givens`, solves the built-in 9x9 example.
    Sudoku {
        /// Givens as n*n cells, `0` or `.` for blank. Cells of boards wider
        /// than 9 are separated by spaces or commas.
        #[arg(short, long, conflicts_with = "blank")]
        givens: Option<String>,

        /// Solve an empty board instead.
        #[arg(long, default_value_t = false)]
        blank: bool,

        /// Side length of the empty board used with `--blank`.
        #[arg(long, default_value_t = 9, requires = "blank")]
        size: usize,

        /// Write the compiled CNF in DIMACS format to this path.
        #[arg(short, long)]
        export_dimacs: Option<PathBuf>,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Place n non-attacking queens on an n x n board.
    Queens {
        #[arg(short = 'n', long, default_value_t = 8)]
        size: usize,

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
            Self::Resources { common }
            | Self::Sudoku { common, .. }
            | Self::Queens { common, .. } => Some(common),
            Self::Completions { .. } => None,
        }
    }
}

/// Options shared by every solving subcommand.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Log encoding and search progress at debug level.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = false)]
    pub(crate) stats: bool,

    /// Give up after this many conflicts.
    #[arg(long)]
    pub(crate) max_conflicts: Option<u64>,

    /// Give up after this many milliseconds.
    #[arg(long)]
    pub(crate) timeout_ms: Option<u64>,

    /// Seed for the solver's phase noise.
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,
}

impl CommonOptions {
    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_max_conflicts(self.max_conflicts)
            .with_timeout(self.timeout_ms.map(Duration::from_millis))
            .with_seed(self.seed)
    }
}

pub(crate) fn solve_resources(common: &CommonOptions) -> Result<(), String> {
    let puzzle = ResourcePuzzle::default();
    let mut session = Session::new(common.engine_config());
    let outcome = puzzle
        .solve_in(&mut session)
        .map_err(|e| format!("Error solving resource puzzle: {e}"))?;

    report(&outcome, &session, common);
    if let Outcome::Solved(allocation) = &outcome {
        if !allocation.check(&puzzle) {
            return Err("Allocation failed verification".to_string());
        }
    }
    Ok(())
}

pub(crate) fn solve_sudoku(
    givens: Option<&str>,
    blank: bool,
    size: usize,
    export_dimacs: Option<&PathBuf>,
    common: &CommonOptions,
) -> Result<(), String> {
    let board = if blank {
        Board::blank(Size::try_from(size).map_err(|e| e.to_string())?)
    } else if let Some(text) = givens {
        text.parse::<Board>()
            .map_err(|e| format!("Error parsing Sudoku: {e}"))?
    } else {
        Board::from(EXAMPLE_NINE)
    };
    let sudoku = Sudoku::new(board).map_err(|e| format!("Invalid Sudoku: {e}"))?;
    println!("Parsed Sudoku:\n{}", sudoku.board());

    if let Some(path) = export_dimacs {
        let cnf = sudoku.to_cnf().map_err(|e| e.to_string())?;
        std::fs::write(path, cnf.to_string())
            .map_err(|e| format!("Unable to write file {}: {e}", path.display()))?;
        println!("DIMACS written to: {}", path.display());
    }

    let mut session = Session::new(common.engine_config());
    let outcome = sudoku
        .solve_in(&mut session)
        .map_err(|e| format!("Error solving Sudoku: {e}"))?;

    report(&outcome, &session, common);
    if let Outcome::Solved(solution) = &outcome {
        if !solution.is_solution_of(sudoku.board()) {
            return Err("Sudoku solution failed verification".to_string());
        }
    }
    Ok(())
}

pub(crate) fn solve_queens(size: usize, common: &CommonOptions) -> Result<(), String> {
    let queens = Queens::new(size).map_err(|e| e.to_string())?;
    let mut session = Session::new(common.engine_config());
    let outcome = queens
        .solve_in(&mut session)
        .map_err(|e| format!("Error solving {size}-queens: {e}"))?;

    report(&outcome, &session, common);
    if let Outcome::Solved(placement) = &outcome {
        if !placement.is_valid() {
            return Err("Queen placement failed verification".to_string());
        }
    }
    Ok(())
}

fn report<T: Display>(outcome: &Outcome<T>, session: &Session, common: &CommonOptions) {
    if common.stats {
        let (allocated, resident) = memory_usage().unwrap_or_default();
        print_stats(session.stats(), allocated, resident);
    }

    match outcome {
        Outcome::Solved(solution) => println!("\nSATISFIABLE\n{solution}"),
        Outcome::Infeasible => println!("\nUNSATISFIABLE"),
        Outcome::Indeterminate(reason) => println!("\nUNKNOWN ({reason})"),
    }
}

/// Allocated and resident memory in MiB.
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

pub(crate) fn print_stats(s: &SolveStats, allocated: f64, resident: f64) {
    let elapsed = s.solve_time.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Integer variables", s.variables);
    stat_line("Constraints", s.constraints);
    stat_line("Encode time (s)", format!("{:.3}", s.encode_time.as_secs_f64()));
    stat_line("Boolean variables", s.bool_vars);
    stat_line("Clauses (original)", s.clauses);
    stat_line("Literals (original)", s.literals);

    println!("========================[ Search Statistics ]========================");
    stat_line("Learnt clauses", s.learnt_clauses);
    stat_line("Removed clauses", s.removed_clauses);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed);
    stat_line_with_rate("Decisions", s.decisions, elapsed);
    stat_line_with_rate("Propagations", s.propagations, elapsed);
    stat_line_with_rate("Restarts", s.restarts, elapsed);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed:.3}"));
    println!("=====================================================================");
}
