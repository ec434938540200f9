//! # sat-puzzles
//!
//! Command-line front end for the puzzle encoders. Every puzzle is declared as
//! integer variables and linear or all-different constraints, compiled to CNF
//! with the order encoding, and decided by the CDCL solver.
//!
//! ```sh
//! sat-puzzles resources
//! sat-puzzles sudoku --givens "....94.3....51...7.89....4.......2.8.6.2.1.5.1.2.......7....52.9...65....4.97...."
//! sat-puzzles sudoku --blank --size 16 --stats
//! sat-puzzles sudoku --export-dimacs sudoku.cnf
//! sat-puzzles queens -n 12 --max-conflicts 10000
//! sat-puzzles completions zsh > _sat-puzzles
//! ```
//!
//! Common options: `--debug` raises logging to debug level (otherwise
//! `RUST_LOG` applies, defaulting to `warn`), `--stats` prints the problem and
//! search statistics, `--max-conflicts` and `--timeout-ms` bound the search,
//! and `--seed` seeds the phase noise.

use clap::{CommandFactory, Parser};
use command_line::cli::{Cli, Commands, solve_queens, solve_resources, solve_sudoku};

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also backs the memory
/// figures in the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.command.common().is_some_and(|c| c.debug));

    let result = match &cli.command {
        Commands::Resources { common } => solve_resources(common),
        Commands::Sudoku {
            givens,
            blank,
            size,
            export_dimacs,
            common,
        } => solve_sudoku(
            givens.as_deref(),
            *blank,
            *size,
            export_dimacs.as_ref(),
            common,
        ),
        Commands::Queens { size, common } => solve_queens(*size, common),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
