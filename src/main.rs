//! # sat-encoder
//!
//! `sat-encoder` is a command-line front end for two SAT reductions: classic
//! 9x9 Sudoku and graph 3-colouring. A puzzle instance is encoded as a DIMACS
//! CNF file, handed to an external gophersat process, and the returned model
//! is decoded back into the puzzle's native representation.
//!
//! ## Subcommands
//!
//! 1.  **`sudoku`**: Solve a Sudoku grid.
//!     ```sh
//!     sat-encoder sudoku [--path <grid_file>] [OPTIONS]
//!     ```
//!     Without `--path` the bundled reference grid is used (it contains a
//!     deliberate conflict and reports "no solution").
//!
//! 2.  **`coloring`**: 3-colour the Petersen graph.
//!     ```sh
//!     sat-encoder coloring [OPTIONS]
//!     ```
//!
//! ## Common options
//!
//! -   `-s, --solver <PATH>`: explicit solver executable; the usual gophersat
//!     locations are probed when omitted.
//! -   `--cnf-path <PATH>`: where the generated DIMACS file is written.
//! -   `-p, --print-dimacs`: print the generated DIMACS document.
//! -   `--verify`: re-check the returned model against the clause base.
//!
//! Unsatisfiability is reported as a normal outcome; solver launch failures
//! and malformed solver output exit nonzero with a human-readable message.

use clap::{Args, Parser, Subcommand};
use sat_encoder::coloring::solver::Graph;
use sat_encoder::sat::cnf::Cnf;
use sat_encoder::sat::dimacs;
use sat_encoder::sat::gateway::{GophersatProcess, SatSolver, Verdict};
use sat_encoder::sudoku::solver::{Board, EXAMPLE_CONFLICT};
use std::path::PathBuf;
use std::process::ExitCode;

/// Defines the command-line interface, parsed with `clap`.
#[derive(Parser, Debug)]
#[command(
    name = "sat-encoder",
    version,
    about = "Reduces Sudoku and graph colouring to DIMACS CNF for an external SAT solver"
)]
struct Cli {
    /// Specifies the subcommand to execute.
    #[clap(subcommand)]
    command: Commands,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve a Sudoku grid through the SAT reduction.
    Sudoku {
        /// Path to a grid file: nine lines of nine symbols, `1`-`9` for
        /// givens and `0`, `.` or `_` for empty cells. The bundled reference
        /// grid is used when omitted.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// 3-colour the Petersen graph through the SAT reduction.
    Coloring {
        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },
}

/// Defines common command-line options shared across subcommands.
#[derive(Args, Debug, Default)]
struct CommonOptions {
    /// Explicit solver executable to run on the DIMACS file. When omitted,
    /// the usual gophersat install locations are probed in order.
    #[arg(short, long)]
    solver: Option<PathBuf>,

    /// Where to write the generated DIMACS file.
    #[arg(long)]
    cnf_path: Option<PathBuf>,

    /// Print the generated DIMACS document before solving.
    #[arg(short, long, default_value_t = false)]
    print_dimacs: bool,

    /// Re-check the returned model against the generated clause base.
    #[arg(long, default_value_t = false)]
    verify: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sudoku { path, common } => run_sudoku(path, &common),
        Commands::Coloring { common } => run_coloring(&common),
    }
}

/// Builds the solver gateway, pinned to an explicit executable when given.
fn gateway_for(common: &CommonOptions) -> GophersatProcess {
    common
        .solver
        .clone()
        .map_or_else(GophersatProcess::default, GophersatProcess::with_executable)
}

/// Writes the CNF file and obtains a verdict, printing the attempted
/// invocation along the way.
fn write_and_solve(
    cnf: &Cnf,
    common: &CommonOptions,
    default_cnf_name: &str,
) -> Result<Verdict, ExitCode> {
    let cnf_path = common
        .cnf_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_cnf_name));

    if common.print_dimacs {
        print!("{}", dimacs::to_dimacs(cnf));
    }

    if let Err(e) = dimacs::write_file(cnf, &cnf_path) {
        eprintln!("could not write {}: {e}", cnf_path.display());
        return Err(ExitCode::FAILURE);
    }

    println!("Running solver on: {}", cnf_path.display());

    let verdict = match gateway_for(common).solve(&cnf_path) {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("could not solve: {e}");
            return Err(ExitCode::FAILURE);
        }
    };

    if common.verify {
        if let Verdict::Satisfiable(model) = &verdict {
            if cnf.is_satisfied_by(model) {
                println!("Verified: model satisfies the clause base");
            } else {
                eprintln!("solver returned a model that does not satisfy the encoding");
                return Err(ExitCode::FAILURE);
            }
        }
    }

    Ok(verdict)
}

fn run_sudoku(path: Option<PathBuf>, common: &CommonOptions) -> ExitCode {
    let board = match path {
        Some(path) => {
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("could not read {}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            };
            match text.parse::<Board>() {
                Ok(board) => board,
                Err(e) => {
                    eprintln!("could not parse grid {}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            }
        }
        None => Board::new(EXAMPLE_CONFLICT),
    };

    println!("Input grid:\n{board}");

    let verdict = match write_and_solve(&board.to_cnf(), common, "sudoku.cnf") {
        Ok(verdict) => verdict,
        Err(code) => return code,
    };

    match verdict {
        Verdict::Satisfiable(model) => {
            println!("Solved grid:\n{}", Board::decode_model(&model));
        }
        Verdict::Unsatisfiable => println!("This grid has no solution."),
    }
    ExitCode::SUCCESS
}

fn run_coloring(common: &CommonOptions) -> ExitCode {
    let graph = Graph::petersen();
    println!(
        "Colouring the Petersen graph ({} vertices, {} edges) with 3 colours",
        graph.num_vertices(),
        graph.edges().len()
    );

    let verdict = match write_and_solve(&graph.to_cnf(), common, "graph.cnf") {
        Ok(verdict) => verdict,
        Err(code) => return code,
    };

    match verdict {
        Verdict::Satisfiable(model) => {
            for (vertex, color) in graph.decode_model(&model).iter().enumerate() {
                println!("vertex {vertex}: {color}");
            }
        }
        Verdict::Unsatisfiable => println!("This graph has no proper 3-colouring."),
    }
    ExitCode::SUCCESS
}
