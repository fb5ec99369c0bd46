#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Gateway to the external SAT solver process.
//!
//! The solver is a black box invoked with a single DIMACS file path. Its
//! stdout contract is fixed: line 0 is solver metadata (ignored), line 1 is
//! the verdict (`s SATISFIABLE` or `s UNSATISFIABLE`), and on a satisfiable
//! instance line 2 carries the model as a `v`-prefixed, space-separated list
//! of signed integers terminated by a trailing `0`.
//!
//! The gateway is a trait so the encoders can be exercised end-to-end with a
//! stub returning a fixed model, without ever launching a process.

use crate::sat::cnf::Model;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Terminal outcome of a solver run that completed normally.
///
/// Unsatisfiability is a legitimate answer, not an error: callers can tell
/// "no solution exists" apart from "could not determine".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The instance has a model, one signed entry per variable.
    Satisfiable(Model),
    /// The solver proved no model exists.
    Unsatisfiable,
}

/// Failure modes of the gateway itself.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// None of the candidate executables could be launched.
    #[error("no solver executable could be launched (tried {0:?})")]
    SolverUnavailable(Vec<PathBuf>),

    /// The process ran but its stdout did not match the verdict/model shape.
    #[error("solver output did not match the expected verdict/model shape")]
    MalformedOutput,

    /// The CNF file could not be written before the invocation.
    #[error("could not write the CNF file: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can decide a DIMACS file.
pub trait SatSolver {
    /// Runs the solver on the CNF file at `cnf_path`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when no verdict could be obtained; an
    /// unsatisfiable instance is a successful [`Verdict::Unsatisfiable`].
    fn solve(&self, cnf_path: &Path) -> Result<Verdict, GatewayError>;
}

/// Locations probed for the gophersat binary when none is given explicitly.
const DEFAULT_CANDIDATES: [&str; 3] = [
    "gophersat",
    "/usr/local/bin/gophersat",
    "/usr/bin/gophersat",
];

/// Invokes a gophersat process on the DIMACS file.
///
/// Candidate executable locations are tried in order; a location that fails
/// to launch falls through to the next one, and only when all are exhausted
/// does the solve fail as [`GatewayError::SolverUnavailable`].
#[derive(Debug, Clone)]
pub struct GophersatProcess {
    candidates: Vec<PathBuf>,
}

impl GophersatProcess {
    /// A gateway pinned to one explicit executable, skipping the probe list.
    #[must_use]
    pub fn with_executable(executable: PathBuf) -> Self {
        Self {
            candidates: vec![executable],
        }
    }
}

impl Default for GophersatProcess {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect(),
        }
    }
}

impl SatSolver for GophersatProcess {
    fn solve(&self, cnf_path: &Path) -> Result<Verdict, GatewayError> {
        for candidate in &self.candidates {
            let output = match Command::new(candidate).arg(cnf_path).output() {
                Ok(output) => output,
                Err(e) => {
                    debug!(candidate = %candidate.display(), error = %e, "could not launch solver");
                    continue;
                }
            };

            info!(candidate = %candidate.display(), file = %cnf_path.display(), "invoked solver");

            if !output.status.success() {
                warn!(candidate = %candidate.display(), status = %output.status, "solver exited abnormally");
                return Err(GatewayError::MalformedOutput);
            }

            let stdout = String::from_utf8_lossy(&output.stdout);
            return parse_output(&stdout);
        }
        Err(GatewayError::SolverUnavailable(self.candidates.clone()))
    }
}

/// Parses the solver's stdout into a verdict.
///
/// # Errors
///
/// Returns [`GatewayError::MalformedOutput`] when the verdict line is missing
/// or unrecognised, the model line lacks its `v ` prefix or `0` terminator,
/// or a literal fails to parse.
pub fn parse_output(stdout: &str) -> Result<Verdict, GatewayError> {
    let mut lines = stdout.lines();
    // Line 0 is solver metadata, e.g. "c solving <file>".
    lines.next().ok_or(GatewayError::MalformedOutput)?;
    let verdict = lines.next().ok_or(GatewayError::MalformedOutput)?;

    match verdict.trim_end() {
        "s SATISFIABLE" => {
            let model_line = lines.next().ok_or(GatewayError::MalformedOutput)?;
            parse_model_line(model_line).map(Verdict::Satisfiable)
        }
        "s UNSATISFIABLE" => Ok(Verdict::Unsatisfiable),
        other => {
            warn!(verdict = other, "unrecognised verdict line");
            Err(GatewayError::MalformedOutput)
        }
    }
}

fn parse_model_line(line: &str) -> Result<Model, GatewayError> {
    let values = line
        .strip_prefix("v ")
        .ok_or(GatewayError::MalformedOutput)?;

    let literals: Vec<i32> = values
        .split_whitespace()
        .map(|tok| tok.parse::<i32>().map_err(|_| GatewayError::MalformedOutput))
        .collect::<Result<_, _>>()?;

    match literals.split_last() {
        Some((&0, model)) => Ok(model.to_vec()),
        _ => Err(GatewayError::MalformedOutput),
    }
}
