#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A writer for the DIMACS CNF (Conjunctive Normal Form) file format.
//!
//! DIMACS CNF is the plain-text interchange format most SAT solvers accept:
//! - A problem line `p cnf <num_variables> <num_clauses>`.
//! - One line per clause: space-separated nonzero integer literals terminated
//!   by a `0` sentinel.
//!
//! The output here is the byte-exact contract with the external solver: no
//! comment lines, no blank line before the header, a trailing newline after
//! the last clause. The header's variable count is the full size of the
//! encoding's variable space (not the largest literal that appears) and the
//! clause count always equals the number of clause lines emitted.

use crate::sat::cnf::Cnf;
use itertools::Itertools;
use std::io;
use std::path::Path;

/// Serializes a formula into DIMACS CNF text.
///
/// # Arguments
///
/// * `cnf`: The formula to serialize; its `num_vars` and clause count become
///   the header verbatim.
///
/// # Returns
///
/// The complete DIMACS document as a `String`.
#[must_use]
pub fn to_dimacs(cnf: &Cnf) -> String {
    // Rough per-line estimate to avoid repeated reallocation on the 12k-clause
    // Sudoku instances.
    let mut out = String::with_capacity(16 + cnf.len() * 12);
    out.push_str(&format!("p cnf {} {}\n", cnf.num_vars, cnf.len()));
    for clause in &cnf.clauses {
        out.push_str(&clause.iter().join(" "));
        out.push_str(" 0\n");
    }
    out
}

/// Serializes a formula and writes it to `path`.
///
/// This is the transient file handed to the solver process; nothing else is
/// ever persisted.
///
/// # Errors
///
/// Returns `io::Result::Err` if the file cannot be created or written.
pub fn write_file(cnf: &Cnf, path: &Path) -> io::Result<()> {
    std::fs::write(path, to_dimacs(cnf))
}
