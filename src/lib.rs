#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! This crate reduces combinatorial puzzles to Boolean satisfiability and decodes
//! the models found by an external SAT solver back into puzzle solutions.

/// The `sat` module holds the CNF building blocks, the DIMACS writer and the
/// gateway to the external solver process.
pub mod sat;

/// The `sudoku` module encodes 9x9 Sudoku grids as CNF and decodes models back
/// into filled grids.
pub mod sudoku;

/// The `coloring` module encodes graph 3-colouring as CNF and decodes models
/// back into per-vertex colour assignments.
pub mod coloring;
