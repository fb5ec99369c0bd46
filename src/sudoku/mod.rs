#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! This module provides functionality for solving Sudoku puzzles through a SAT reduction.

/// The `solver` module contains the board type, the CNF encoding and the model decoder.
pub mod solver;
