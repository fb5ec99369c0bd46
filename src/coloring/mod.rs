#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! This module provides functionality for 3-colouring graphs through a SAT reduction.

/// The `solver` module contains the graph type, the CNF encoding and the model decoder.
pub mod solver;
