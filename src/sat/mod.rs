#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod cnf;
pub mod dimacs;
pub mod gateway;
