//! poisson-cg: Conjugate Gradient for the 2-D 5-point Poisson problem
//!
//! This crate solves `A x = b` for the shifted 5-point Laplacian on an N×N grid
//! with the Conjugate Gradient method. The operator comes in two interchangeable
//! representations: a sparse matrix assembled once from triples, and a
//! matrix-free stencil evaluated on every application. Operator application,
//! reductions and vector updates are data-parallel with rayon.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod grid;
pub mod matrix;
pub mod operator;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use self::core::*;
pub use error::*;
pub use grid::*;
pub use matrix::*;
pub use operator::*;
pub use solver::*;
pub use utils::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
