//! Context module for poisson-cg.
//!
//! This module provides the context/factory type that turns solve options into
//! an operator, a vector store and a finished CG run.
//!
//! Modules:
//! - [`poisson_context`]: Contains the `PoissonContext` struct and the `SolveReport` it produces.
//!
//! # Example
//! ```rust,no_run
//! use poisson_cg::{PoissonContext, SolverOptions};
//! let report = PoissonContext::new(SolverOptions::new(64)).solve().unwrap();
//! assert!(report.converged);
//! ```

pub mod poisson_context;
pub use poisson_context::{PoissonContext, PoissonSolution, SolveReport};
