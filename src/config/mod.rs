//! Solve configuration.

pub mod options;
pub use options::{Precision, SolverOptions};
pub use crate::operator::OperatorKind;
