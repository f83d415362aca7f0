//! Core traits and kernels shared by every operator and solver.

pub mod traits;
pub mod wrappers;

pub use traits::{InnerProduct, MatVec, Real};
pub use wrappers::{axpy, xmy, xpby};
