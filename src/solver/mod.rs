//! CG driver, vector store and residual verification.

use crate::utils::convergence::SolveStats;

/// Common interface for linear solvers.
pub trait LinearSolver<M, V> {
    type Error;
    /// Solve A·x = b, writing result into `x`.
    /// Returns iteration stats (including convergence info).
    fn solve(
        &mut self,
        a: &M,
        b: &V,
        x: &mut V
    ) -> Result<SolveStats<<Self as LinearSolver<M, V>>::Scalar>, Self::Error>;
    type Scalar: Copy + PartialOrd;
}

pub mod cg;
pub use cg::{CgIteration, CgSolver, CgState};

pub mod residual;
pub use residual::residual_norm;

pub mod store;
pub use store::{VectorStore, source_term};
