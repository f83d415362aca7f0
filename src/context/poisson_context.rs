//! Factory for complete Poisson solves.
//!
//! This module provides the `PoissonContext` struct, which turns a set of
//! [`SolverOptions`] into a finished solve: it validates the options, sizes
//! the thread pool, builds the requested operator representation on a grid of
//! the matching layout, seeds a [`VectorStore`] with the manufactured source
//! term, runs CG and finally verifies the solution with an independent
//! residual computation.
//!
//! # Usage
//!
//! 1. Construct a `PoissonContext` from `SolverOptions`.
//! 2. Call `solve` for a precision-erased [`SolveReport`], or `run::<T>` to
//!    keep the typed vector store.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{Precision, SolverOptions};
use crate::core::traits::Real;
use crate::error::KError;
use crate::grid::Grid;
use crate::operator::{AssembledOperator, GridOperator, OperatorKind, PoissonOperator, StencilOperator};
use crate::parallel;
use crate::solver::{CgSolver, VectorStore};
use crate::utils::convergence::{ConvergenceHistory, SolveStats};

/// Outcome of a typed solve: the store holds `b`, the solution `x` and the
/// final recurrence residual `r`.
#[derive(Debug)]
pub struct PoissonSolution<T> {
    pub stats: SolveStats<T>,
    pub store: VectorStore<T>,
    /// `||b - A x||_2` recomputed after the solve.
    pub verified_residual: T,
    pub history: Option<ConvergenceHistory<T>>,
    /// Workers the kernels ran on.
    pub threads: usize,
}

/// Precision-erased completion report.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub operator: OperatorKind,
    pub precision: Precision,
    pub n: usize,
    pub converged: bool,
    pub iterations: usize,
    pub final_residual: f64,
    pub verified_residual: f64,
    pub elapsed: Duration,
    pub threads: usize,
    pub history: Option<ConvergenceHistory<f64>>,
}

/// Context and configuration for one Poisson problem.
#[derive(Debug, Clone)]
pub struct PoissonContext {
    pub options: SolverOptions,
}

impl PoissonContext {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// Build the configured operator. Fails on invalid options or an
    /// insufficient triplet budget.
    pub fn build_operator<T: Real>(&self) -> Result<PoissonOperator<T>, KError> {
        let opts = &self.options;
        let offset = T::from_f64(opts.offset)
            .ok_or_else(|| KError::Configuration(format!("offset {} not representable", opts.offset)))?;
        let grid = Grid::new(opts.n, opts.operator.ghost_width())?;
        Ok(match opts.operator {
            OperatorKind::Assembled => {
                let op = match opts.max_triplets {
                    Some(cap) => AssembledOperator::with_capacity(grid, offset, cap)?,
                    None => AssembledOperator::build(grid, offset)?,
                };
                PoissonOperator::Assembled(op)
            }
            OperatorKind::Stencil => PoissonOperator::Stencil(StencilOperator::new(grid, offset)?),
        })
    }

    /// Solve in precision `T`, ignoring `options.precision`.
    ///
    /// The solve runs on a thread pool owned by this call, sized by
    /// `options.threads`.
    pub fn run<T: Real>(&self) -> Result<PoissonSolution<T>, KError> {
        self.options.validate()?;
        parallel::with_threads(self.options.threads, || self.run_in_pool::<T>())?
    }

    fn run_in_pool<T: Real>(&self) -> Result<PoissonSolution<T>, KError> {
        let opts = &self.options;
        let eps = T::from_f64(opts.eps)
            .ok_or_else(|| KError::Configuration(format!("eps {} not representable", opts.eps)))?;

        let op = self.build_operator::<T>()?;
        let mut store = VectorStore::manufactured(*op.grid())?;
        let threads = parallel::num_threads();
        debug!(
            n = opts.n,
            operator = %opts.operator,
            precision = %opts.precision,
            threads,
            "starting Poisson solve"
        );

        let mut solver = CgSolver::new(eps, opts.iteration_cap())
            .with_quiet(opts.quiet)
            .with_history(opts.record_history);
        let stats = solver.solve_store(&op, &mut store)?;
        let verified_residual = store.check_solution(&op);
        let history = opts.record_history.then_some(solver.residual_history);
        Ok(PoissonSolution { stats, store, verified_residual, history, threads })
    }

    /// Solve in the configured precision and report in `f64`.
    pub fn solve(&self) -> Result<SolveReport, KError> {
        let start = Instant::now();
        let report = match self.options.precision {
            Precision::Single => self.report(self.run::<f32>()?, start),
            Precision::Double => self.report(self.run::<f64>()?, start),
        };
        info!(
            converged = report.converged,
            iterations = report.iterations,
            residual = report.final_residual,
            verified = report.verified_residual,
            "Poisson solve finished in {:.2?}",
            report.elapsed
        );
        Ok(report)
    }

    fn report<T: Real>(&self, sol: PoissonSolution<T>, start: Instant) -> SolveReport {
        let widen = |v: T| v.to_f64().unwrap_or(f64::NAN);
        let history = sol.history.map(|h| {
            let mut wide = ConvergenceHistory::new();
            for r in h.residuals() {
                wide.push(widen(*r));
            }
            wide
        });
        SolveReport {
            operator: self.options.operator,
            precision: self.options.precision,
            n: self.options.n,
            converged: sol.stats.converged,
            iterations: sol.stats.iterations,
            final_residual: widen(sol.stats.final_residual),
            verified_residual: widen(sol.verified_residual),
            elapsed: start.elapsed(),
            threads: sol.threads,
            history,
        }
    }
}
