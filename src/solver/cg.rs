//! Conjugate Gradient (unpreconditioned) per Saad §6.1.
//!
//! ```text
//! r = b, x = 0, p = r
//! for i in 0..max_iters:
//!     Ap    = A p
//!     alpha = rTr / (p . Ap)
//!     x    += alpha p
//!     r    -= alpha Ap
//!     if ||r|| < tol: converged at i
//!     beta  = rTr_new / rTr
//!     p     = r + beta p
//! ```
//!
//! [`CgIteration`] runs the recurrence one step at a time over a caller-owned
//! [`VectorStore`], so the state can be inspected (and the solve abandoned)
//! between iterations. [`CgSolver`] drives it to completion.

use tracing::{debug, info, trace, warn};

use crate::core::traits::{InnerProduct, Real};
use crate::core::wrappers::{axpy, xpby};
use crate::error::KError;
use crate::grid::GridField;
use crate::operator::GridOperator;
use crate::solver::LinearSolver;
use crate::solver::store::VectorStore;
use crate::utils::convergence::{Convergence, ConvergenceHistory, SolveStats};

/// Lifecycle of one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgState {
    Initialized,
    Iterating,
    Converged,
    ExhaustedIterations,
}

impl CgState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CgState::Converged | CgState::ExhaustedIterations)
    }
}

/// Fails unless `value` is a finite, non-zero, normal number.
fn nondegenerate<T: Real>(iteration: usize, quantity: &'static str, value: T) -> Result<T, KError> {
    if value.is_finite() && value.abs() >= T::min_positive_value() {
        return Ok(value);
    }
    let value = value.to_f64().unwrap_or(f64::NAN);
    warn!(iteration, quantity, value, "CG: degenerate search direction");
    Err(KError::DegenerateDirection { iteration, quantity, value })
}

/// In-progress CG solve over an operator and a vector store.
pub struct CgIteration<'a, T: Real, O: GridOperator<T>> {
    op: &'a O,
    store: &'a mut VectorStore<T>,
    conv: Convergence<T>,
    state: CgState,
    iteration: usize,
    initial_rtr: T,
    old_rtr: T,
    residual: T,
    stats: Option<SolveStats<T>>,
    quiet: bool,
    history: Option<ConvergenceHistory<T>>,
}

impl<'a, T: Real, O: GridOperator<T>> CgIteration<'a, T, O> {
    /// Seed the recurrence from the store: `old_rTr := r . r` and `p := r`.
    ///
    /// Fails if the store and the operator live on different grids or the
    /// tolerance is not a positive finite number.
    pub fn new(op: &'a O, store: &'a mut VectorStore<T>, conv: Convergence<T>) -> Result<Self, KError> {
        if store.grid() != op.grid() {
            return Err(KError::Configuration(format!(
                "vector store grid {:?} does not match operator grid {:?}",
                store.grid(),
                op.grid()
            )));
        }
        if !conv.tol.is_finite() || conv.tol <= T::zero() {
            return Err(KError::Configuration(format!(
                "tolerance must be positive and finite, got {:e}",
                conv.tol
            )));
        }
        let ip = ();
        let initial_rtr = ip.dot(&store.r, &store.r);
        // p = r + beta * p with beta = 0
        store.p.clone_from(&store.r);
        debug!(
            "CG: n={}, kind={}, tol={:.2e}, max_iter={}",
            op.grid().n(),
            op.kind(),
            conv.tol,
            conv.max_iters,
        );
        Ok(Self {
            op,
            store,
            conv,
            state: CgState::Initialized,
            iteration: 0,
            initial_rtr,
            old_rtr: initial_rtr,
            residual: initial_rtr.sqrt(),
            stats: None,
            quiet: false,
            history: None,
        })
    }

    /// Suppress per-iteration progress at `info` level (it still goes to `trace`).
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Record the residual norm of every iteration.
    pub fn record_history(mut self, record: bool) -> Self {
        self.history = if record { Some(ConvergenceHistory::new()) } else { None };
        self
    }

    pub fn state(&self) -> CgState {
        self.state
    }

    /// Iterations performed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn initial_residual(&self) -> T {
        self.initial_rtr.sqrt()
    }

    /// `sqrt(rTr)` as tracked by the recurrence.
    pub fn residual(&self) -> T {
        self.residual
    }

    /// Final stats once the state is terminal.
    pub fn stats(&self) -> Option<&SolveStats<T>> {
        self.stats.as_ref()
    }

    pub fn store(&self) -> &VectorStore<T> {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut VectorStore<T> {
        &mut *self.store
    }

    pub fn take_history(&mut self) -> Option<ConvergenceHistory<T>> {
        self.history.take()
    }

    fn finish(&mut self, state: CgState, stats: SolveStats<T>) -> CgState {
        match state {
            CgState::Converged => info!(
                "CG converged: iterations={}, residual={:e}",
                stats.iterations, stats.final_residual
            ),
            _ => warn!(
                "CG did not converge within {} iterations: residual={:e}",
                stats.iterations, stats.final_residual
            ),
        }
        self.state = state;
        self.stats = Some(stats);
        state
    }

    /// Perform one iteration. Terminal states are returned unchanged.
    pub fn step(&mut self) -> Result<CgState, KError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        if self.iteration >= self.conv.max_iters {
            let stats = SolveStats {
                iterations: self.iteration,
                final_residual: self.residual,
                converged: false,
            };
            return Ok(self.finish(CgState::ExhaustedIterations, stats));
        }
        if self.state == CgState::Initialized && !self.quiet {
            info!("Initial residual = {:e}", self.initial_residual());
        }
        self.state = CgState::Iterating;

        let i = self.iteration;
        let ip = ();
        let store = &mut *self.store;

        self.op.matvec(&store.p, &mut store.ap);
        let pap = nondegenerate(i, "pAp", ip.dot(&store.p, &store.ap))?;
        let alpha = nondegenerate(i, "alpha", self.old_rtr / pap)?;

        axpy(alpha, store.p.as_slice(), store.x.as_mut_slice());
        axpy(-alpha, store.ap.as_slice(), store.r.as_mut_slice());

        let new_rtr = ip.dot(&store.r, &store.r);
        self.residual = new_rtr.sqrt();
        self.iteration = i + 1;
        if let Some(h) = self.history.as_mut() {
            h.push(self.residual);
        }

        let (stop, stats) = self.conv.check(self.residual, i);
        if stop {
            let state = if stats.converged { CgState::Converged } else { CgState::ExhaustedIterations };
            return Ok(self.finish(state, stats));
        }

        let old_rtr = nondegenerate(i, "old_rTr", self.old_rtr)?;
        let beta = nondegenerate(i, "beta", new_rtr / old_rtr)?;
        xpby(store.r.as_slice(), beta, store.p.as_mut_slice());
        self.old_rtr = new_rtr;

        if self.quiet {
            trace!("Iter = {:4}, Residual = {:e}", i + 1, self.residual);
        } else {
            info!("Iter = {:4}, Residual = {:e}", i + 1, self.residual);
        }
        Ok(CgState::Iterating)
    }

    /// Iterate until converged or out of iterations.
    pub fn run(&mut self) -> Result<SolveStats<T>, KError> {
        while !self.step()?.is_terminal() {}
        self.stats
            .clone()
            .ok_or_else(|| KError::Configuration("CG stopped without final stats".into()))
    }
}

/// CG driver configuration; implements [`LinearSolver`] for any [`GridOperator`].
pub struct CgSolver<T> {
    pub conv: Convergence<T>,
    pub quiet: bool,
    pub record_history: bool,
    pub residual_history: ConvergenceHistory<T>,
}

impl<T: Real> CgSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self {
            conv: Convergence { tol, max_iters },
            quiet: false,
            record_history: false,
            residual_history: ConvergenceHistory::new(),
        }
    }
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
    pub fn with_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    /// Solve over a prepared store; the solution is left in `store.x`.
    pub fn solve_store<O: GridOperator<T>>(
        &mut self,
        op: &O,
        store: &mut VectorStore<T>,
    ) -> Result<SolveStats<T>, KError> {
        let mut it = CgIteration::new(op, store, self.conv.clone())?
            .quiet(self.quiet)
            .record_history(self.record_history);
        let result = it.run();
        if let Some(h) = it.take_history() {
            self.residual_history = h;
        }
        result
    }
}

impl<O, T> LinearSolver<O, GridField<T>> for CgSolver<T>
where
    O: GridOperator<T>,
    T: Real,
{
    type Error = KError;
    type Scalar = T;

    /// Solves from a zero initial guess; the incoming `x` is overwritten.
    fn solve(&mut self, a: &O, b: &GridField<T>, x: &mut GridField<T>) -> Result<SolveStats<T>, KError> {
        if x.grid() != a.grid() {
            return Err(KError::Configuration("solution field is on a different grid".into()));
        }
        let mut store = VectorStore::new(b.clone());
        let stats = self.solve_store(a, &mut store)?;
        *x = store.x;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::operator::{AssembledOperator, StencilOperator};

    #[test]
    fn converges_on_four_by_four() {
        let grid = Grid::padded(4).unwrap();
        let op = StencilOperator::new(grid, 0.0f64).unwrap();
        let mut store = VectorStore::manufactured(grid).unwrap();
        let mut solver = CgSolver::new(1e-6, 16).with_quiet(true);
        let stats = solver.solve_store(&op, &mut store).unwrap();
        assert!(stats.converged, "CG did not converge");
        assert!(stats.iterations < 16);
        assert!(stats.final_residual < 1e-6);
        assert!(store.check_solution(&op) < 1e-6);
    }

    #[test]
    fn step_exposes_state() {
        let grid = Grid::unpadded(6).unwrap();
        let op = AssembledOperator::build(grid, 0.0f64).unwrap();
        let mut store = VectorStore::manufactured(grid).unwrap();
        let conv = Convergence { tol: 1e-8, max_iters: 36 };
        let mut it = CgIteration::new(&op, &mut store, conv).unwrap().quiet(true);
        assert_eq!(it.state(), CgState::Initialized);
        assert_eq!(it.step().unwrap(), CgState::Iterating);
        assert_eq!(it.iteration(), 1);
        assert!(it.residual() < it.initial_residual());
        let stats = it.run().unwrap();
        assert_eq!(it.state(), CgState::Converged);
        // a terminal state is sticky
        assert_eq!(it.step().unwrap(), CgState::Converged);
        assert_eq!(it.stats(), Some(&stats));
    }

    #[test]
    fn cap_reports_non_convergence() {
        let grid = Grid::padded(8).unwrap();
        let op = StencilOperator::new(grid, 0.0f64).unwrap();
        let mut store = VectorStore::manufactured(grid).unwrap();
        let mut solver = CgSolver::new(1e-14, 2).with_quiet(true);
        let stats = solver.solve_store(&op, &mut store).unwrap();
        assert!(!stats.converged);
        assert_eq!(stats.iterations, 2);
        assert!(stats.final_residual > 0.0);
    }

    #[test]
    fn zeroed_direction_is_degenerate() {
        let grid = Grid::padded(4).unwrap();
        let op = StencilOperator::new(grid, 0.0f64).unwrap();
        let mut store = VectorStore::manufactured(grid).unwrap();
        let conv = Convergence { tol: 1e-6, max_iters: 16 };
        let mut it = CgIteration::new(&op, &mut store, conv).unwrap();
        it.store_mut().p.as_mut_slice().fill(0.0);
        match it.step() {
            Err(KError::DegenerateDirection { iteration, quantity, value }) => {
                assert_eq!(iteration, 0);
                assert_eq!(quantity, "pAp");
                assert_eq!(value, 0.0);
            }
            other => panic!("expected degenerate direction, got {:?}", other),
        }
        assert!(it.store().x.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rejects_bad_tolerance_and_mismatched_grids() {
        let grid = Grid::padded(4).unwrap();
        let op = StencilOperator::new(grid, 0.0f64).unwrap();
        let mut store = VectorStore::manufactured(grid).unwrap();
        let bad = Convergence { tol: -1.0, max_iters: 4 };
        assert!(matches!(CgIteration::new(&op, &mut store, bad), Err(KError::Configuration(_))));

        let mut other = VectorStore::manufactured(Grid::unpadded(4).unwrap()).unwrap();
        let conv = Convergence { tol: 1e-6, max_iters: 4 };
        assert!(matches!(CgIteration::new(&op, &mut other, conv), Err(KError::Configuration(_))));
    }

    #[test]
    fn history_has_one_entry_per_iteration() {
        let grid = Grid::padded(5).unwrap();
        let op = StencilOperator::new(grid, 0.0f64).unwrap();
        let b = crate::solver::store::source_term(grid).unwrap();
        let mut x = op.new_field();
        let mut solver = CgSolver::new(1e-8, 25).with_quiet(true).with_history(true);
        let stats = solver.solve(&op, &b, &mut x).unwrap();
        assert!(stats.converged);
        assert_eq!(solver.residual_history.len(), stats.iterations + 1);
        assert_eq!(solver.residual_history.residuals().last(), Some(&stats.final_residual));
    }
}
