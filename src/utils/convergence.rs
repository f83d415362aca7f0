//! Convergence tracking & tolerance checks for the CG driver.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::traits::Real;
use crate::error::KError;

/// Stopping criteria & stats.
#[derive(Clone, Debug)]
pub struct Convergence<T> {
    /// Absolute tolerance on `||r||_2`.
    pub tol: T,
    pub max_iters: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    /// 0-based index of the converging iteration, or the iteration cap when
    /// the solve ran out of iterations.
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Real> Convergence<T> {
    /// Returns (should_stop, stats) given the residual norm after 0-based iteration `i`.
    pub fn check(&self, res_norm: T, i: usize) -> (bool, SolveStats<T>) {
        let converged = res_norm < self.tol;
        let exhausted = !converged && i + 1 >= self.max_iters;
        (
            converged || exhausted,
            SolveStats {
                iterations: if converged { i } else { i + 1 },
                final_residual: res_norm,
                converged,
            },
        )
    }
}

/// Residual norm after each iteration, in iteration order.
#[derive(Clone, Debug, Default)]
pub struct ConvergenceHistory<T> {
    residuals: Vec<T>,
}

impl<T: Real> ConvergenceHistory<T> {
    pub fn new() -> Self {
        Self { residuals: Vec::new() }
    }

    pub fn push(&mut self, residual: T) {
        self.residuals.push(residual);
    }

    pub fn residuals(&self) -> &[T] {
        &self.residuals
    }

    pub fn len(&self) -> usize {
        self.residuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residuals.is_empty()
    }

    /// One residual per line in scientific notation.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), KError> {
        for r in &self.residuals {
            writeln!(w, "{:e}", r)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Write the history to a text file, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), KError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_tolerance() {
        let conv = Convergence { tol: 1e-6, max_iters: 10 };
        let (stop, stats) = conv.check(5e-7, 3);
        assert!(stop && stats.converged);
        assert_eq!(stats.iterations, 3);
        let (stop, stats) = conv.check(1e-6, 3);
        assert!(!stop && !stats.converged);
    }

    #[test]
    fn cap_is_not_convergence() {
        let conv = Convergence { tol: 1e-12, max_iters: 4 };
        let (stop, stats) = conv.check(1.0, 3);
        assert!(stop);
        assert!(!stats.converged);
        assert_eq!(stats.iterations, 4);
    }

    #[test]
    fn history_text_format() {
        let mut h = ConvergenceHistory::new();
        h.push(0.5f64);
        h.push(1.25e-7);
        let mut buf = Vec::new();
        h.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "5e-1\n1.25e-7\n");
    }
}
