//! Command-line or API options for a Poisson solve.
//!
//! This module provides the `SolverOptions` struct, which collects every knob
//! of a solve: grid resolution, tolerance, spectral shift, operator
//! representation, floating-point precision and reporting. Options are
//! validated eagerly so that bad input fails before any assembly or
//! iteration work starts.

use std::fmt;
use std::str::FromStr;

use crate::error::KError;
use crate::operator::OperatorKind;

/// Floating-point precision of fields and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    Single,
    #[default]
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::Single => "f32",
            Precision::Double => "f64",
        })
    }
}

impl FromStr for Precision {
    type Err = KError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" | "f32" => Ok(Precision::Single),
            "double" | "f64" => Ok(Precision::Double),
            other => Err(KError::Configuration(format!("unknown precision '{}'", other))),
        }
    }
}

/// Solve parameters & reporting switches.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Grid resolution N (the system has N² unknowns)
    pub n: usize,

    /// Absolute tolerance on the residual norm
    pub eps: f64,

    /// Spectral shift added to the diagonal
    pub offset: f64,

    /// Suppress per-iteration progress output
    pub quiet: bool,

    pub precision: Precision,

    pub operator: OperatorKind,

    /// Iteration cap; `None` means N²
    pub max_iters: Option<usize>,

    /// Keep the residual of every iteration in the report
    pub record_history: bool,

    /// Worker threads for the data-parallel kernels; `None` uses every core
    pub threads: Option<usize>,

    /// Triplet budget for assembly; `None` means 5·N²
    pub max_triplets: Option<usize>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            n: 128,
            eps: 1e-6,
            offset: 0.0,
            quiet: false,
            precision: Precision::Double,
            operator: OperatorKind::Stencil,
            max_iters: None,
            record_history: false,
            threads: None,
            max_triplets: None,
        }
    }
}

impl SolverOptions {
    pub fn new(n: usize) -> Self {
        Self { n, ..Self::default() }
    }
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
    pub fn with_operator(mut self, operator: OperatorKind) -> Self {
        self.operator = operator;
        self
    }
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = Some(max_iters);
        self
    }
    pub fn with_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
    pub fn with_max_triplets(mut self, max_triplets: usize) -> Self {
        self.max_triplets = Some(max_triplets);
        self
    }

    /// Iteration cap in effect.
    pub fn iteration_cap(&self) -> usize {
        self.max_iters.unwrap_or(self.n * self.n)
    }

    pub fn validate(&self) -> Result<(), KError> {
        if self.n < 2 {
            return Err(KError::Configuration(format!(
                "grid size n must be at least 2, got {}",
                self.n
            )));
        }
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(KError::Configuration(format!(
                "tolerance eps must be positive and finite, got {:e}",
                self.eps
            )));
        }
        if !self.offset.is_finite() || self.offset < 0.0 {
            return Err(KError::Configuration(format!(
                "offset must be finite and non-negative, got {:e}",
                self.offset
            )));
        }
        if self.threads == Some(0) {
            return Err(KError::Configuration("thread count must be positive".into()));
        }
        Ok(())
    }
}
