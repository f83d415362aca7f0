//! The discrete Poisson operator `A = (4 + offset) I - (sum of axis neighbours)`.
//!
//! Two interchangeable representations implement [`GridOperator`]:
//!
//! - [`AssembledOperator`]: the matrix is assembled once from triples into CSR and
//!   applied with a sparse mat-vec. Boundary rows simply omit missing neighbours.
//! - [`StencilOperator`]: the 5-point formula is evaluated on every call and no
//!   matrix is ever stored. Missing neighbours read as zero.
//!
//! The CG driver is generic over [`GridOperator`], so it runs unchanged on
//! either one, or on [`PoissonOperator`] when the choice is made at runtime.

pub mod assembled;
pub mod stencil;

pub use assembled::AssembledOperator;
pub use stencil::StencilOperator;

use std::fmt;
use std::str::FromStr;

use crate::core::traits::{MatVec, Real};
use crate::error::KError;
use crate::grid::{Grid, GridField};

/// A fixed SPD operator acting on fields of one grid.
pub trait GridOperator<T: Real>: MatVec<GridField<T>> + Send + Sync {
    /// Layout of the fields this operator reads and writes.
    fn grid(&self) -> &Grid;
    /// Spectral shift added to the diagonal.
    fn offset(&self) -> T;
    fn kind(&self) -> OperatorKind;

    /// Allocating form of [`MatVec::matvec`].
    fn apply(&self, v: &GridField<T>) -> GridField<T> {
        let mut out = GridField::zeros(*self.grid());
        self.matvec(v, &mut out);
        out
    }

    /// A zero field on this operator's grid.
    fn new_field(&self) -> GridField<T> {
        GridField::zeros(*self.grid())
    }
}

/// Which representation of the operator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorKind {
    /// Sparse matrix assembled from triples.
    Assembled,
    /// Matrix-free 5-point stencil over a ghost-padded grid.
    #[default]
    Stencil,
}

impl OperatorKind {
    /// Ghost border width of the grid this representation works on.
    pub fn ghost_width(self) -> usize {
        match self {
            OperatorKind::Assembled => 0,
            OperatorKind::Stencil => 1,
        }
    }

    /// Construct the operator for an `n`×`n` grid.
    pub fn build<T: Real>(self, n: usize, offset: T) -> Result<PoissonOperator<T>, KError> {
        let grid = Grid::new(n, self.ghost_width())?;
        Ok(match self {
            OperatorKind::Assembled => PoissonOperator::Assembled(AssembledOperator::build(grid, offset)?),
            OperatorKind::Stencil => PoissonOperator::Stencil(StencilOperator::new(grid, offset)?),
        })
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperatorKind::Assembled => "assembled",
            OperatorKind::Stencil => "stencil",
        })
    }
}

impl FromStr for OperatorKind {
    type Err = KError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "assembled" | "sparse" | "matrix" => Ok(OperatorKind::Assembled),
            "stencil" | "matrix-free" | "matfree" => Ok(OperatorKind::Stencil),
            other => Err(KError::Configuration(format!("unknown operator kind '{}'", other))),
        }
    }
}

/// Runtime choice between the two representations.
#[derive(Debug, Clone)]
pub enum PoissonOperator<T> {
    Assembled(AssembledOperator<T>),
    Stencil(StencilOperator<T>),
}

impl<T: Real> MatVec<GridField<T>> for PoissonOperator<T> {
    fn matvec(&self, x: &GridField<T>, y: &mut GridField<T>) {
        match self {
            PoissonOperator::Assembled(op) => op.matvec(x, y),
            PoissonOperator::Stencil(op) => op.matvec(x, y),
        }
    }
}

impl<T: Real> GridOperator<T> for PoissonOperator<T> {
    fn grid(&self) -> &Grid {
        match self {
            PoissonOperator::Assembled(op) => op.grid(),
            PoissonOperator::Stencil(op) => op.grid(),
        }
    }
    fn offset(&self) -> T {
        match self {
            PoissonOperator::Assembled(op) => op.offset(),
            PoissonOperator::Stencil(op) => op.offset(),
        }
    }
    fn kind(&self) -> OperatorKind {
        match self {
            PoissonOperator::Assembled(_) => OperatorKind::Assembled,
            PoissonOperator::Stencil(_) => OperatorKind::Stencil,
        }
    }
}

/// Diagonal `4 + offset`, rejecting negative or non-finite shifts.
pub(crate) fn diagonal<T: Real>(offset: T) -> Result<T, KError> {
    if !offset.is_finite() || offset < T::zero() {
        return Err(KError::Configuration(format!(
            "offset must be finite and non-negative, got {:e}",
            offset
        )));
    }
    T::from_f64(4.0)
        .map(|four| four + offset)
        .ok_or_else(|| KError::Configuration("diagonal not representable".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing() {
        assert_eq!("Assembled".parse::<OperatorKind>().unwrap(), OperatorKind::Assembled);
        assert_eq!("stencil".parse::<OperatorKind>().unwrap(), OperatorKind::Stencil);
        assert!("dense".parse::<OperatorKind>().is_err());
        assert_eq!(OperatorKind::default().to_string(), "stencil");
    }

    #[test]
    fn runtime_choice_uses_matching_layout() {
        let a = OperatorKind::Assembled.build(5, 0.0f64).unwrap();
        let s = OperatorKind::Stencil.build(5, 0.0f64).unwrap();
        assert_eq!(a.grid().n_ext(), 0);
        assert_eq!(s.grid().n_ext(), 1);
        assert_eq!(a.kind(), OperatorKind::Assembled);
        assert_eq!(s.kind(), OperatorKind::Stencil);
    }

    #[test]
    fn negative_offset_is_rejected() {
        assert!(matches!(diagonal(-0.5f64), Err(KError::Configuration(_))));
        assert!(matches!(diagonal(f64::NAN), Err(KError::Configuration(_))));
        assert_eq!(diagonal(1.5f64).unwrap(), 5.5);
    }
}
