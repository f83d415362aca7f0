//! Named vectors of one CG solve and the manufactured source term.

use std::f64::consts::PI;

use crate::core::traits::Real;
use crate::error::KError;
use crate::grid::{Grid, GridField};
use crate::solver::residual::residual_norm;
use crate::operator::GridOperator;

/// `b[i, j] = sin(2π i / (n - 1)) · sin(2π j / (n - 1))` on the interior.
///
/// Fails for `n == 1`.
pub fn source_term<T: Real>(grid: Grid) -> Result<GridField<T>, KError> {
    let denom: T = grid.normalisation()?;
    let two_pi = T::from_f64(2.0 * PI)
        .ok_or_else(|| KError::Configuration("2π not representable".into()))?;
    let waves = (0..grid.n())
        .map(|k| T::from_usize(k).map(|k| (two_pi * (k / denom)).sin()))
        .collect::<Option<Vec<T>>>()
        .ok_or_else(|| KError::Configuration("grid index not representable".into()))?;
    Ok(GridField::from_interior_fn(grid, |i, j| waves[i] * waves[j]))
}

/// Right-hand side `b`, iterate `x`, residual `r`, direction `p`, and the
/// operator output scratch `ap` (holds `A p` while iterating and `A x` when
/// verifying).
#[derive(Clone, Debug)]
pub struct VectorStore<T> {
    pub b: GridField<T>,
    pub x: GridField<T>,
    pub r: GridField<T>,
    pub p: GridField<T>,
    pub ap: GridField<T>,
}

impl<T: Real> VectorStore<T> {
    /// `r := b`, `x := 0`, `p := 0`, `ap := 0`.
    pub fn new(b: GridField<T>) -> Self {
        let grid = *b.grid();
        Self {
            r: b.clone(),
            b,
            x: GridField::zeros(grid),
            p: GridField::zeros(grid),
            ap: GridField::zeros(grid),
        }
    }

    /// Store seeded with the sinusoidal [`source_term`].
    pub fn manufactured(grid: Grid) -> Result<Self, KError> {
        Ok(Self::new(source_term(grid)?))
    }

    pub fn grid(&self) -> &Grid {
        self.b.grid()
    }

    /// `||b - A x||_2`, recomputed from `x` alone; overwrites `ap`.
    pub fn check_solution<O: GridOperator<T>>(&mut self, op: &O) -> T {
        residual_norm(op, &self.b, &self.x, &mut self.ap)
    }
}
