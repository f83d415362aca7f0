//! Matrix-free representation: the 5-point stencil evaluated per call.

use crate::core::traits::{MatVec, Real};
use crate::error::KError;
use crate::grid::{Grid, GridField};
use crate::operator::{GridOperator, OperatorKind, diagonal};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Stateless stencil operator; only the grid and the diagonal are stored.
#[derive(Debug, Clone)]
pub struct StencilOperator<T> {
    grid: Grid,
    offset: T,
    diag: T,
}

impl<T: Real> StencilOperator<T> {
    pub fn new(grid: Grid, offset: T) -> Result<Self, KError> {
        let diag = diagonal(offset)?;
        Ok(Self { grid, offset, diag })
    }

    /// One storage row of `y = A v`. Ghost rows and columns are written as zero.
    fn apply_row(&self, v: &[T], si: usize, out: &mut [T]) {
        let n = self.grid.n();
        let e = self.grid.n_ext();
        let n_tot = self.grid.n_tot();
        if si < e || si >= e + n {
            out.fill(T::zero());
            return;
        }
        let i = si - e;
        for (sj, o) in out.iter_mut().enumerate() {
            if sj < e || sj >= e + n {
                *o = T::zero();
                continue;
            }
            let idx = si * n_tot + sj;
            let (north, south, west, east) = if e > 0 {
                // Ghost cells hold zero, so border points read them directly.
                (v[idx - n_tot], v[idx + n_tot], v[idx - 1], v[idx + 1])
            } else {
                let j = sj;
                let zero = T::zero();
                (
                    if i > 0 { v[idx - n_tot] } else { zero },
                    if i + 1 < n { v[idx + n_tot] } else { zero },
                    if j > 0 { v[idx - 1] } else { zero },
                    if j + 1 < n { v[idx + 1] } else { zero },
                )
            };
            // Terms follow the column order of an assembled CSR row so both
            // representations round identically.
            *o = -north - west + self.diag * v[idx] - east - south;
        }
    }
}

impl<T: Real> MatVec<GridField<T>> for StencilOperator<T> {
    fn matvec(&self, x: &GridField<T>, y: &mut GridField<T>) {
        assert_eq!(x.grid(), &self.grid, "input field is on a different grid");
        assert_eq!(y.grid(), &self.grid, "output field is on a different grid");
        let v = x.as_slice();
        let n_tot = self.grid.n_tot();
        #[cfg(feature = "rayon")]
        {
            y.as_mut_slice()
                .par_chunks_mut(n_tot)
                .enumerate()
                .for_each(|(si, out)| self.apply_row(v, si, out));
        }
        #[cfg(not(feature = "rayon"))]
        {
            for (si, out) in y.as_mut_slice().chunks_mut(n_tot).enumerate() {
                self.apply_row(v, si, out);
            }
        }
    }
}

impl<T: Real> GridOperator<T> for StencilOperator<T> {
    fn grid(&self) -> &Grid {
        &self.grid
    }
    fn offset(&self) -> T {
        self.offset
    }
    fn kind(&self) -> OperatorKind {
        OperatorKind::Stencil
    }
}
