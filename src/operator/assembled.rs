//! Assembled representation: CSR matrix built once from 5-point triples.

use tracing::debug;

use crate::core::traits::{MatVec, Real};
use crate::error::KError;
use crate::grid::{Grid, GridField, Neighbors};
use crate::matrix::{CsrMatrix, SparseMatrix, TripletBuilder};
use crate::operator::{GridOperator, OperatorKind, diagonal};

/// Triples reserved per grid point: the diagonal plus four neighbours.
pub const TRIPLETS_PER_POINT: usize = 5;

#[derive(Debug, Clone)]
pub struct AssembledOperator<T> {
    grid: Grid,
    offset: T,
    matrix: CsrMatrix<T>,
}

impl<T: Real> AssembledOperator<T> {
    /// Assemble with the default triplet budget of `5 * n^2`.
    pub fn build(grid: Grid, offset: T) -> Result<Self, KError> {
        Self::with_capacity(grid, offset, TRIPLETS_PER_POINT * grid.interior_len())
    }

    /// Assemble with an explicit triplet budget.
    ///
    /// Fails with [`KError::Capacity`] when `max_num_triplets < 5 * n^2`, before
    /// anything is inserted.
    pub fn with_capacity(grid: Grid, offset: T, max_num_triplets: usize) -> Result<Self, KError> {
        if grid.n_ext() != 0 {
            return Err(KError::Configuration(
                "assembled operator requires a grid without ghost cells".into(),
            ));
        }
        let diag = diagonal(offset)?;
        let required = TRIPLETS_PER_POINT * grid.interior_len();
        if max_num_triplets < required {
            return Err(KError::Capacity { requested: required, capacity: max_num_triplets });
        }

        let n = grid.n();
        let dim = grid.interior_len();
        let mut builder = TripletBuilder::new(dim, dim, max_num_triplets);
        let minus_one = -T::one();
        for i in 0..n {
            for j in 0..n {
                let row = grid.row(i, j);
                let nb = grid.neighbors(i, j);
                if nb.contains(Neighbors::WEST) {
                    builder.add(row, row - 1, minus_one)?;
                }
                if nb.contains(Neighbors::EAST) {
                    builder.add(row, row + 1, minus_one)?;
                }
                if nb.contains(Neighbors::NORTH) {
                    builder.add(row, row - n, minus_one)?;
                }
                if nb.contains(Neighbors::SOUTH) {
                    builder.add(row, row + n, minus_one)?;
                }
                builder.add(row, row, diag)?;
            }
        }
        let inserted = builder.len();
        let matrix = builder.build();
        debug!(n, triplets = inserted, nnz = matrix.nnz(), "assembled 5-point operator");
        Ok(Self { grid, offset, matrix })
    }

    /// The frozen sparse matrix.
    pub fn matrix(&self) -> &CsrMatrix<T> {
        &self.matrix
    }
}

impl<T: Real> MatVec<GridField<T>> for AssembledOperator<T> {
    fn matvec(&self, x: &GridField<T>, y: &mut GridField<T>) {
        assert_eq!(x.grid(), &self.grid, "input field is on a different grid");
        assert_eq!(y.grid(), &self.grid, "output field is on a different grid");
        // Without ghost cells, storage order is the assembled row order.
        self.matrix.spmv(x.as_slice(), y.as_mut_slice());
    }
}

impl<T: Real> GridOperator<T> for AssembledOperator<T> {
    fn grid(&self) -> &Grid {
        &self.grid
    }
    fn offset(&self) -> T {
        self.offset
    }
    fn kind(&self) -> OperatorKind {
        OperatorKind::Assembled
    }
}
