// Compressed sparse row storage for assembled operators.

use faer::traits::ComplexField;

use crate::core::traits::Real;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A read‐only sparse matrix supporting y = A * x.
pub trait SparseMatrix<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Compute y = A * x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn spmv(&self, x: &[T], y: &mut [T]);
}

/// Immutable CSR matrix with sorted, duplicate-free column indices per row.
#[derive(Clone, Debug)]
pub struct CsrMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Real> CsrMatrix<T> {
    /// Build a CSR from raw row‐ptr, col‐idx, and values.
    ///
    /// # Panics
    /// If the arrays do not describe a valid `nrows`×`ncols` CSR pattern with
    /// strictly increasing column indices in every row.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(row_ptr.len(), nrows + 1, "row_ptr must have nrows + 1 entries");
        assert_eq!(col_idx.len(), values.len(), "col_idx and values differ in length");
        assert_eq!(row_ptr[nrows], col_idx.len(), "row_ptr does not cover every entry");
        for row in 0..nrows {
            let cols = &col_idx[row_ptr[row]..row_ptr[row + 1]];
            assert!(cols.windows(2).all(|w| w[0] < w[1]), "row {} is not strictly sorted", row);
            assert!(cols.iter().all(|&c| c < ncols), "row {} has a column out of range", row);
        }
        Self { nrows, ncols, row_ptr, col_idx, values }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored entries of one row as `(col, value)` pairs.
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        self.col_idx[range.clone()].iter().copied().zip(self.values[range].iter().copied())
    }

    /// Entry `A[row, col]`, zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> T {
        let range = self.row_ptr[row]..self.row_ptr[row + 1];
        match self.col_idx[range.clone()].binary_search(&col) {
            Ok(k) => self.values[range.start + k],
            Err(_) => T::zero(),
        }
    }

    /// Whether `|A[r, c] - A[c, r]| <= tol` for every stored entry.
    pub fn is_symmetric(&self, tol: T) -> bool {
        self.nrows == self.ncols
            && (0..self.nrows).all(|row| {
                self.row_entries(row)
                    .all(|(col, v)| (v - self.get(col, row)).abs() <= tol)
            })
    }

    #[inline]
    fn row_dot(&self, row: usize, x: &[T]) -> T {
        let mut sum = T::zero();
        for k in self.row_ptr[row]..self.row_ptr[row + 1] {
            sum = sum + self.values[k] * x[self.col_idx[k]];
        }
        sum
    }
}

impl<T: Real> SparseMatrix<T> for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        #[cfg(feature = "rayon")]
        {
            y.par_iter_mut().enumerate().for_each(|(i, yi)| *yi = self.row_dot(i, x));
        }
        #[cfg(not(feature = "rayon"))]
        {
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = self.row_dot(i, x);
            }
        }
    }
}

impl<T: Real + ComplexField> CsrMatrix<T> {
    /// Dense copy, for verification on small grids.
    pub fn to_dense(&self) -> faer::Mat<T> {
        faer::Mat::from_fn(self.nrows, self.ncols, |i, j| self.get(i, j))
    }
}
