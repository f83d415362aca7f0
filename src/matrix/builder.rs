//! Triplet builder for sparse assembly.
//!
//! Entries are collected as `(row, col, value)` triples up to a capacity fixed at
//! construction; [`TripletBuilder::build`] freezes them into a [`CsrMatrix`].
//! Repeated insertions at the same position are summed, never overwritten.

use crate::core::traits::Real;
use crate::error::KError;
use crate::matrix::sparse::CsrMatrix;

#[cfg(feature = "rayon")]
use rayon::slice::ParallelSliceMut;

#[derive(Debug)]
pub struct TripletBuilder<T> {
    nrows: usize,
    ncols: usize,
    capacity: usize,
    triplets: Vec<(usize, usize, T)>,
}

impl<T: Real> TripletBuilder<T> {
    /// New builder for an `nrows`×`ncols` matrix accepting at most `max_num_triplets` insertions.
    pub fn new(nrows: usize, ncols: usize, max_num_triplets: usize) -> Self {
        Self {
            nrows,
            ncols,
            capacity: max_num_triplets,
            triplets: Vec::with_capacity(max_num_triplets),
        }
    }

    /// Record `A[row, col] += value`.
    pub fn add(&mut self, row: usize, col: usize, value: T) -> Result<(), KError> {
        if row >= self.nrows || col >= self.ncols {
            return Err(KError::IndexOutOfBounds { row, col, nrows: self.nrows, ncols: self.ncols });
        }
        if self.triplets.len() == self.capacity {
            return Err(KError::Capacity { requested: self.capacity + 1, capacity: self.capacity });
        }
        self.triplets.push((row, col, value));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sort, merge duplicates, and freeze into CSR.
    pub fn build(mut self) -> CsrMatrix<T> {
        #[cfg(feature = "rayon")]
        self.triplets.par_sort_unstable_by_key(|&(r, c, _)| (r, c));
        #[cfg(not(feature = "rayon"))]
        self.triplets.sort_unstable_by_key(|&(r, c, _)| (r, c));

        let mut row_ptr = vec![0usize; self.nrows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(self.triplets.len());
        let mut values: Vec<T> = Vec::with_capacity(self.triplets.len());
        let mut last: Option<(usize, usize)> = None;
        for (r, c, v) in self.triplets {
            if last == Some((r, c)) {
                if let Some(acc) = values.last_mut() {
                    *acc = *acc + v;
                }
                continue;
            }
            row_ptr[r + 1] += 1;
            col_idx.push(c);
            values.push(v);
            last = Some((r, c));
        }
        for i in 1..=self.nrows {
            row_ptr[i] += row_ptr[i - 1];
        }
        CsrMatrix::from_csr(self.nrows, self.ncols, row_ptr, col_idx, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::sparse::SparseMatrix;

    #[test]
    fn duplicates_accumulate() {
        let mut b = TripletBuilder::new(2, 2, 5);
        b.add(1, 1, 2.0).unwrap();
        b.add(0, 0, 1.0).unwrap();
        b.add(1, 1, 3.0).unwrap();
        b.add(0, 1, -1.0).unwrap();
        b.add(0, 0, 0.5).unwrap();
        let m = b.build();
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.get(0, 0), 1.5);
        assert_eq!(m.get(0, 1), -1.0);
        assert_eq!(m.get(1, 1), 5.0);
        assert_eq!(m.get(1, 0), 0.0);
        assert_eq!(m.nrows(), 2);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut b = TripletBuilder::new(3, 3, 2);
        b.add(0, 0, 1.0).unwrap();
        b.add(1, 1, 1.0).unwrap();
        match b.add(2, 2, 1.0) {
            Err(KError::Capacity { requested, capacity }) => {
                assert_eq!(requested, 3);
                assert_eq!(capacity, 2);
            }
            other => panic!("expected capacity error, got {:?}", other),
        }
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn out_of_range_entry() {
        let mut b = TripletBuilder::<f64>::new(2, 2, 4);
        assert!(matches!(b.add(2, 0, 1.0), Err(KError::IndexOutOfBounds { row: 2, .. })));
        assert!(b.is_empty());
    }

    #[test]
    fn empty_rows_are_kept() {
        let mut b = TripletBuilder::new(3, 3, 1);
        b.add(2, 0, 7.0).unwrap();
        let m = b.build();
        let mut y = vec![1.0; 3];
        m.spmv(&[1.0, 1.0, 1.0], &mut y);
        assert_eq!(y, vec![0.0, 0.0, 7.0]);
    }
}
