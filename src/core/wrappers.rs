//! Reductions and vector-update kernels over slices and grid fields.
//!
//! This module provides the inner product and norm used by the CG driver, and the
//! three in-place updates of the CG recurrence. With the `rayon` feature enabled
//! every kernel fans out over the elements with parallel iterators and returns
//! only once all chunks have finished; otherwise a serial loop is used.
//!
//! Parallel reductions combine partial sums in a scheduling-dependent order, so
//! results agree with the serial fold only up to rounding.

use crate::core::traits::{InnerProduct, Real};
use crate::grid::GridField;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Inner product and norm for plain slices.
impl<T: Real> InnerProduct<[T]> for () {
    type Scalar = T;
    /// Computes the dot product of two slices: `x^T y`.
    fn dot(&self, x: &[T], y: &[T]) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            x.par_iter()
                .zip(y.par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .map(|(xi, yi)| *xi * *yi)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }
    /// Computes the Euclidean norm: `||x||_2`.
    fn norm(&self, x: &[T]) -> T {
        self.dot(x, x).sqrt()
    }
}

impl<T: Real> InnerProduct<Vec<T>> for () {
    type Scalar = T;
    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        InnerProduct::<[T]>::dot(self, x.as_slice(), y.as_slice())
    }
    fn norm(&self, x: &Vec<T>) -> T {
        InnerProduct::<[T]>::norm(self, x.as_slice())
    }
}

/// Reduction over every stored point of a field; ghost cells contribute zero.
impl<T: Real> InnerProduct<GridField<T>> for () {
    type Scalar = T;
    fn dot(&self, x: &GridField<T>, y: &GridField<T>) -> T {
        debug_assert_eq!(x.grid(), y.grid(), "fields live on different grids");
        InnerProduct::<[T]>::dot(self, x.as_slice(), y.as_slice())
    }
    fn norm(&self, x: &GridField<T>) -> T {
        InnerProduct::<[T]>::norm(self, x.as_slice())
    }
}

/// `y += alpha * x`
pub fn axpy<T: Real>(alpha: T, x: &[T], y: &mut [T]) {
    assert_eq!(x.len(), y.len(), "axpy: length mismatch");
    #[cfg(feature = "rayon")]
    {
        y.par_iter_mut().zip(x.par_iter()).for_each(|(yi, xi)| *yi = *yi + alpha * *xi);
    }
    #[cfg(not(feature = "rayon"))]
    {
        for (yi, xi) in y.iter_mut().zip(x) {
            *yi = *yi + alpha * *xi;
        }
    }
}

/// `y = x + beta * y`
pub fn xpby<T: Real>(x: &[T], beta: T, y: &mut [T]) {
    assert_eq!(x.len(), y.len(), "xpby: length mismatch");
    #[cfg(feature = "rayon")]
    {
        y.par_iter_mut().zip(x.par_iter()).for_each(|(yi, xi)| *yi = *xi + beta * *yi);
    }
    #[cfg(not(feature = "rayon"))]
    {
        for (yi, xi) in y.iter_mut().zip(x) {
            *yi = *xi + beta * *yi;
        }
    }
}

/// `y = x - y`
pub fn xmy<T: Real>(x: &[T], y: &mut [T]) {
    assert_eq!(x.len(), y.len(), "xmy: length mismatch");
    #[cfg(feature = "rayon")]
    {
        y.par_iter_mut().zip(x.par_iter()).for_each(|(yi, xi)| *yi = *xi - *yi);
    }
    #[cfg(not(feature = "rayon"))]
    {
        for (yi, xi) in y.iter_mut().zip(x) {
            *yi = *xi - *yi;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use approx::assert_relative_eq;

    #[test]
    fn dot_and_norm() {
        let ip = ();
        let x = vec![1.0, 2.0, 2.0];
        let y = vec![3.0, -1.0, 0.5];
        assert_relative_eq!(ip.dot(&x, &y), 2.0);
        assert_relative_eq!(ip.norm(&x), 3.0);
    }

    #[test]
    fn large_reduction_matches_closed_form() {
        // sum_{k=1}^{m} k^2 = m (m + 1) (2m + 1) / 6
        let m = 200_000usize;
        let x: Vec<f64> = (1..=m).map(|k| k as f64).collect();
        let ip = ();
        let expected = (m as f64) * (m as f64 + 1.0) * (2.0 * m as f64 + 1.0) / 6.0;
        assert_relative_eq!(ip.dot(&x, &x), expected, max_relative = 1e-12);
    }

    #[test]
    fn field_reduction_ignores_ghosts() {
        let g = Grid::padded(3).unwrap();
        let f = GridField::from_interior_fn(g, |_, _| 2.0f64);
        let ip = ();
        assert_relative_eq!(ip.dot(&f, &f), 36.0);
        assert_relative_eq!(ip.norm(&f), 6.0);
    }

    #[test]
    fn update_kernels() {
        let x = [1.0, 2.0, 3.0];
        let mut y = [1.0, 1.0, 1.0];
        axpy(2.0, &x, &mut y);
        assert_eq!(y, [3.0, 5.0, 7.0]);
        xpby(&x, 0.5, &mut y);
        assert_eq!(y, [2.5, 4.5, 6.5]);
        xmy(&x, &mut y);
        assert_eq!(y, [-1.5, -2.5, -3.5]);
    }
}
