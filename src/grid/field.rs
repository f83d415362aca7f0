//! Grid-shaped vector fields.

use crate::core::traits::Real;
use crate::error::KError;
use crate::grid::Grid;

/// A vector defined on every stored point of a [`Grid`].
///
/// Ghost cells are part of the storage and are kept at zero by every kernel in
/// the crate, so reductions may run over the whole slice.
#[derive(Clone, Debug, PartialEq)]
pub struct GridField<T> {
    grid: Grid,
    data: Vec<T>,
}

impl<T: Real> GridField<T> {
    pub fn zeros(grid: Grid) -> Self {
        Self { grid, data: vec![T::zero(); grid.len()] }
    }

    /// Fill interior point `(i, j)` with `f(i, j)`; ghost cells are zero.
    pub fn from_interior_fn<F>(grid: Grid, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut field = Self::zeros(grid);
        for i in 0..grid.n() {
            for j in 0..grid.n() {
                field.data[grid.index(i, j)] = f(i, j);
            }
        }
        field
    }

    /// Build from interior values in assembled row order (`row = i * n + j`).
    pub fn from_interior(grid: Grid, values: &[T]) -> Result<Self, KError> {
        if values.len() != grid.interior_len() {
            return Err(KError::Configuration(format!(
                "expected {} interior values, got {}",
                grid.interior_len(),
                values.len()
            )));
        }
        Ok(Self::from_interior_fn(grid, |i, j| values[grid.row(i, j)]))
    }

    /// Interior values in assembled row order.
    pub fn interior_values(&self) -> Vec<T> {
        let n = self.grid.n();
        let mut out = Vec::with_capacity(self.grid.interior_len());
        for i in 0..n {
            let start = self.grid.index(i, 0);
            out.extend_from_slice(&self.data[start..start + n]);
        }
        out
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.grid.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let idx = self.grid.index(i, j);
        self.data[idx] = value;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghosts_stay_zero() {
        let g = Grid::padded(2).unwrap();
        let f = GridField::from_interior_fn(g, |i, j| (1 + i * 2 + j) as f64);
        assert_eq!(f.as_slice().len(), 16);
        assert_eq!(f.as_slice().iter().filter(|v| **v == 0.0).count(), 12);
        assert_eq!(f.interior_values(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn from_interior_checks_length() {
        let g = Grid::unpadded(2).unwrap();
        assert!(GridField::from_interior(g, &[1.0, 2.0, 3.0]).is_err());
        let f = GridField::from_interior(g, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(f.get(1, 0), 3.0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn column_past_the_edge_panics() {
        // (0, 2) would alias (1, 0) in the flat storage
        let g = Grid::unpadded(2).unwrap();
        let f = GridField::from_interior(g, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let _ = f.get(0, 2);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn write_into_ghost_border_panics() {
        let g = Grid::padded(3).unwrap();
        let mut f = GridField::<f64>::zeros(g);
        f.set(3, 0, 1.0);
    }
}
