//! Structured N×N grid domain with an optional ghost border.
//!
//! Interior points are addressed by `(i, j)` with `0 <= i, j < n`. When the grid
//! carries a ghost border of width `n_ext` (0 or 1), every field allocated on the
//! grid stores `n_tot = n + 2 * n_ext` points per side and the ghost cells hold
//! zero, which applies a homogeneous Dirichlet condition to the stencil operator.

pub mod field;
pub use field::GridField;

use bitflags::bitflags;

use crate::error::KError;

bitflags! {
    /// Axis-aligned neighbours of an interior point that lie inside the interior.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Neighbors: u8 {
        const NORTH = 0b0001; // (i - 1, j)
        const SOUTH = 0b0010; // (i + 1, j)
        const WEST  = 0b0100; // (i, j - 1)
        const EAST  = 0b1000; // (i, j + 1)
        const ALL   = Self::NORTH.bits() | Self::SOUTH.bits() | Self::WEST.bits() | Self::EAST.bits();
    }
}

/// Largest ghost border the grid supports.
pub const MAX_GHOST_WIDTH: usize = 1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    n: usize,
    n_ext: usize,
}

impl Grid {
    /// Create an `n`×`n` grid with a ghost border of width `n_ext`.
    pub fn new(n: usize, n_ext: usize) -> Result<Self, KError> {
        if n == 0 {
            return Err(KError::Configuration("grid size n must be positive".into()));
        }
        if n_ext > MAX_GHOST_WIDTH {
            return Err(KError::Configuration(format!(
                "ghost border width {} is not supported (expected 0 or 1)",
                n_ext
            )));
        }
        Ok(Self { n, n_ext })
    }

    /// Grid without ghost cells, the layout used by assembled operators.
    pub fn unpadded(n: usize) -> Result<Self, KError> {
        Self::new(n, 0)
    }

    /// Grid with a one-cell ghost border, the layout used by stencil operators.
    pub fn padded(n: usize) -> Result<Self, KError> {
        Self::new(n, 1)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn n_ext(&self) -> usize {
        self.n_ext
    }

    /// Points per side including the ghost border.
    pub fn n_tot(&self) -> usize {
        self.n + 2 * self.n_ext
    }

    /// Number of stored points (interior plus ghosts).
    pub fn len(&self) -> usize {
        self.n_tot() * self.n_tot()
    }

    /// Number of interior points, i.e. the dimension of the operator.
    pub fn interior_len(&self) -> usize {
        self.n * self.n
    }

    /// Storage index of interior point `(i, j)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        assert!(i < self.n && j < self.n, "({i}, {j}) outside a {0}x{0} grid", self.n);
        (i + self.n_ext) * self.n_tot() + (j + self.n_ext)
    }

    /// Linear row of interior point `(i, j)` in the assembled ordering.
    #[inline]
    pub fn row(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    /// Interior coordinates of a stored point, or `None` for a ghost cell.
    pub fn interior_coords(&self, index: usize) -> Option<(usize, usize)> {
        let n_tot = self.n_tot();
        let (si, sj) = (index / n_tot, index % n_tot);
        let range = self.n_ext..self.n_ext + self.n;
        if range.contains(&si) && range.contains(&sj) {
            Some((si - self.n_ext, sj - self.n_ext))
        } else {
            None
        }
    }

    /// Neighbours of `(i, j)` that belong to the interior.
    pub fn neighbors(&self, i: usize, j: usize) -> Neighbors {
        let mut nb = Neighbors::empty();
        nb.set(Neighbors::NORTH, i > 0);
        nb.set(Neighbors::SOUTH, i + 1 < self.n);
        nb.set(Neighbors::WEST, j > 0);
        nb.set(Neighbors::EAST, j + 1 < self.n);
        nb
    }

    /// Denominator `n - 1` mapping interior indices onto `[0, 1]`.
    ///
    /// Fails for `n == 1`, where the normalisation is undefined.
    pub fn normalisation<T: crate::core::traits::Real>(&self) -> Result<T, KError> {
        if self.n < 2 {
            return Err(KError::Configuration(
                "grid size n = 1 has no normalised interior coordinates".into(),
            ));
        }
        T::from_usize(self.n - 1)
            .ok_or_else(|| KError::Configuration(format!("grid size {} not representable", self.n)))
    }
}
