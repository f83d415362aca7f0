//! Tests that the assembled and matrix-free representations define the same operator.
//!
//! The assembled CSR matrix is checked for symmetry and against a dense faer
//! product, and both representations are applied to random fields on grids of
//! several sizes and spectral shifts.

use approx::assert_relative_eq;
use faer::Mat;
use poisson_cg::{AssembledOperator, Grid, GridField, GridOperator, StencilOperator};
use rand::Rng;

/// Random interior values in `[-1, 1)`, in assembled row order.
fn random_interior(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n * n).map(|_| rng.r#gen::<f64>() * 2.0 - 1.0).collect()
}

/// Test that `A[row, col] == A[col, row]` for every assembled entry, with and without a shift.
#[test]
fn assembled_matrix_is_symmetric() {
    for &n in &[1usize, 2, 3, 7, 16] {
        for &offset in &[0.0, 0.75] {
            let op = AssembledOperator::build(Grid::unpadded(n).unwrap(), offset).unwrap();
            assert!(op.matrix().is_symmetric(0.0), "n = {}, offset = {}", n, offset);
            let dense = op.matrix().to_dense();
            for i in 0..n * n {
                for j in 0..n * n {
                    assert_eq!(dense[(i, j)], dense[(j, i)]);
                }
            }
        }
    }
}

/// Test that random vectors give the same `A v` through CSR, stencil (padded and
/// unpadded) and a dense faer product.
#[test]
fn representations_agree_on_random_vectors() {
    for &n in &[2usize, 3, 5, 8, 17, 32] {
        for &offset in &[0.0, 0.5, 3.0] {
            let plain = Grid::unpadded(n).unwrap();
            let padded = Grid::padded(n).unwrap();
            let assembled = AssembledOperator::build(plain, offset).unwrap();
            let stencil = StencilOperator::new(padded, offset).unwrap();
            let stencil_plain = StencilOperator::new(plain, offset).unwrap();

            for _ in 0..3 {
                let values = random_interior(n);
                let ya = assembled.apply(&GridField::from_interior(plain, &values).unwrap()).interior_values();
                let ys = stencil.apply(&GridField::from_interior(padded, &values).unwrap()).interior_values();
                let yp = stencil_plain.apply(&GridField::from_interior(plain, &values).unwrap()).interior_values();
                for k in 0..n * n {
                    assert_relative_eq!(ya[k], ys[k], epsilon = 1e-12, max_relative = 1e-10);
                    assert_relative_eq!(ya[k], yp[k], epsilon = 1e-12, max_relative = 1e-10);
                }
            }
        }
    }
}

#[test]
fn dense_product_matches_sparse() {
    let n = 6;
    let grid = Grid::unpadded(n).unwrap();
    let op = AssembledOperator::build(grid, 0.2).unwrap();
    let values = random_interior(n);
    let dense = op.matrix().to_dense();
    let x_mat = Mat::from_fn(n * n, 1, |i, _| values[i]);
    let y_dense = &dense * &x_mat;
    let y = op.apply(&GridField::from_interior(grid, &values).unwrap());
    for k in 0..n * n {
        assert_relative_eq!(y.as_slice()[k], y_dense[(k, 0)], epsilon = 1e-12);
    }
}

#[test]
fn ghost_border_stays_zero() {
    let n = 9;
    let padded = Grid::padded(n).unwrap();
    let op = StencilOperator::new(padded, 1.0).unwrap();
    let values = random_interior(n);
    let y = op.apply(&GridField::from_interior(padded, &values).unwrap());
    for (idx, v) in y.as_slice().iter().enumerate() {
        if padded.interior_coords(idx).is_none() {
            assert_eq!(*v, 0.0);
        }
    }
}
