//! Independent verification of a computed solution.

use crate::core::traits::{InnerProduct, Real};
use crate::core::wrappers::xmy;
use crate::grid::GridField;
use crate::operator::GridOperator;

/// `||b - A x||_2`, using `scratch` for `A x`.
///
/// The CG recurrence updates `r` incrementally and can drift from the true
/// residual; this recomputes it from `x` and is meant as a regression oracle.
pub fn residual_norm<T, O>(op: &O, b: &GridField<T>, x: &GridField<T>, scratch: &mut GridField<T>) -> T
where
    T: Real,
    O: GridOperator<T>,
{
    op.matvec(x, scratch);
    xmy(b.as_slice(), scratch.as_mut_slice());
    let ip = ();
    ip.norm(&*scratch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::operator::StencilOperator;
    use approx::assert_relative_eq;

    #[test]
    fn exact_solution_has_zero_residual() {
        let grid = Grid::padded(4).unwrap();
        let op = StencilOperator::new(grid, 0.0f64).unwrap();
        let x = GridField::from_interior_fn(grid, |i, j| (i + 2 * j) as f64);
        let b = op.apply(&x);
        let mut scratch = op.new_field();
        assert_eq!(residual_norm(&op, &b, &x, &mut scratch), 0.0);
    }

    #[test]
    fn zero_guess_gives_norm_of_b() {
        let grid = Grid::padded(3).unwrap();
        let op = StencilOperator::new(grid, 0.0f64).unwrap();
        let b = GridField::from_interior_fn(grid, |_, _| 2.0);
        let x = op.new_field();
        let mut scratch = op.new_field();
        assert_relative_eq!(residual_norm(&op, &b, &x, &mut scratch), 6.0);
    }
}
