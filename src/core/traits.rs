//! Core linear-algebra traits for poisson-cg.

use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, LowerExp};

/// Floating-point element type of every field and operator (`f32` or `f64`).
pub trait Real: Float + FromPrimitive + LowerExp + Debug + Send + Sync + 'static {}

impl<T> Real for T where T: Float + FromPrimitive + LowerExp + Debug + Send + Sync + 'static {}

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Inner products & norms.
pub trait InnerProduct<V: ?Sized> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> Self::Scalar;
}
