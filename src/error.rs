use thiserror::Error;

// Unified error type for poisson-cg

#[derive(Error, Debug)]
pub enum KError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("sparse assembly needs {requested} triplets but capacity is {capacity}")]
    Capacity { requested: usize, capacity: usize },
    #[error("entry ({row}, {col}) out of bounds for a {nrows}x{ncols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },
    /// A CG denominator vanished or a step length became non-finite.
    #[error("degenerate search direction at iteration {iteration}: {quantity} = {value:e}")]
    DegenerateDirection {
        iteration: usize,
        quantity: &'static str,
        value: f64,
    },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
