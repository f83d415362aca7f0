//! Matrix module: triplet assembly and compressed sparse row storage.

pub mod builder;
pub use builder::TripletBuilder;
pub mod sparse;
pub use sparse::{CsrMatrix, SparseMatrix};
