/// Sparse undirected edge sets with single use membership tests.
pub mod edge_set;
/// Swendsen-Wang sweeps for Potts models.
pub mod swendsen_wang;

pub use edge_set::*;
pub use swendsen_wang::*;
