pub mod grid;
pub mod partition;

pub use grid::Grid;
pub use partition::{n_partitions, partitions, Partition};
