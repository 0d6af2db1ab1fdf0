pub mod energy;
pub mod init;
pub mod lattice;

pub use init::{
    CouplingField, CouplingTable, Couplings, FixedOrientation, OrientationInit, RandomOrientation,
    UniformCoupling,
};
pub use lattice::SpinLattice;
