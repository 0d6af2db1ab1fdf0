//! Metropolis Monte Carlo for lattices of discrete-orientation spins.
//!
//! Sites of a periodic 2D or 3D lattice point along one of a finite set of
//! unit directions ([`OrientationTable`]). The energy is
//! `E = −Σ_bonds J·s_i·s_j − Σ_i s_i·h`, and sweeps can be split across
//! quadrants/octants that update concurrently.

pub mod config;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod orientation;
pub mod parallel;
pub mod simulation;
pub mod spins;
pub mod statistics;
pub mod vector;

pub use config::{ModelParams, ProposalPolicy, SimConfig, SweepMode};
pub use error::SimError;
pub use mcmc::{StepOutcome, SweepCount};
pub use orientation::{OrientationTable, SpinState};
pub use simulation::{run_scan, run_simulation, seed_rngs, Realization, ScanPoint};
pub use spins::SpinLattice;
pub use statistics::{Sample, SampleCollector, SampleLayout, SampleSummary};
pub use vector::Vector;
