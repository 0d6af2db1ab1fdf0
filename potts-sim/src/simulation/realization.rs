use std::sync::atomic::AtomicBool;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use super::{run_scan, run_simulation, ScanPoint};
use crate::config::{ModelParams, SimConfig};
use crate::error::SimError;
use crate::geometry::n_partitions;
use crate::spins::{RandomOrientation, SpinLattice};
use crate::statistics::SampleCollector;

/// Deterministic per-worker generators seeded `base_seed, base_seed+1, …`.
pub fn seed_rngs(base_seed: u64, n: usize) -> Vec<Xoshiro256StarStar> {
    (0..n)
        .map(|i| Xoshiro256StarStar::seed_from_u64(base_seed.wrapping_add(i as u64)))
        .collect()
}

/// A lattice together with one RNG per partition worker.
///
/// Sequential sweeps draw from the first generator only.
pub struct Realization {
    pub lattice: SpinLattice,
    pub rngs: Vec<Xoshiro256StarStar>,
}

impl Realization {
    pub fn new(lattice: SpinLattice, base_seed: u64) -> Self {
        let rngs = seed_rngs(base_seed, n_partitions(lattice.grid()));
        Self { lattice, rngs }
    }

    /// Randomize every orientation and reseed the workers.
    ///
    /// Orientations are drawn from `base_seed`, workers from `base_seed + 1…`.
    pub fn reset(&mut self, base_seed: u64) {
        self.lattice.reinitialize(RandomOrientation::new(base_seed));
        self.rngs = seed_rngs(base_seed.wrapping_add(1), self.rngs.len());
    }

    pub fn sample(
        &mut self,
        params: &ModelParams,
        config: &SimConfig,
        interrupted: &AtomicBool,
        on_sweep: &(dyn Fn() + Sync),
    ) -> Result<SampleCollector, SimError> {
        run_simulation(
            &mut self.lattice,
            params,
            config,
            &mut self.rngs,
            interrupted,
            on_sweep,
        )
    }

    pub fn scan(
        &mut self,
        points: &[ModelParams],
        config: &SimConfig,
        interrupted: &AtomicBool,
        on_sweep: &(dyn Fn() + Sync),
    ) -> Result<Vec<ScanPoint>, SimError> {
        run_scan(
            &mut self.lattice,
            points,
            config,
            &mut self.rngs,
            interrupted,
            on_sweep,
        )
    }
}
