use std::sync::atomic::AtomicBool;

use potts_sim::spins::{RandomOrientation, UniformCoupling};
use potts_sim::{
    seed_rngs, run_simulation, ModelParams, OrientationTable, SimConfig, SpinLattice, SweepMode,
};

fn ising_4x4(seed: u64) -> SpinLattice {
    SpinLattice::new(
        vec![4, 4],
        OrientationTable::ising(),
        RandomOrientation::new(seed),
        UniformCoupling(1.0),
    )
    .unwrap()
}

/// Fraction of samples with |m| ≥ 0.5.
fn ordered_fraction(temperature: f64, mode: SweepMode, seed: u64) -> f64 {
    let mut lattice = ising_4x4(seed);
    let mut rngs = seed_rngs(seed, 4);
    let params = ModelParams::with_field_z(temperature, 0.0).unwrap();
    let config = SimConfig {
        burn_in_sweeps: 200,
        n_samples: 2000,
        sweeps_per_sample: 1,
        steps_per_sweep: None,
        sweep_mode: mode,
        sequential: false,
    };
    let samples = run_simulation(
        &mut lattice,
        &params,
        &config,
        &mut rngs,
        &AtomicBool::new(false),
        &|| {},
    )
    .unwrap();
    let mags = samples.magnetizations();
    mags.iter().filter(|m| m.abs() >= 0.5).count() as f64 / mags.len() as f64
}

#[test]
fn low_temperature_orders_high_temperature_does_not() {
    for mode in [SweepMode::Sequential, SweepMode::Partitioned] {
        let cold = ordered_fraction(1.0, mode, 5);
        let hot = ordered_fraction(1000.0, mode, 5);
        // at T = 1 the 4x4 Ising model sits almost entirely in the ordered
        // sectors; at T = 1000 spins are nearly independent
        assert!(cold > 0.9, "{mode:?}: cold ordered fraction {cold}");
        assert!(hot < 0.3, "{mode:?}: hot ordered fraction {hot}");
        assert!(cold > hot);
    }
}

#[test]
fn energy_per_site_is_bounded() {
    let mut lattice = ising_4x4(1);
    let mut rngs = seed_rngs(1, 4);
    let params = ModelParams::with_field_z(2.0, 0.3).unwrap();
    let config = SimConfig {
        n_samples: 200,
        ..SimConfig::default()
    };
    let samples = run_simulation(
        &mut lattice,
        &params,
        &config,
        &mut rngs,
        &AtomicBool::new(false),
        &|| {},
    )
    .unwrap();
    // two bonds and one field term per site
    for e in samples.energies() {
        let per_site = e / 16.0;
        assert!((-2.3..=2.3).contains(&per_site), "E/N = {per_site}");
    }
}
