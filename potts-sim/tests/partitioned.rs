use std::sync::atomic::AtomicBool;

use potts_sim::spins::{FixedOrientation, UniformCoupling};
use potts_sim::{
    run_simulation, seed_rngs, ModelParams, OrientationTable, SampleSummary, SimConfig,
    SpinLattice, SpinState, SweepMode,
};

fn mean_abs_m(shape: Vec<usize>, mode: SweepMode, temperature: f64) -> f64 {
    let mut lattice = SpinLattice::new(
        shape,
        OrientationTable::ising(),
        FixedOrientation(SpinState::new(0, 0)),
        UniformCoupling(1.0),
    )
    .unwrap();
    let n_sites = lattice.n_sites();
    let mut rngs = seed_rngs(2024, 8);
    let config = SimConfig {
        burn_in_sweeps: 300,
        n_samples: 3000,
        sweeps_per_sample: 2,
        steps_per_sweep: None,
        sweep_mode: mode,
        sequential: false,
    };
    let params = ModelParams::with_field_z(temperature, 0.0).unwrap();
    let samples = run_simulation(
        &mut lattice,
        &params,
        &config,
        &mut rngs,
        &AtomicBool::new(false),
        &|| {},
    )
    .unwrap();
    SampleSummary::from_samples(samples.samples(), n_sites)
        .unwrap()
        .mean_abs_magnetization
}

#[test]
fn partitioned_matches_sequential_2d() {
    // well inside the ordered and the disordered phase of the 8x8 model
    for t in [1.5, 5.0] {
        let seq = mean_abs_m(vec![8, 8], SweepMode::Sequential, t);
        let par = mean_abs_m(vec![8, 8], SweepMode::Partitioned, t);
        assert!(
            (seq - par).abs() < 0.05,
            "T = {t}: sequential {seq} vs partitioned {par}"
        );
    }
}

#[test]
fn partitioned_matches_sequential_3d() {
    let seq = mean_abs_m(vec![4, 4, 4], SweepMode::Sequential, 3.0);
    let par = mean_abs_m(vec![4, 4, 4], SweepMode::Partitioned, 3.0);
    assert!((seq - par).abs() < 0.05, "sequential {seq} vs partitioned {par}");
}
