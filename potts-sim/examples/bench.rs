use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use potts_sim::config::*;
use potts_sim::spins::{RandomOrientation, UniformCoupling};
use potts_sim::{OrientationTable, Realization, SimError, SpinLattice};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const L: usize = 128;
const N_TEMPS: usize = 8;
const N_SAMPLES: usize = 20;

fn run() -> Result<(), SimError> {
    let lattice = SpinLattice::new(
        vec![L, L],
        OrientationTable::new(8, 9)?,
        RandomOrientation::new(7),
        UniformCoupling(1.0),
    )?;
    let mut real = Realization::new(lattice, 42);

    let points = (0..N_TEMPS)
        .map(|i| {
            let t = 4.0 * (0.05f64).powf(i as f64 / (N_TEMPS - 1) as f64);
            ModelParams::with_field_z(t, 0.0)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let config = SimConfig {
        burn_in_sweeps: 10,
        n_samples: N_SAMPLES,
        sweeps_per_sample: 1,
        steps_per_sweep: None,
        sweep_mode: SweepMode::Partitioned,
        sequential: false,
    };

    println!(
        "Lattice: {}x{}  |  Table: 8x9  |  Temps: {}  |  Samples: {}",
        L, L, N_TEMPS, N_SAMPLES
    );
    println!("{}", "-".repeat(70));

    let interrupted = AtomicBool::new(false);
    let t0 = Instant::now();
    let scan = real.scan(&points, &config, &interrupted, &|| {})?;
    let elapsed = t0.elapsed().as_secs_f64();

    for point in &scan {
        println!(
            "T = {:7.4}  <|m|> = {:.4}  E/N = {:8.4}  acc = {:.3}",
            point.params.temperature(),
            point.summary.mean_abs_magnetization,
            point.summary.mean_energy / real.lattice.n_sites() as f64,
            point.acceptance_rate,
        );
    }

    let n_sweeps = N_TEMPS.saturating_mul(config.total_sweeps());
    let per_sweep = elapsed / n_sweeps as f64 * 1000.0;
    println!("Total: {:.3} s  |  {:.3} ms/sweep", elapsed, per_sweep);
    info!(elapsed, n_sweeps, "bench finished");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%e, "bench failed");
            ExitCode::FAILURE
        }
    }
}
