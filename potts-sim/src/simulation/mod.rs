pub mod realization;

pub use realization::{seed_rngs, Realization};

use std::sync::atomic::{AtomicBool, Ordering};

use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, info, trace};
use validator::Validate;

use crate::config::{ModelParams, SimConfig, SweepMode};
use crate::error::SimError;
use crate::geometry::{partitions, Partition};
use crate::mcmc::SweepCount;
use crate::spins::SpinLattice;
use crate::statistics::{Sample, SampleCollector, SampleSummary};

/// Result of one point of a [`run_scan`].
#[derive(Debug, Clone)]
pub struct ScanPoint {
    pub params: ModelParams,
    pub samples: SampleCollector,
    pub summary: SampleSummary,
    /// Accepted over proposed moves, burn-in included. Proposals that would
    /// leave a site unchanged are not counted.
    pub acceptance_rate: f64,
}

/// Sweep schedule resolved against one lattice.
struct SweepPlan {
    partitions: Vec<Partition>,
    steps_per_sweep: usize,
    steps_per_partition: usize,
}

impl SweepPlan {
    fn new(lattice: &SpinLattice, config: &SimConfig, n_rngs: usize) -> Result<Self, SimError> {
        let steps_per_sweep = config.steps_per_sweep.unwrap_or(lattice.n_sites());
        let partitions = match config.sweep_mode {
            SweepMode::Sequential => Vec::new(),
            SweepMode::Partitioned => partitions(lattice.grid())?,
        };
        let needed = partitions.len().max(1);
        if n_rngs < needed {
            return Err(SimError::RngCountMismatch {
                expected: needed,
                actual: n_rngs,
            });
        }
        let steps_per_partition = if partitions.is_empty() {
            0
        } else {
            steps_per_sweep.div_ceil(partitions.len())
        };
        Ok(Self {
            partitions,
            steps_per_sweep,
            steps_per_partition,
        })
    }

    fn sweep(
        &self,
        lattice: &mut SpinLattice,
        params: &ModelParams,
        rngs: &mut [Xoshiro256StarStar],
        sequential: bool,
    ) -> Result<SweepCount, SimError> {
        if self.partitions.is_empty() {
            Ok(lattice.sequential_sweep(params, self.steps_per_sweep, &mut rngs[0]))
        } else {
            let n = self.partitions.len();
            lattice.parallel_sweep(
                params,
                &self.partitions,
                self.steps_per_partition,
                &mut rngs[..n],
                sequential,
            )
        }
    }
}

fn run_schedule(
    lattice: &mut SpinLattice,
    params: &ModelParams,
    config: &SimConfig,
    rngs: &mut [Xoshiro256StarStar],
    interrupted: &AtomicBool,
    on_sweep: &(dyn Fn() + Sync),
) -> Result<(SampleCollector, SweepCount), SimError> {
    config.validate()?;
    let plan = SweepPlan::new(lattice, config, rngs.len())?;
    let mut collector = SampleCollector::with_capacity(config.n_samples)?;
    let mut acc = SweepCount::default();

    info!(
        temperature = params.temperature(),
        field = ?params.field(),
        n_sites = lattice.n_sites(),
        mode = ?config.sweep_mode,
        burn_in = config.burn_in_sweeps,
        n_samples = config.n_samples,
        sweeps_per_sample = config.sweeps_per_sample,
        steps_per_sweep = plan.steps_per_sweep,
        "starting simulation"
    );

    let mut do_sweep = |lattice: &mut SpinLattice,
                        rngs: &mut [Xoshiro256StarStar]|
     -> Result<(), SimError> {
        if interrupted.load(Ordering::Relaxed) {
            return Err(SimError::Interrupted);
        }
        on_sweep();
        acc += plan.sweep(lattice, params, rngs, config.sequential)?;
        Ok(())
    };

    for _ in 0..config.burn_in_sweeps {
        do_sweep(lattice, rngs)?;
    }
    debug!(magnetization = lattice.calculate_magnetization(), "burn-in done");

    for sample_id in 0..config.n_samples {
        for _ in 0..config.sweeps_per_sample {
            do_sweep(lattice, rngs)?;
        }
        let sample = Sample {
            temperature: params.temperature(),
            field: params.field(),
            magnetization: lattice.calculate_magnetization(),
            energy: lattice.calculate_energy(params.field()),
        };
        trace!(
            sample_id,
            magnetization = sample.magnetization,
            energy = sample.energy,
            "recorded sample"
        );
        collector.record(sample)?;
    }

    info!(
        acceptance_rate = acc.rate(),
        n_recorded = collector.len(),
        "simulation finished"
    );
    Ok((collector, acc))
}

/// Burn-in followed by `config.n_samples` measurements of one lattice.
///
/// Each sample is taken after `config.sweeps_per_sample` sweeps. A sweep is
/// `config.steps_per_sweep` single-site updates (one per site by default),
/// run on `rngs[0]` in [`SweepMode::Sequential`] or split evenly across the
/// partitions, one RNG each, in [`SweepMode::Partitioned`].
///
/// `interrupted` is polled before every sweep; `on_sweep` is called once per
/// sweep (useful for progress bars).
pub fn run_simulation(
    lattice: &mut SpinLattice,
    params: &ModelParams,
    config: &SimConfig,
    rngs: &mut [Xoshiro256StarStar],
    interrupted: &AtomicBool,
    on_sweep: &(dyn Fn() + Sync),
) -> Result<SampleCollector, SimError> {
    run_schedule(lattice, params, config, rngs, interrupted, on_sweep).map(|(c, _)| c)
}

/// Run the schedule at each point in order without resetting the lattice, so
/// every point starts from the previous point's final state.
pub fn run_scan(
    lattice: &mut SpinLattice,
    points: &[ModelParams],
    config: &SimConfig,
    rngs: &mut [Xoshiro256StarStar],
    interrupted: &AtomicBool,
    on_sweep: &(dyn Fn() + Sync),
) -> Result<Vec<ScanPoint>, SimError> {
    let n_sites = lattice.n_sites();
    let mut out = Vec::with_capacity(points.len());
    for (i, params) in points.iter().enumerate() {
        debug!(point = i, temperature = params.temperature(), "scan point");
        let (samples, acc) = run_schedule(lattice, params, config, rngs, interrupted, on_sweep)?;
        let summary = SampleSummary::from_samples(samples.samples(), n_sites)
            .ok_or_else(|| SimError::InvalidConfig("no samples recorded".into()))?;
        out.push(ScanPoint {
            params: *params,
            samples,
            summary,
            acceptance_rate: acc.rate(),
        });
    }
    Ok(out)
}
