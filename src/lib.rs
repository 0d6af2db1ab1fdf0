use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use numpy::ndarray::{Array2, ArrayD, IxDyn};
use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn, PyUntypedArrayMethods};
use pyo3::exceptions::{PyKeyboardInterrupt, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use tracing_subscriber::EnvFilter;

use potts_sim::spins::{CouplingTable, RandomOrientation, UniformCoupling};
use potts_sim::{
    ModelParams, OrientationTable, ProposalPolicy, Realization, SampleLayout, SampleSummary,
    SimConfig, SimError, SpinLattice, SweepMode, Vector,
};

fn to_py_err(e: SimError) -> PyErr {
    match e {
        SimError::Interrupted => PyKeyboardInterrupt::new_err("simulation interrupted"),
        SimError::SampleAllocation(_) => PyRuntimeError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

/// A float is the field along z; a 3-sequence is the full vector.
fn extract_field(field: &Bound<'_, PyAny>) -> PyResult<Vector> {
    if let Ok(z) = field.extract::<f64>() {
        return Ok(Vector::new(0.0, 0.0, z));
    }
    let [x, y, z]: [f64; 3] = field.extract()?;
    Ok(Vector::new(x, y, z))
}

#[pyclass]
struct PottsSimulation {
    real: Realization,
}

#[pymethods]
impl PottsSimulation {
    /// Create a new simulation with random initial orientations.
    ///
    /// Arguments:
    ///   lattice_shape: list of 2 or 3 lattice extents, e.g. [32, 32]
    ///   table_shape: orientation table (nx, ny); (1, 2) is the Ising model
    ///   coupling: a float for uniform couplings, or a float64 array of shape
    ///     (*lattice_shape, n_dims) with the forward coupling of every bond
    ///   proposal: "axial" or "diagonal"
    ///   seed: orientations are drawn from `seed`, workers from `seed + 1…`
    #[new]
    #[pyo3(signature = (lattice_shape, table_shape=(1, 2), coupling=None, proposal="axial", seed=42))]
    fn new(
        lattice_shape: Vec<usize>,
        table_shape: (usize, usize),
        coupling: Option<&Bound<'_, PyAny>>,
        proposal: &str,
        seed: u64,
    ) -> PyResult<Self> {
        let table = OrientationTable::new(table_shape.0, table_shape.1).map_err(to_py_err)?;
        let proposal = ProposalPolicy::try_from(proposal).map_err(PyValueError::new_err)?;
        let init = RandomOrientation::new(seed);

        let lattice = match coupling {
            None => SpinLattice::new(lattice_shape, table, init, UniformCoupling(1.0)),
            Some(c) => {
                if let Ok(j) = c.extract::<f64>() {
                    SpinLattice::new(lattice_shape, table, init, UniformCoupling(j))
                } else {
                    let array: PyReadonlyArrayDyn<f64> = c.extract()?;
                    let mut expected = lattice_shape.clone();
                    expected.push(lattice_shape.len());
                    if array.shape() != expected.as_slice() {
                        return Err(PyValueError::new_err(format!(
                            "coupling array has shape {:?}, expected {:?}",
                            array.shape(),
                            expected
                        )));
                    }
                    let values = array.as_array().iter().copied().collect();
                    let table_field =
                        CouplingTable::new(&lattice_shape, values).map_err(to_py_err)?;
                    SpinLattice::new(lattice_shape, table, init, table_field)
                }
            }
        }
        .map_err(to_py_err)?
        .with_proposal(proposal);

        Ok(Self {
            real: Realization::new(lattice, seed.wrapping_add(1)),
        })
    }

    /// Burn in, then record `n_samples` measurements.
    ///
    /// Arguments:
    ///   temperature: > 0
    ///   field: float (along z) or (hx, hy, hz)
    ///   sweep_mode: "partitioned" or "sequential"
    ///   sequential: run partition workers on one thread (reproducible)
    ///   layout: "magnetization_energy" or "full" columns for "samples"
    ///
    /// Returns: dict with "samples" (numpy array of shape (n_samples, fields))
    ///   and the summary scalars "mag", "abs_mag", "mags2", "mags4", "energy",
    ///   "energies2", "heat_capacity", "susceptibility", "binder", and the
    ///   integrated autocorrelation times "tau_abs_mag", "tau_energy" in samples.
    #[pyo3(signature = (temperature, field, n_samples, burn_in_sweeps, sweeps_per_sample, steps_per_sweep=None, sweep_mode="partitioned", sequential=false, layout="magnetization_energy"))]
    #[allow(clippy::too_many_arguments)]
    fn sample<'py>(
        &mut self,
        py: Python<'py>,
        temperature: f64,
        field: &Bound<'py, PyAny>,
        n_samples: usize,
        burn_in_sweeps: usize,
        sweeps_per_sample: usize,
        steps_per_sweep: Option<usize>,
        sweep_mode: &str,
        sequential: bool,
        layout: &str,
    ) -> PyResult<Bound<'py, PyDict>> {
        let params = ModelParams::new(temperature, extract_field(field)?).map_err(to_py_err)?;
        let layout = SampleLayout::try_from(layout).map_err(PyValueError::new_err)?;
        let config = SimConfig {
            burn_in_sweeps,
            n_samples,
            sweeps_per_sample,
            steps_per_sweep,
            sweep_mode: SweepMode::try_from(sweep_mode).map_err(PyValueError::new_err)?,
            sequential,
        };

        let pb = ProgressBar::new(config.total_sweeps() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
            )
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?
            .progress_chars("=> "),
        );
        pb.set_message("sweeps");

        let interrupted = AtomicBool::new(false);
        let on_sweep = || {
            pb.inc(1);
            Python::with_gil(|py| {
                if py.check_signals().is_err() {
                    interrupted.store(true, Ordering::Relaxed);
                }
            });
        };

        let real = &mut self.real;
        let result = py.allow_threads(|| real.sample(&params, &config, &interrupted, &on_sweep));
        pb.finish();
        let samples = result.map_err(to_py_err)?;

        let fields = layout.fields_per_sample();
        let rows = Array2::from_shape_vec((samples.len(), fields), samples.to_row_major(layout))
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;

        let dict = PyDict::new(py);
        dict.set_item("samples", rows.into_pyarray(py))?;
        if let Some(s) = SampleSummary::from_samples(samples.samples(), self.real.lattice.n_sites())
        {
            dict.set_item("mag", s.mean_magnetization)?;
            dict.set_item("abs_mag", s.mean_abs_magnetization)?;
            dict.set_item("mags2", s.mags2)?;
            dict.set_item("mags4", s.mags4)?;
            dict.set_item("energy", s.mean_energy)?;
            dict.set_item("energies2", s.energies2)?;
            dict.set_item("heat_capacity", s.heat_capacity)?;
            dict.set_item("susceptibility", s.susceptibility)?;
            dict.set_item("binder", s.binder)?;
            dict.set_item("tau_abs_mag", s.tau_abs_magnetization)?;
            dict.set_item("tau_energy", s.tau_energy)?;
        }
        Ok(dict)
    }

    /// Orientation indices as a uint16 array of shape (*lattice_shape, 2).
    fn get_states<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArrayDyn<u16>>> {
        let lat = &self.real.lattice;
        let mut shape = lat.shape().to_vec();
        shape.push(2);
        let flat: Vec<u16> = lat.states().iter().flat_map(|s| [s.x, s.y]).collect();
        let arr = ArrayD::from_shape_vec(IxDyn(&shape), flat)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(arr.into_pyarray(py))
    }

    /// Unit direction of every site, shape (*lattice_shape, 3).
    fn get_directions<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        let lat = &self.real.lattice;
        let mut shape = lat.shape().to_vec();
        shape.push(3);
        let flat: Vec<f64> = (0..lat.n_sites())
            .flat_map(|i| lat.direction(i).to_array())
            .collect();
        let arr = ArrayD::from_shape_vec(IxDyn(&shape), flat)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(arr.into_pyarray(py))
    }

    /// Mean z-component of the site directions.
    fn magnetization(&self) -> f64 {
        self.real.lattice.calculate_magnetization()
    }

    /// Total energy under `field` (float along z, or (hx, hy, hz)).
    #[pyo3(signature = (field=None))]
    fn energy(&self, field: Option<&Bound<'_, PyAny>>) -> PyResult<f64> {
        let h = match field {
            Some(f) => extract_field(f)?,
            None => Vector::zero(),
        };
        if !h.is_finite() {
            return Err(to_py_err(SimError::NonFiniteField));
        }
        Ok(self.real.lattice.calculate_energy(h))
    }

    /// Shape of the orientation table, (nx, ny).
    fn table_shape(&self) -> (usize, usize) {
        self.real.lattice.table().dims()
    }

    /// Orientation table as an array of shape (nx, ny, 3).
    fn get_table<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        let table = self.real.lattice.table();
        let (nx, ny) = table.dims();
        let flat: Vec<f64> = (0..nx)
            .flat_map(|ix| (0..ny).flat_map(move |iy| table.get(ix, iy).to_array()))
            .collect();
        let arr = ArrayD::from_shape_vec(IxDyn(&[nx, ny, 3]), flat)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(arr.into_pyarray(py))
    }

    /// Re-randomize orientations and reseed the workers.
    #[pyo3(signature = (seed=42))]
    fn reset(&mut self, seed: u64) {
        self.real.reset(seed);
    }
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // a host process may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    m.add_class::<PottsSimulation>()?;
    Ok(())
}
