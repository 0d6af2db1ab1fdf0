use super::autocorrelation::{autocorrelation, sokal_tau};
use super::collector::Sample;

/// Sample averages and the derived thermodynamic observables.
///
/// Energies are totals as recorded; `heat_capacity` is per site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary {
    pub n_samples: usize,
    /// ⟨m⟩
    pub mean_magnetization: f64,
    /// ⟨|m|⟩
    pub mean_abs_magnetization: f64,
    /// ⟨m²⟩
    pub mags2: f64,
    /// ⟨m⁴⟩
    pub mags4: f64,
    /// ⟨E⟩
    pub mean_energy: f64,
    /// ⟨E²⟩
    pub energies2: f64,
    /// `(⟨E²⟩ − ⟨E⟩²) / (T²·N)`
    pub heat_capacity: f64,
    /// `N·(⟨m²⟩ − ⟨m⟩²) / T`
    pub susceptibility: f64,
    /// `1 − ⟨m⁴⟩ / (3⟨m²⟩²)`; 0 when ⟨m²⟩ vanishes.
    pub binder: f64,
    /// Integrated autocorrelation time of |m|, in samples.
    pub tau_abs_magnetization: f64,
    /// Integrated autocorrelation time of E, in samples.
    pub tau_energy: f64,
}

/// Sokal τ of a sample series, with Γ(δ) taken up to a quarter of its length.
fn integrated_tau(series: &[f64]) -> f64 {
    let max_lag = (series.len() / 4).max(1);
    sokal_tau(&autocorrelation(series, max_lag))
}

impl SampleSummary {
    /// Summarize samples taken at one temperature on a lattice of `n_sites`.
    ///
    /// The temperature is read from the first sample. Returns `None` for an
    /// empty slice.
    pub fn from_samples(samples: &[Sample], n_sites: usize) -> Option<Self> {
        let first = samples.first()?;
        let t = first.temperature;
        let n = samples.len() as f64;
        let n_sites = n_sites as f64;

        let mut m = 0.0;
        let mut m_abs = 0.0;
        let mut m2 = 0.0;
        let mut m4 = 0.0;
        let mut e = 0.0;
        let mut e2 = 0.0;
        for s in samples {
            let sq = s.magnetization * s.magnetization;
            m += s.magnetization;
            m_abs += s.magnetization.abs();
            m2 += sq;
            m4 += sq * sq;
            e += s.energy;
            e2 += s.energy * s.energy;
        }
        m /= n;
        m_abs /= n;
        m2 /= n;
        m4 /= n;
        e /= n;
        e2 /= n;

        let var_e = (e2 - e * e).max(0.0);
        let var_m = (m2 - m * m).max(0.0);
        let binder = if m2 > 0.0 {
            1.0 - m4 / (3.0 * m2 * m2)
        } else {
            0.0
        };

        let abs_mags: Vec<f64> = samples.iter().map(|s| s.magnetization.abs()).collect();
        let energies: Vec<f64> = samples.iter().map(|s| s.energy).collect();

        Some(Self {
            n_samples: samples.len(),
            mean_magnetization: m,
            mean_abs_magnetization: m_abs,
            mags2: m2,
            mags4: m4,
            mean_energy: e,
            energies2: e2,
            heat_capacity: var_e / (t * t * n_sites),
            susceptibility: n_sites * var_m / t,
            binder,
            tau_abs_magnetization: integrated_tau(&abs_mags),
            tau_energy: integrated_tau(&energies),
        })
    }
}
