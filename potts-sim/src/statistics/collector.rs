use crate::error::SimError;
use crate::vector::Vector;

/// One measurement taken between sweeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub temperature: f64,
    pub field: Vector,
    /// Mean z-component of the site directions.
    pub magnetization: f64,
    /// Total lattice energy.
    pub energy: f64,
}

/// Column layout of [`SampleCollector::to_row_major`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SampleLayout {
    /// `magnetization, energy`
    #[default]
    MagnetizationEnergy,
    /// `temperature, field_z, magnetization, energy`
    Full,
}

impl SampleLayout {
    pub fn fields_per_sample(self) -> usize {
        match self {
            SampleLayout::MagnetizationEnergy => 2,
            SampleLayout::Full => 4,
        }
    }
}

impl TryFrom<&str> for SampleLayout {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "magnetization_energy" => Ok(SampleLayout::MagnetizationEnergy),
            "full" => Ok(SampleLayout::Full),
            _ => Err(format!(
                "unknown sample layout '{s}', expected 'magnetization_energy' or 'full'"
            )),
        }
    }
}

/// Append-only sample buffer with a capacity fixed up front.
#[derive(Debug, Clone)]
pub struct SampleCollector {
    capacity: usize,
    samples: Vec<Sample>,
}

impl SampleCollector {
    /// Reserve room for exactly `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Result<Self, SimError> {
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(capacity)
            .map_err(|_| SimError::SampleAllocation(capacity))?;
        Ok(Self { capacity, samples })
    }

    pub fn record(&mut self, sample: Sample) -> Result<(), SimError> {
        if self.is_full() {
            return Err(SimError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn magnetizations(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.magnetization).collect()
    }

    pub fn energies(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.energy).collect()
    }

    /// Flat `len() × layout.fields_per_sample()` buffer, one row per sample in
    /// recording order.
    pub fn to_row_major(&self, layout: SampleLayout) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.samples.len() * layout.fields_per_sample());
        for s in &self.samples {
            match layout {
                SampleLayout::MagnetizationEnergy => {
                    out.extend_from_slice(&[s.magnetization, s.energy]);
                }
                SampleLayout::Full => {
                    out.extend_from_slice(&[s.temperature, s.field.z(), s.magnetization, s.energy]);
                }
            }
        }
        out
    }
}
