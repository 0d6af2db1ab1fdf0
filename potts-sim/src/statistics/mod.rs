pub mod autocorrelation;
pub mod collector;
pub mod summary;

pub use autocorrelation::{autocorrelation, sokal_tau, AutocorrAccum};
pub use collector::{Sample, SampleCollector, SampleLayout};
pub use summary::SampleSummary;
