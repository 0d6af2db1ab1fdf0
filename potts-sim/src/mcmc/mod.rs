pub mod proposal;
pub mod sweep;

pub use proposal::{accept, acceptance_probability, propose};
pub use sweep::{StepOutcome, SweepCount};
