pub mod derivative;
pub mod sample;

pub use derivative::{central_difference, derivative_at, derivative_at_with_step};
pub use sample::{sample_runs, SampleRun};
