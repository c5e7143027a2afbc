use thiserror::Error;

use super::StepInterrupted;

#[derive(Debug, Error)]
pub enum RotatorError {
    #[error("azimuth {0}° out of range, must be 0 <= az < 360")]
    AzimuthOutOfRange(f64),
    #[error("elevation {0}° out of range, must be 0 <= el <= 90")]
    ElevationOutOfRange(f64),
    #[error("axis stepping interrupted: {0}")]
    Step(#[from] StepInterrupted),
    #[error("axis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
