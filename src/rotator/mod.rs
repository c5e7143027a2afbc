mod axis;
mod error;
mod motor;
mod rotator;

pub use axis::{StepPlan, StepperAxis};
pub use error::RotatorError;
pub use motor::{LogSignal, MicrostepMode, MotorDriver, SoftwareMotor, StepInterrupted, StepSignal};
pub use rotator::Rotator;
