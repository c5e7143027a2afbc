mod indicator;
mod presenter;
mod state;
mod tracking;

pub use indicator::{Indicator, LedDriver, LogLed};
pub use presenter::{compass_direction, ConsolePresenter, IndicatorState, Presenter};
pub use state::{TargetFix, TrackingState};
pub use tracking::{Tracking, TrackingSettings};
