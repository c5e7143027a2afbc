use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

/// Per-step time budget used for a slew (untimed move): one full revolution
/// of 200 steps in 10 seconds.
const SLEW_TIME_PER_STEP_S: f64 = 10.0 / 200.0;

/// Microstep resolutions supported by the DRV8825-class driver board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum MicrostepMode {
    M2,
    M4,
    M8,
    M32,
}

impl MicrostepMode {
    /// Microsteps issued per full motor step.
    pub fn microsteps(&self) -> u32 {
        match self {
            MicrostepMode::M2 => 2,
            MicrostepMode::M4 => 4,
            MicrostepMode::M8 => 8,
            MicrostepMode::M32 => 32,
        }
    }
}

/// A move that did not issue every requested step. The axis position is left
/// at the steps actually issued; there is no rollback.
#[derive(Debug, Error)]
#[error("stopped after {issued} of {requested} steps: {reason}")]
pub struct StepInterrupted {
    pub issued: u32,
    pub requested: u32,
    pub reason: String,
}

/// The motion actuator capability consumed by an axis. Step-count and timing
/// computation happen above this seam; everything below it is signal-level.
pub trait MotorDriver: Send {
    fn initialize(&mut self);
    /// Store the resolution for subsequent timed moves. Does not move.
    fn set_microstepping(&mut self, mode: MicrostepMode);
    /// Issue `count` full steps in the given direction, pacing each step to
    /// `time_per_step_s`. A `time_per_step_s` of zero requests a slew at the
    /// fastest resolution.
    fn step(&mut self, forward: bool, count: u32, time_per_step_s: f64)
        -> Result<(), StepInterrupted>;
    fn shutdown(&mut self);
}

/// Raw step/direction line of one motor. Implemented over real GPIO on the
/// target hardware; the default implementation only logs.
pub trait StepSignal: Send {
    fn set_direction(&mut self, forward: bool);
    fn step_high(&mut self);
    fn step_low(&mut self);
}

/// Signal that goes nowhere but the log. Stands in for the GPIO lines when
/// running without hardware.
#[derive(Debug, Default)]
pub struct LogSignal;

impl StepSignal for LogSignal {
    fn set_direction(&mut self, forward: bool) {
        log::trace!("dir = {}", if forward { "CW" } else { "CCW" });
    }

    fn step_high(&mut self) {
        log::trace!("step = HIGH");
    }

    fn step_low(&mut self) {
        log::trace!("step = LOW");
    }
}

/// Software-timed stepper driver: sleeps out the high and low halves of each
/// microstep on the calling thread. Runs under `spawn_blocking`; the coarse
/// millisecond timing is the contract, not a precision guarantee.
pub struct SoftwareMotor<S: StepSignal = LogSignal> {
    name: String,
    mode: MicrostepMode,
    signal: S,
}

impl SoftwareMotor<LogSignal> {
    pub fn new(name: &str) -> Self {
        Self::with_signal(name, LogSignal)
    }
}

impl<S: StepSignal> SoftwareMotor<S> {
    pub fn with_signal(name: &str, signal: S) -> Self {
        Self {
            name: name.to_string(),
            // 1/8 resolution by default, a balance of speed and smoothness.
            mode: MicrostepMode::M8,
            signal,
        }
    }
}

impl<S: StepSignal> MotorDriver for SoftwareMotor<S> {
    fn initialize(&mut self) {
        log::info!("Initializing stepper motor '{}'", self.name);
        self.signal.step_low();
    }

    fn set_microstepping(&mut self, mode: MicrostepMode) {
        self.mode = mode;
    }

    fn step(
        &mut self,
        forward: bool,
        count: u32,
        time_per_step_s: f64,
    ) -> Result<(), StepInterrupted> {
        // A zero budget means slew: fastest resolution, fixed pace.
        let (mode, time_per_step_s) = if time_per_step_s == 0.0 {
            (MicrostepMode::M2, SLEW_TIME_PER_STEP_S)
        } else {
            (self.mode, time_per_step_s)
        };

        let microsteps = mode.microsteps();
        let (high, low) = microstep_delays(time_per_step_s, microsteps);

        log::info!(
            "'{}' stepping: forward={}, steps={}, time_per_step={:.3}s, mode={}",
            self.name,
            forward,
            count,
            time_per_step_s,
            mode
        );

        let start = Instant::now();
        self.signal.set_direction(forward);

        for _ in 0..count {
            for _ in 0..microsteps {
                self.signal.step_high();
                std::thread::sleep(high);
                self.signal.step_low();
                std::thread::sleep(low);
            }
        }

        log::debug!(
            "'{}' stepping completed in {:?} (expected {:.3}s)",
            self.name,
            start.elapsed(),
            count as f64 * time_per_step_s
        );
        Ok(())
    }

    fn shutdown(&mut self) {
        log::info!("Stepper motor '{}' shut down", self.name);
        self.signal.step_low();
    }
}

/// Split the per-microstep time budget into the high and low halves of the
/// pulse. Integer milliseconds; any remainder goes to the low half.
fn microstep_delays(time_per_step_s: f64, microsteps: u32) -> (Duration, Duration) {
    let time_per_step_ms = (time_per_step_s * 1000.0) as u64;
    let per_microstep_ms = time_per_step_ms / u64::from(microsteps);

    let high_ms = per_microstep_ms / 2;
    let low_ms = per_microstep_ms - high_ms;
    (
        Duration::from_millis(high_ms),
        Duration::from_millis(low_ms),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    struct RecordingSignal {
        highs: Arc<Mutex<u32>>,
        directions: Arc<Mutex<Vec<bool>>>,
    }

    impl StepSignal for RecordingSignal {
        fn set_direction(&mut self, forward: bool) {
            self.directions.lock().unwrap().push(forward);
        }

        fn step_high(&mut self) {
            *self.highs.lock().unwrap() += 1;
        }

        fn step_low(&mut self) {}
    }

    #[test]
    fn delays_split_evenly_with_remainder_to_low() {
        // 100 ms per step at 1/8 resolution: 12 ms per microstep.
        let (high, low) = microstep_delays(0.1, 8);
        assert_eq!(high, Duration::from_millis(6));
        assert_eq!(low, Duration::from_millis(6));

        // 50 ms per step at 1/2 resolution: 25 ms per microstep, odd.
        let (high, low) = microstep_delays(0.05, 2);
        assert_eq!(high, Duration::from_millis(12));
        assert_eq!(low, Duration::from_millis(13));
    }

    #[test]
    fn timed_step_pulses_microsteps_per_full_step() {
        let signal = RecordingSignal::default();
        let mut motor = SoftwareMotor::with_signal("test", signal.clone());
        motor.set_microstepping(MicrostepMode::M4);

        motor.step(true, 3, 0.004).unwrap();

        assert_eq!(*signal.highs.lock().unwrap(), 12);
        assert_eq!(*signal.directions.lock().unwrap(), vec![true]);
    }

    #[test]
    fn slew_forces_fastest_resolution() {
        let signal = RecordingSignal::default();
        let mut motor = SoftwareMotor::with_signal("test", signal.clone());
        motor.set_microstepping(MicrostepMode::M32);

        // Zero budget: M2 for the move, stored mode untouched.
        motor.step(false, 1, 0.0).unwrap();

        assert_eq!(*signal.highs.lock().unwrap(), 2);
        assert_eq!(*signal.directions.lock().unwrap(), vec![false]);
        assert_eq!(motor.mode, MicrostepMode::M32);
    }
}
