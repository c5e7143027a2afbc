use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use super::{MicrostepMode, MotorDriver, RotatorError, StepInterrupted, StepPlan, StepperAxis};

/// Two-axis azimuth/elevation rotator.
///
/// A move drives both axes concurrently and completes when both have
/// finished, so its wall-clock duration is the max of the two axis
/// durations. At most one move runs at a time (`move_to` takes `&mut self`).
pub struct Rotator {
    azimuth: StepperAxis,
    elevation: StepperAxis,
}

impl Rotator {
    pub fn new(
        steps_per_revolution: u32,
        azimuth_driver: Arc<Mutex<dyn MotorDriver>>,
        elevation_driver: Arc<Mutex<dyn MotorDriver>>,
    ) -> Self {
        Self {
            azimuth: StepperAxis::new("azimuth", steps_per_revolution, azimuth_driver),
            elevation: StepperAxis::new("elevation", steps_per_revolution, elevation_driver),
        }
    }

    /// Initialize both motors and establish the current position as home
    /// (step index 0 on both axes).
    pub fn initialize(&mut self) {
        log::info!("Initializing azimuth and elevation stepper motors");
        self.azimuth.initialize();
        self.elevation.initialize();
    }

    /// Store the microstep resolution used by subsequent timed moves on both
    /// axes. Does not move anything.
    pub fn set_microstepping(&self, mode: MicrostepMode) {
        self.azimuth.set_microstepping(mode);
        self.elevation.set_microstepping(mode);
    }

    /// Current absolute step index of each axis, azimuth first.
    pub fn position_steps(&self) -> (i64, i64) {
        (self.azimuth.current_step(), self.elevation.current_step())
    }

    /// Current pointing in degrees, azimuth first.
    pub fn position_degrees(&self) -> (f64, f64) {
        (
            self.azimuth.current_degrees(),
            self.elevation.current_degrees(),
        )
    }

    /// Move both axes to the given pointing, each pacing itself to finish in
    /// `duration_s`. A zero duration slews at the fixed fast pace.
    ///
    /// Angles outside `0 <= az < 360` / `0 <= el <= 90` are rejected before
    /// any motion. An interrupted axis keeps the steps it actually issued;
    /// there is no rollback.
    pub async fn move_to(
        &mut self,
        azimuth_deg: f64,
        elevation_deg: f64,
        duration_s: f64,
    ) -> Result<(), RotatorError> {
        if !(0.0..360.0).contains(&azimuth_deg) {
            return Err(RotatorError::AzimuthOutOfRange(azimuth_deg));
        }
        if !(0.0..=90.0).contains(&elevation_deg) {
            return Err(RotatorError::ElevationOutOfRange(elevation_deg));
        }

        let az_plan = self.azimuth.plan(azimuth_deg, duration_s);
        let el_plan = self.elevation.plan(elevation_deg, duration_s);

        log::info!(
            "Moving to az {:.1}° el {:.1}° over {:.1}s ({}: {} steps, {}: {} steps)",
            azimuth_deg,
            elevation_deg,
            duration_s,
            self.azimuth.name(),
            az_plan.steps_to_move,
            self.elevation.name(),
            el_plan.steps_to_move
        );

        let az_task = drive_axis(self.azimuth.driver(), az_plan.clone());
        let el_task = drive_axis(self.elevation.driver(), el_plan.clone());
        let (az_outcome, el_outcome) = tokio::join!(az_task, el_task);
        let az_outcome = az_outcome?;
        let el_outcome = el_outcome?;

        self.azimuth.apply(&az_plan, &az_outcome);
        self.elevation.apply(&el_plan, &el_outcome);

        az_outcome?;
        el_outcome?;
        Ok(())
    }

    pub fn shutdown(&self) {
        self.azimuth.shutdown();
        self.elevation.shutdown();
    }
}

/// Run one axis plan on the blocking pool. An axis with nothing to do
/// finishes immediately without touching the driver.
fn drive_axis(
    driver: Arc<Mutex<dyn MotorDriver>>,
    plan: StepPlan,
) -> JoinHandle<Result<(), StepInterrupted>> {
    tokio::task::spawn_blocking(move || {
        if plan.steps_to_move == 0 {
            return Ok(());
        }
        driver
            .lock()
            .unwrap()
            .step(plan.forward, plan.steps_to_move, plan.time_per_step_s)
    })
}
