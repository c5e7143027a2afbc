use std::sync::{Arc, Mutex};

use super::{MicrostepMode, MotorDriver, StepInterrupted};

/// A computed move for one axis: absolute target step, signed delta broken
/// into direction + count, and the per-step pacing that makes this axis
/// finish in the requested wall-clock duration.
#[derive(Debug, Clone)]
pub struct StepPlan {
    pub target_step: i64,
    pub forward: bool,
    pub steps_to_move: u32,
    /// Zero requests a slew (driver picks the fixed fast pace).
    pub time_per_step_s: f64,
}

/// One motor axis. `current_step` is the sole source of truth for the axis
/// position and only advances after a commanded move has run.
pub struct StepperAxis {
    name: &'static str,
    current_step: i64,
    degrees_per_full_step: f64,
    driver: Arc<Mutex<dyn MotorDriver>>,
}

impl StepperAxis {
    pub fn new(
        name: &'static str,
        steps_per_revolution: u32,
        driver: Arc<Mutex<dyn MotorDriver>>,
    ) -> Self {
        Self {
            name,
            current_step: 0,
            degrees_per_full_step: 360.0 / f64::from(steps_per_revolution),
            driver,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn current_step(&self) -> i64 {
        self.current_step
    }

    pub fn current_degrees(&self) -> f64 {
        self.current_step as f64 * self.degrees_per_full_step
    }

    pub fn driver(&self) -> Arc<Mutex<dyn MotorDriver>> {
        self.driver.clone()
    }

    pub fn initialize(&mut self) {
        self.driver.lock().unwrap().initialize();
        self.current_step = 0;
    }

    pub fn set_microstepping(&self, mode: MicrostepMode) {
        self.driver.lock().unwrap().set_microstepping(mode);
    }

    pub fn shutdown(&self) {
        self.driver.lock().unwrap().shutdown();
    }

    /// Compute the move from the current step index to `target_deg`, pacing
    /// it so the whole delta takes `duration_s`. A zero duration plans a
    /// slew; a zero-step delta completes immediately regardless.
    pub fn plan(&self, target_deg: f64, duration_s: f64) -> StepPlan {
        let target_step = (target_deg / self.degrees_per_full_step).floor() as i64;
        let delta = target_step - self.current_step;
        let forward = delta >= 0;
        let steps_to_move = delta.unsigned_abs() as u32;

        let time_per_step_s = if duration_s > 0.0 && steps_to_move > 0 {
            duration_s / f64::from(steps_to_move)
        } else {
            0.0
        };

        StepPlan {
            target_step,
            forward,
            steps_to_move,
            time_per_step_s,
        }
    }

    /// Fold the outcome of a driven plan back into the axis position: the
    /// target on success, the steps actually issued on an interrupted move.
    pub fn apply(&mut self, plan: &StepPlan, outcome: &Result<(), StepInterrupted>) {
        match outcome {
            Ok(()) => self.current_step = plan.target_step,
            Err(interrupted) => {
                let issued = i64::from(interrupted.issued);
                self.current_step += if plan.forward { issued } else { -issued };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullMotor;

    impl MotorDriver for NullMotor {
        fn initialize(&mut self) {}
        fn set_microstepping(&mut self, _mode: MicrostepMode) {}
        fn step(&mut self, _f: bool, _c: u32, _t: f64) -> Result<(), StepInterrupted> {
            Ok(())
        }
        fn shutdown(&mut self) {}
    }

    fn axis() -> StepperAxis {
        StepperAxis::new("azimuth", 200, Arc::new(Mutex::new(NullMotor)))
    }

    #[test]
    fn plan_90_degrees_over_5_seconds() {
        // 200 steps/rev -> 1.8°/step; 90° -> step 50, 0.1 s/step.
        let plan = axis().plan(90.0, 5.0);
        assert_eq!(plan.target_step, 50);
        assert_eq!(plan.steps_to_move, 50);
        assert!(plan.forward);
        assert!((plan.time_per_step_s - 0.1).abs() < 1e-12);
    }

    #[test]
    fn plan_reverses_when_target_is_behind() {
        let mut axis = axis();
        axis.apply(&axis.plan(90.0, 0.0), &Ok(()));
        assert_eq!(axis.current_step(), 50);

        let plan = axis.plan(0.0, 0.0);
        assert_eq!(plan.target_step, 0);
        assert_eq!(plan.steps_to_move, 50);
        assert!(!plan.forward);
        assert_eq!(plan.time_per_step_s, 0.0);
    }

    #[test]
    fn zero_delta_plans_no_motion() {
        let plan = axis().plan(0.5, 5.0);
        // 0.5° is below one full step from home.
        assert_eq!(plan.steps_to_move, 0);
        assert_eq!(plan.time_per_step_s, 0.0);
    }

    #[test]
    fn interrupted_move_keeps_issued_steps() {
        let mut axis = axis();
        let plan = axis.plan(90.0, 5.0);
        let outcome = Err(StepInterrupted {
            issued: 10,
            requested: 50,
            reason: "stall".into(),
        });
        axis.apply(&plan, &outcome);
        assert_eq!(axis.current_step(), 10);
    }
}
