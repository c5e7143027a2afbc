use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::IndicatorState;

/// A single status LED. Implemented over real GPIO on the target hardware.
pub trait LedDriver: Send {
    fn set(&mut self, on: bool);
}

/// LED that only shows up in the log.
#[derive(Debug, Default)]
pub struct LogLed;

impl LedDriver for LogLed {
    fn set(&mut self, on: bool) {
        log::trace!("led = {}", if on { "on" } else { "off" });
    }
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Off,
    On,
    Blink(Duration),
}

fn pattern_for(state: IndicatorState) -> Pattern {
    match state {
        IndicatorState::PowerOff => Pattern::Off,
        IndicatorState::NoAircraft => Pattern::Blink(Duration::from_millis(1000)),
        IndicatorState::Moving => Pattern::Blink(Duration::from_millis(200)),
        IndicatorState::Tracking => Pattern::On,
    }
}

struct Blinker {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Handle to the indicator task. State changes go over a channel; the task
/// cancels and awaits the previous blink worker before starting the next,
/// so exactly one worker ever drives the LED.
pub struct Indicator {
    tx: mpsc::UnboundedSender<IndicatorState>,
    join: Option<JoinHandle<()>>,
}

impl Indicator {
    pub fn spawn(driver: Arc<Mutex<dyn LedDriver>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let join = tokio::spawn(run_indicator(driver, rx));
        Self {
            tx,
            join: Some(join),
        }
    }

    pub fn set_state(&self, state: IndicatorState) {
        // The task only ends once the sender is dropped.
        let _ = self.tx.send(state);
    }

    /// Stop the indicator task and leave the LED off.
    pub async fn shutdown(mut self) {
        drop(self.tx);
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

async fn run_indicator(
    driver: Arc<Mutex<dyn LedDriver>>,
    mut rx: mpsc::UnboundedReceiver<IndicatorState>,
) {
    let mut blinker: Option<Blinker> = None;

    while let Some(state) = rx.recv().await {
        if let Some(previous) = blinker.take() {
            let _ = previous.stop_tx.send(());
            let _ = previous.join.await;
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_pattern(driver.clone(), pattern_for(state), stop_rx));
        blinker = Some(Blinker { stop_tx, join });
    }

    if let Some(previous) = blinker.take() {
        let _ = previous.stop_tx.send(());
        let _ = previous.join.await;
    }
    driver.lock().unwrap().set(false);
}

async fn run_pattern(
    driver: Arc<Mutex<dyn LedDriver>>,
    pattern: Pattern,
    mut stop_rx: oneshot::Receiver<()>,
) {
    match pattern {
        Pattern::Off => {
            driver.lock().unwrap().set(false);
            let _ = stop_rx.await;
        }
        Pattern::On => {
            driver.lock().unwrap().set(true);
            let _ = stop_rx.await;
        }
        Pattern::Blink(half_period) => {
            let mut on = true;
            loop {
                driver.lock().unwrap().set(on);
                let stopped = tokio::select! {
                    _ = tokio::time::sleep(half_period) => false,
                    _ = &mut stop_rx => true,
                };
                if stopped {
                    driver.lock().unwrap().set(false);
                    return;
                }
                on = !on;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct RecordingLed {
        writes: Arc<Mutex<Vec<bool>>>,
    }

    impl LedDriver for RecordingLed {
        fn set(&mut self, on: bool) {
            self.writes.lock().unwrap().push(on);
        }
    }

    #[tokio::test]
    async fn blinker_toggles_until_state_change() {
        let led = RecordingLed::default();
        let indicator = Indicator::spawn(Arc::new(Mutex::new(led.clone())));

        indicator.set_state(IndicatorState::Moving);
        tokio::time::sleep(Duration::from_millis(700)).await;
        indicator.set_state(IndicatorState::Tracking);
        tokio::time::sleep(Duration::from_millis(100)).await;
        indicator.shutdown().await;

        let writes = led.writes.lock().unwrap().clone();
        // The 200 ms blinker got at least one on/off cycle in before the
        // switch to solid-on, and shutdown left the LED off.
        assert!(writes.iter().filter(|on| **on).count() >= 2);
        assert!(writes.iter().filter(|on| !**on).count() >= 1);
        assert_eq!(writes.last(), Some(&false));
    }

    #[tokio::test]
    async fn power_off_turns_led_off() {
        let led = RecordingLed::default();
        let indicator = Indicator::spawn(Arc::new(Mutex::new(led.clone())));

        indicator.set_state(IndicatorState::PowerOff);
        tokio::time::sleep(Duration::from_millis(50)).await;
        indicator.shutdown().await;

        let writes = led.writes.lock().unwrap().clone();
        assert!(!writes.is_empty());
        assert!(writes.iter().all(|on| !on));
    }
}
