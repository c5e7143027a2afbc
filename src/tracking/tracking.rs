use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::geo::{self, GeoPoint};
use crate::rotator::Rotator;
use crate::tracks::{self, TrackStore};

use super::{IndicatorState, Presenter, TargetFix, TrackingState};

#[derive(Debug, Clone, Copy)]
pub struct TrackingSettings {
    /// The fixed ground point the rotator points from.
    pub reference: GeoPoint,
    /// Cadence floor of the control loop.
    pub tick_interval: Duration,
    /// Move duration used when acquiring a new target.
    pub acquire_duration: Duration,
    /// Short move duration for incremental corrections on a held target.
    pub update_duration: Duration,
}

struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// The tracking control loop, running as its own task.
///
/// Each tick it selects the nearest aircraft, classifies it against the id
/// held from the previous tick, commands the rotator and notifies the
/// presenter. Moves block the tick; a tick that runs longer than the cadence
/// is followed immediately by the next one.
pub struct Tracking {
    worker: Option<WorkerHandle>,
}

impl Tracking {
    pub fn start(
        settings: TrackingSettings,
        store: TrackStore,
        rotator: Rotator,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let ticker = Ticker::new(settings, store, rotator, presenter);
        let join = tokio::spawn(run_tracking_loop(ticker, settings.tick_interval, stop_rx));
        Self {
            worker: Some(WorkerHandle { stop_tx, join }),
        }
    }

    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
        }
    }
}

async fn run_tracking_loop(
    mut ticker: Ticker,
    tick_interval: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        let tick_start = Instant::now();
        ticker.tick().await;

        let elapsed = tick_start.elapsed();
        if elapsed < tick_interval {
            let stopped = tokio::select! {
                _ = tokio::time::sleep(tick_interval - elapsed) => false,
                _ = &mut stop_rx => true,
            };
            if stopped {
                break;
            }
        } else {
            // Overran the cadence: no catch-up sleep, just an exit check.
            use tokio::sync::oneshot::error::TryRecvError;
            if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
                break;
            }
        }
    }

    ticker.presenter.set_indicator(IndicatorState::PowerOff);
    ticker.rotator.shutdown();
}

/// One-tick state machine, split out from the loop for testability.
struct Ticker {
    settings: TrackingSettings,
    store: TrackStore,
    rotator: Rotator,
    presenter: Box<dyn Presenter>,
    state: TrackingState,
    previous_icao: Option<String>,
}

impl Ticker {
    fn new(
        settings: TrackingSettings,
        store: TrackStore,
        rotator: Rotator,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self {
            settings,
            store,
            rotator,
            presenter,
            state: TrackingState::NoTarget,
            previous_icao: None,
        }
    }

    async fn tick(&mut self) {
        let Some(nearest) = tracks::select_nearest(&self.store, &self.settings.reference) else {
            self.no_target().await;
            return;
        };
        // Tracks are never stored empty, but an empty history must not panic.
        let Some(point) = nearest.track.latest().cloned() else {
            self.no_target().await;
            return;
        };

        let solution = geo::solve(&self.settings.reference, &point.to_geo_point());
        let fix = TargetFix {
            azimuth_deg: solution.azimuth_deg,
            // Below-horizon targets are pointed at along the horizon.
            elevation_deg: solution.elevation_deg.max(0.0),
            range_m: solution.range_m,
            timestamp: Utc::now(),
        };

        let icao = nearest.track.icao.clone();
        let held = self.previous_icao.as_deref() == Some(icao.as_str());

        if held {
            self.state = TrackingState::Tracking;
            self.presenter.set_indicator(IndicatorState::Tracking);
            self.presenter.show_tracking(
                fix.azimuth_deg,
                fix.elevation_deg,
                point.altitude_m(),
                fix.range_m,
                nearest.track.callsign.as_deref(),
                &icao,
            );
            self.command_move(&fix, self.settings.update_duration).await;
        } else {
            self.state = TrackingState::Acquiring;
            log::info!(
                "Acquiring {} at az {:.1}° el {:.1}° range {:.0} m",
                icao,
                fix.azimuth_deg,
                fix.elevation_deg,
                fix.range_m
            );
            self.presenter.set_indicator(IndicatorState::Moving);
            self.presenter
                .show_approaching(fix.azimuth_deg, fix.elevation_deg);
            self.command_move(&fix, self.settings.acquire_duration).await;
            self.previous_icao = Some(icao);
        }
    }

    async fn no_target(&mut self) {
        if self.state != TrackingState::NoTarget {
            log::info!("Lost all tracks, returning to home position");
        }
        self.state = TrackingState::NoTarget;
        self.previous_icao = None;
        self.presenter.set_indicator(IndicatorState::NoAircraft);
        self.presenter.show_no_tracks();

        if let Err(e) = self.rotator.move_to(0.0, 0.0, 0.0).await {
            log::error!("Homing move failed: {}", e);
        }
    }

    async fn command_move(&mut self, fix: &TargetFix, duration: Duration) {
        if let Err(e) = self
            .rotator
            .move_to(fix.azimuth_deg, fix.elevation_deg, duration.as_secs_f64())
            .await
        {
            // The next tick recomputes the target; never retried as-is.
            log::error!("Move failed: {}", e);
        }
    }
}
