use super::Indicator;

/// What the status LED should reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum IndicatorState {
    PowerOff,
    NoAircraft,
    Moving,
    Tracking,
}

/// Presentation capability consumed by the control loop. Implemented by
/// whatever display hardware is attached; the default writes to the log.
pub trait Presenter: Send {
    fn show_no_tracks(&mut self);
    fn show_approaching(&mut self, azimuth_deg: f64, elevation_deg: f64);
    fn show_tracking(
        &mut self,
        azimuth_deg: f64,
        elevation_deg: f64,
        altitude_m: f64,
        range_m: f64,
        callsign: Option<&str>,
        icao: &str,
    );
    fn set_indicator(&mut self, state: IndicatorState);
}

/// Eight-sector compass label for an azimuth in degrees.
pub fn compass_direction(azimuth_deg: f64) -> &'static str {
    const SECTORS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let sector = ((azimuth_deg.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    SECTORS[sector]
}

/// Log-backed presenter mirroring what the 20x4 LCD would show, with the
/// status LED handled by the indicator task.
pub struct ConsolePresenter {
    indicator: Indicator,
}

impl ConsolePresenter {
    pub fn new(indicator: Indicator) -> Self {
        Self { indicator }
    }
}

impl Presenter for ConsolePresenter {
    fn show_no_tracks(&mut self) {
        log::info!("No tracks");
    }

    fn show_approaching(&mut self, azimuth_deg: f64, elevation_deg: f64) {
        log::info!(
            "Approaching position AZ {:.1}° ({}) EL {:.1}°",
            azimuth_deg,
            compass_direction(azimuth_deg),
            elevation_deg
        );
    }

    fn show_tracking(
        &mut self,
        azimuth_deg: f64,
        elevation_deg: f64,
        altitude_m: f64,
        range_m: f64,
        callsign: Option<&str>,
        icao: &str,
    ) {
        log::info!(
            "Tracking {} '{}': AZ {:.1}° ({}) EL {:.1}° ALT {:.0} m DIST {:.0} m",
            icao,
            callsign.unwrap_or(""),
            azimuth_deg,
            compass_direction(azimuth_deg),
            elevation_deg,
            altitude_m,
            range_m
        );
    }

    fn set_indicator(&mut self, state: IndicatorState) {
        self.indicator.set_state(state);
    }
}
