use chrono::{DateTime, Utc};

use crate::geo::GeoPoint;

const FEET_TO_METERS: f64 = 0.3048;

/// One received position for an aircraft. Altitude stays in feet (the ADS-B
/// convention) and is converted to meters only when the math needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_ft: Option<i32>,
}

impl PositionPoint {
    pub fn altitude_m(&self) -> f64 {
        f64::from(self.altitude_ft.unwrap_or(0)) * FEET_TO_METERS
    }

    pub fn to_geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude_deg, self.longitude_deg, self.altitude_m())
    }
}

/// Accumulated state for one aircraft. History is append-only in arrival
/// order; out-of-order network delivery is not corrected. A track always
/// holds at least one point.
#[derive(Debug, Clone)]
pub struct Track {
    pub icao: String,
    pub callsign: Option<String>,
    pub last_seen: DateTime<Utc>,
    pub history: Vec<PositionPoint>,
}

impl Track {
    pub fn latest(&self) -> Option<&PositionPoint> {
        self.history.last()
    }
}
