use chrono::{DateTime, Utc};

/// One decoded SBS-1 (BaseStation) record. Every field except the raw
/// message/transmission type may be absent on a given record; decoding
/// never fails on an individual field.
#[derive(Debug, Clone, PartialEq)]
pub struct SbsMessage {
    pub message_type: String,
    pub transmission_type: String,
    /// ICAO 24-bit transponder address as a hex string, e.g. "4CA1D2".
    pub icao: Option<String>,
    pub callsign: Option<String>,
    /// Barometric altitude in feet (ADS-B convention).
    pub altitude_ft: Option<i32>,
    pub ground_speed_kt: Option<f64>,
    pub track_deg: Option<f64>,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub vertical_rate_fpm: Option<i32>,
    pub on_ground: Option<bool>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl SbsMessage {
    /// True when the record carries everything the track table needs:
    /// an identity and a full 3-D position.
    pub fn has_position(&self) -> bool {
        self.icao.is_some()
            && self.latitude_deg.is_some()
            && self.longitude_deg.is_some()
            && self.altitude_ft.is_some()
    }
}
