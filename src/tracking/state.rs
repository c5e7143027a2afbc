use chrono::{DateTime, Utc};

/// Control-loop state, driven each tick by the selected aircraft id
/// compared against the id held from the previous tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TrackingState {
    /// No aircraft in the table; the rotator sits at home.
    NoTarget,
    /// First lock on an aircraft, or the nearest id changed.
    Acquiring,
    /// Same aircraft as the previous tick; incremental corrections only.
    Tracking,
}

/// The pointing solution for one tick. Recomputed every tick, never stored.
#[derive(Debug, Clone, Copy)]
pub struct TargetFix {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_m: f64,
    pub timestamp: DateTime<Utc>,
}
