use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::sbs::SbsMessage;

use super::{PositionPoint, Track};

/// Concurrent table of aircraft tracks keyed by ICAO id.
///
/// One coarse mutex over the whole table serializes ingestion upserts,
/// the expiry sweep, and full-table selection scans. With one update per
/// aircraft per received record and at most one scan per control-loop
/// tick, the coarse lock is never contended enough to matter.
#[derive(Debug, Clone, Default)]
pub struct TrackStore {
    tracks: Arc<Mutex<HashMap<String, Track>>>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or extend the track for the aircraft in `msg`.
    ///
    /// Records missing the ICAO id, latitude, longitude or altitude are
    /// ignored; they never enter the table. A record without a generation
    /// timestamp is stamped with the receive time.
    pub fn upsert(&self, msg: &SbsMessage) {
        let (Some(icao), Some(lat), Some(lon), Some(alt)) = (
            msg.icao.as_ref(),
            msg.latitude_deg,
            msg.longitude_deg,
            msg.altitude_ft,
        ) else {
            return;
        };

        let timestamp = msg.timestamp.unwrap_or_else(Utc::now);
        let point = PositionPoint {
            timestamp,
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_ft: Some(alt),
        };

        let mut tracks = self.tracks.lock().unwrap();
        match tracks.get_mut(icao) {
            Some(track) => {
                track.last_seen = timestamp;
                if msg.callsign.is_some() {
                    track.callsign = msg.callsign.clone();
                }
                track.history.push(point);
            }
            None => {
                tracks.insert(
                    icao.clone(),
                    Track {
                        icao: icao.clone(),
                        callsign: msg.callsign.clone(),
                        last_seen: timestamp,
                        history: vec![point],
                    },
                );
            }
        }
    }

    /// Remove every track not heard from for longer than `timeout` relative
    /// to `now`. Returns the ICAO ids that were dropped.
    pub fn sweep_expired(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<String> {
        let timeout = chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX);

        let mut tracks = self.tracks.lock().unwrap();
        let expired: Vec<String> = tracks
            .iter()
            .filter(|(_, track)| now - track.last_seen > timeout)
            .map(|(icao, _)| icao.clone())
            .collect();
        for icao in &expired {
            tracks.remove(icao);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.tracks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, icao: &str) -> Option<Track> {
        self.tracks.lock().unwrap().get(icao).cloned()
    }

    /// Run `f` over every track under the table lock. Used by the target
    /// selector so the scan excludes concurrent upserts and sweeps.
    pub(super) fn for_each<F: FnMut(&Track)>(&self, mut f: F) {
        let tracks = self.tracks.lock().unwrap();
        for track in tracks.values() {
            f(track);
        }
    }
}
