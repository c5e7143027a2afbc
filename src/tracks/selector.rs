use crate::geo::{self, GeoPoint};

use super::{Track, TrackStore};

/// The winning track of a nearest-aircraft scan, with its range from the
/// reference point at the time of the scan.
#[derive(Debug, Clone)]
pub struct Nearest {
    pub track: Track,
    pub range_m: f64,
}

/// Scan the table and return the track whose most recent position is closest
/// to `reference` by straight-line 3-D distance, or `None` when the table is
/// empty.
///
/// Exact ties go to the first track encountered; iteration order over the
/// table is unspecified, so the winner among equals is non-deterministic.
/// The returned track is a clone taken under the table lock, so it is a
/// consistent snapshot of that one track.
pub fn select_nearest(store: &TrackStore, reference: &GeoPoint) -> Option<Nearest> {
    let mut best: Option<Nearest> = None;

    store.for_each(|track| {
        let Some(point) = track.latest() else {
            return;
        };
        let range_m = geo::distance_3d(reference, &point.to_geo_point());
        if best.as_ref().map_or(true, |b| range_m < b.range_m) {
            best = Some(Nearest {
                track: track.clone(),
                range_m,
            });
        }
    });

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbs::SbsMessage;
    use chrono::Utc;

    fn reference() -> GeoPoint {
        GeoPoint::new(55.6180, 12.6508, 5.0)
    }

    fn message(icao: &str, lat: f64, lon: f64, alt_ft: i32) -> SbsMessage {
        SbsMessage {
            message_type: "MSG".into(),
            transmission_type: "3".into(),
            icao: Some(icao.to_string()),
            callsign: None,
            altitude_ft: Some(alt_ft),
            ground_speed_kt: None,
            track_deg: None,
            latitude_deg: Some(lat),
            longitude_deg: Some(lon),
            vertical_rate_fpm: None,
            on_ground: None,
            timestamp: Some(Utc::now()),
        }
    }

    #[test]
    fn empty_table_selects_nothing() {
        let store = TrackStore::new();
        assert!(select_nearest(&store, &reference()).is_none());
    }

    #[test]
    fn single_track_wins_regardless_of_distance() {
        let store = TrackStore::new();
        store.upsert(&message("FAR001", -30.0, 150.0, 37_000));

        let nearest = select_nearest(&store, &reference()).expect("one track");
        assert_eq!(nearest.track.icao, "FAR001");
        assert!(nearest.range_m > 1_000_000.0);
    }

    #[test]
    fn closest_of_several_wins() {
        let store = TrackStore::new();
        store.upsert(&message("FAR001", 57.0, 10.0, 37_000));
        store.upsert(&message("NEAR01", 55.62, 12.66, 5_000));
        store.upsert(&message("MID001", 56.0, 12.9, 20_000));

        let nearest = select_nearest(&store, &reference()).expect("tracks exist");
        assert_eq!(nearest.track.icao, "NEAR01");
    }

    #[test]
    fn selection_uses_the_latest_point() {
        let store = TrackStore::new();
        // First report far away, second much closer: range must reflect
        // the most recent point, not the first.
        store.upsert(&message("SAS123", 57.0, 10.0, 37_000));
        store.upsert(&message("SAS123", 55.62, 12.66, 5_000));

        let nearest = select_nearest(&store, &reference()).expect("track exists");
        assert_eq!(nearest.track.history.len(), 2);
        assert!(nearest.range_m < 10_000.0);
    }
}
