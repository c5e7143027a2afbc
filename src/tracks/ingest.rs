use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use crate::sbs;

use super::TrackStore;

/// Cadence of the expiry sweep task.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Consume raw feed lines until the channel closes, decoding each record and
/// upserting positional ones into the track table.
///
/// Malformed or short records are dropped silently; records without a full
/// identity + position are logged but never stored.
pub async fn run_ingest(store: TrackStore, mut lines: mpsc::Receiver<String>) {
    while let Some(line) = lines.recv().await {
        let Some(msg) = sbs::parse(&line) else {
            continue;
        };

        if let Some(lat) = msg.latitude_deg {
            log::debug!(
                "{} '{}' at {:.4},{:.4} alt {:?} ft",
                msg.icao.as_deref().unwrap_or("?"),
                msg.callsign.as_deref().unwrap_or(""),
                lat,
                msg.longitude_deg.unwrap_or(0.0),
                msg.altitude_ft,
            );
        }
        if msg.has_position() {
            store.upsert(&msg);
        }
    }
    log::info!("Feed closed, ingestion stopped");
}

/// Sweep the track table for expired entries once per second until told to
/// stop.
pub async fn run_sweep(store: TrackStore, timeout: Duration, mut stop_rx: oneshot::Receiver<()>) {
    loop {
        let stopped = tokio::select! {
            _ = tokio::time::sleep(SWEEP_INTERVAL) => false,
            _ = &mut stop_rx => true,
        };
        if stopped {
            return;
        }

        for icao in store.sweep_expired(Utc::now(), timeout) {
            log::info!(
                "Track expired: {} (inactive for {})",
                icao,
                humantime::format_duration(timeout)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ingest_stores_positional_records_only() {
        let store = TrackStore::new();
        let (tx, rx) = mpsc::channel(8);

        let full = "MSG,3,111,11111,4CA1D2,111111,2024/05/17,10:15:30.500,2024/05/17,10:15:30.520,SAS123,37000,450.2,81.5,55.7080,13.0508,64,,,,,0";
        tx.send(full.to_string()).await.unwrap();
        // Short record and a record without a latitude: both ignored.
        tx.send("MSG,3,111".to_string()).await.unwrap();
        tx.send(full.replace("55.7080", "")).await.unwrap();
        drop(tx);

        run_ingest(store.clone(), rx).await;

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("4CA1D2").unwrap().history.len(), 1);
    }
}
