use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::geo::GeoPoint;
use crate::rotator::MicrostepMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station coordinates: '{0}', expected 'lat, lon'")]
    Coordinates(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    pub feed: FeedConfig,
    #[serde(default)]
    pub tracks: TracksConfig,
    #[serde(default)]
    pub rotator: RotatorConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    /// Reference point as "lat, lon" in degrees.
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

impl StationConfig {
    pub fn reference_point(&self) -> Result<GeoPoint, ConfigError> {
        let parts: Vec<_> = self.coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err(ConfigError::Coordinates(self.coordinates.clone()));
        }
        let lat = parts[0]
            .parse()
            .map_err(|_| ConfigError::Coordinates(self.coordinates.clone()))?;
        let lon = parts[1]
            .parse()
            .map_err(|_| ConfigError::Coordinates(self.coordinates.clone()))?;
        Ok(GeoPoint::new(lat, lon, self.altitude_m))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub host: String,
    #[serde(default = "default_feed_port")]
    pub port: u16,
}

fn default_feed_port() -> u16 {
    30003
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracksConfig {
    /// A track not heard from for this long is dropped by the sweep.
    #[serde(default = "default_inactivity_timeout", deserialize_with = "duration")]
    pub inactivity_timeout: Duration,
}

impl Default for TracksConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: default_inactivity_timeout(),
        }
    }
}

fn default_inactivity_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RotatorConfig {
    #[serde(default = "default_steps_per_revolution")]
    pub steps_per_revolution: u32,
    #[serde(default = "default_microstepping")]
    pub microstepping: MicrostepMode,
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: default_steps_per_revolution(),
            microstepping: default_microstepping(),
        }
    }
}

fn default_steps_per_revolution() -> u32 {
    200
}

fn default_microstepping() -> MicrostepMode {
    MicrostepMode::M8
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_tick_interval", deserialize_with = "duration")]
    pub tick_interval: Duration,
    #[serde(default = "default_acquire_duration", deserialize_with = "duration")]
    pub acquire_duration: Duration,
    #[serde(default = "default_update_duration", deserialize_with = "duration")]
    pub update_duration: Duration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            acquire_duration: default_acquire_duration(),
            update_duration: default_update_duration(),
        }
    }
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_acquire_duration() -> Duration {
    Duration::from_secs(10)
}

fn default_update_duration() -> Duration {
    Duration::from_secs(2)
}

/// Durations in the file are humantime strings, e.g. "10s" or "1500ms".
fn duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(text.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let yaml = r#"
station:
  name: home
  coordinates: "55.6180, 12.6508"
  altitude_m: 5.0
feed:
  host: localhost
  port: 30003
tracks:
  inactivity_timeout: 10s
rotator:
  steps_per_revolution: 200
  microstepping: m32
tracking:
  tick_interval: 3s
  acquire_duration: 10s
  update_duration: 1500ms
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let reference = config.station.reference_point().unwrap();
        assert!((reference.latitude_deg - 55.6180).abs() < 1e-9);
        assert!((reference.altitude_m - 5.0).abs() < 1e-9);
        assert_eq!(config.rotator.microstepping, MicrostepMode::M32);
        assert_eq!(
            config.tracking.update_duration,
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn omitted_sections_take_defaults() {
        let yaml = r#"
station:
  coordinates: "55.6180, 12.6508"
feed:
  host: localhost
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.feed.port, 30003);
        assert_eq!(config.tracks.inactivity_timeout, Duration::from_secs(10));
        assert_eq!(config.rotator.steps_per_revolution, 200);
        assert_eq!(config.rotator.microstepping, MicrostepMode::M8);
        assert_eq!(config.tracking.tick_interval, Duration::from_secs(3));
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        let station = StationConfig {
            name: None,
            coordinates: "55.6180".into(),
            altitude_m: 0.0,
        };
        assert!(matches!(
            station.reference_point(),
            Err(ConfigError::Coordinates(_))
        ));
    }
}
