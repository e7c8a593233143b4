use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::coord::GroundStation;
use crate::hardware::HardwareConfig;
use crate::session::{LoopIntervals, SessionSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station coordinates: {0:?}")]
    Station(String),
    #[error("invalid interval `{name}`: {message}")]
    Interval { name: &'static str, message: String },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub station: StationConfig,
    pub output: OutputConfig,
    pub intervals: IntervalsConfig,
    pub hardware: HardwareConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub coordinates: String,
    pub altitude_m: f64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            coordinates: "37.8716, -122.2727".to_string(),
            altitude_m: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("observations.json"),
        }
    }
}

/// Loop pauses as humantime strings ("5s", "500ms").
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntervalsConfig {
    pub pointing: String,
    pub spectrometer: String,
    pub sdr: String,
    pub snapshot: String,
    pub shutdown_grace: String,
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            pointing: "5s".to_string(),
            spectrometer: "1s".to_string(),
            sdr: "1s".to_string(),
            snapshot: "10s".to_string(),
            shutdown_grace: "6s".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn station(&self) -> Result<GroundStation, ConfigError> {
        GroundStation::from_coordinates(&self.station.coordinates, Some(self.station.altitude_m))
            .ok_or_else(|| ConfigError::Station(self.station.coordinates.clone()))
    }

    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        let i = &self.intervals;
        Ok(SessionSettings {
            intervals: LoopIntervals {
                pointing: parse_interval("pointing", &i.pointing)?,
                spectrometer: parse_interval("spectrometer", &i.spectrometer)?,
                sdr: parse_interval("sdr", &i.sdr)?,
                snapshot: parse_interval("snapshot", &i.snapshot)?,
            },
            shutdown_grace: parse_interval("shutdown_grace", &i.shutdown_grace)?,
            output: self.output.path.clone(),
        })
    }
}

fn parse_interval(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let interval = humantime::parse_duration(value.trim()).map_err(|e| ConfigError::Interval {
        name,
        message: e.to_string(),
    })?;
    if interval.is_zero() && name != "shutdown_grace" {
        return Err(ConfigError::Interval {
            name,
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_str("{}").unwrap();
        assert_eq!(config.hardware, HardwareConfig::Simulated);
        assert_eq!(config.station().unwrap(), GroundStation::default());

        let settings = config.session_settings().unwrap();
        assert_eq!(settings.intervals, LoopIntervals::default());
        assert_eq!(settings.shutdown_grace, Duration::from_secs(6));
        assert_eq!(settings.output, PathBuf::from("observations.json"));
    }

    #[test]
    fn full_config() {
        let yaml = r#"
station:
  coordinates: "52.91, 6.60"
  altitude_m: 15
output:
  path: /data/run1.json
intervals:
  pointing: 2s
  spectrometer: 500ms
  snapshot: 1m
hardware:
  backend: command
  pointer_cmd: "point {alt} {az}"
  spectrometer_cmd: "snap {prev}"
  sdr_cmd: "sdr {nsamples} {nblocks}"
"#;
        let config = Config::from_str(yaml).unwrap();
        let station = config.station().unwrap();
        assert_eq!(station.latitude_deg, 52.91);
        assert_eq!(station.altitude_m, 15.0);

        let settings = config.session_settings().unwrap();
        assert_eq!(settings.intervals.pointing, Duration::from_secs(2));
        assert_eq!(settings.intervals.spectrometer, Duration::from_millis(500));
        assert_eq!(settings.intervals.sdr, Duration::from_secs(1));
        assert_eq!(settings.intervals.snapshot, Duration::from_secs(60));
        assert_eq!(settings.output, PathBuf::from("/data/run1.json"));
        assert!(matches!(config.hardware, HardwareConfig::Command { .. }));
    }

    #[test]
    fn bad_values_are_reported() {
        let config = Config::from_str("station:\n  coordinates: nowhere\n").unwrap();
        assert!(matches!(config.station(), Err(ConfigError::Station(_))));

        let config = Config::from_str("intervals:\n  sdr: soon\n").unwrap();
        assert!(matches!(
            config.session_settings(),
            Err(ConfigError::Interval { name: "sdr", .. })
        ));

        let config = Config::from_str("intervals:\n  snapshot: 0s\n").unwrap();
        assert!(config.session_settings().is_err());

        assert!(Config::from_str("hardware:\n  backend: telepathy\n").is_err());
    }
}
