use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

use crate::scheduler::SyncSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub satellites: SatellitesConfig,
    pub passes: PassesConfig,
    pub pass_track: PassTrackConfig,
    pub orbit: OrbitConfig,
    pub position: PositionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SatellitesConfig {
    #[serde(default = "default_preferred")]
    pub preferred: Option<String>,
}

fn default_preferred() -> Option<String> {
    Some("ISS".to_string())
}

impl Default for SatellitesConfig {
    fn default() -> Self {
        Self {
            preferred: default_preferred(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassesConfig {
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    #[serde(default = "default_min_elevation")]
    pub min_elevation_deg: f64,
    #[serde(
        default = "default_pass_refresh",
        deserialize_with = "deserialize_duration"
    )]
    pub refresh: Duration,
}

fn default_window_hours() -> u32 {
    48
}

fn default_min_elevation() -> f64 {
    10.0
}

fn default_pass_refresh() -> Duration {
    Duration::from_secs(60)
}

impl Default for PassesConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            min_elevation_deg: default_min_elevation(),
            refresh: default_pass_refresh(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassTrackConfig {
    #[serde(default = "default_step_seconds")]
    pub step_seconds: u32,
}

fn default_step_seconds() -> u32 {
    10
}

impl Default for PassTrackConfig {
    fn default() -> Self {
        Self {
            step_seconds: default_step_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrbitConfig {
    #[serde(default = "default_look_ahead")]
    pub look_ahead_minutes: u32,
    #[serde(default = "default_step_seconds")]
    pub step_seconds: u32,
    #[serde(
        default = "default_orbit_refresh",
        deserialize_with = "deserialize_duration"
    )]
    pub refresh: Duration,
}

fn default_look_ahead() -> u32 {
    20
}

fn default_orbit_refresh() -> Duration {
    Duration::from_secs(30)
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            look_ahead_minutes: default_look_ahead(),
            step_seconds: default_step_seconds(),
            refresh: default_orbit_refresh(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionConfig {
    #[serde(
        default = "default_position_refresh",
        deserialize_with = "deserialize_duration"
    )]
    pub refresh: Duration,
}

fn default_position_refresh() -> Duration {
    Duration::from_millis(1500)
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            refresh: default_position_refresh(),
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
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, message: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                message: message.to_string(),
            })
        };

        if !(1..=240).contains(&self.passes.window_hours) {
            return invalid("passes.window_hours", "must be between 1 and 240");
        }
        if !(0.0..=90.0).contains(&self.passes.min_elevation_deg) {
            return invalid("passes.min_elevation_deg", "must be between 0 and 90");
        }
        if !(1..=180).contains(&self.orbit.look_ahead_minutes) {
            return invalid("orbit.look_ahead_minutes", "must be between 1 and 180");
        }
        for (field, step) in [
            ("pass_track.step_seconds", self.pass_track.step_seconds),
            ("orbit.step_seconds", self.orbit.step_seconds),
        ] {
            if !(1..=120).contains(&step) {
                return invalid(field, "must be between 1 and 120");
            }
        }
        for (field, period) in [
            ("passes.refresh", self.passes.refresh),
            ("orbit.refresh", self.orbit.refresh),
            ("position.refresh", self.position.refresh),
        ] {
            if period.is_zero() {
                return invalid(field, "must be greater than zero");
            }
        }
        Ok(())
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            preferred_satellite: self.satellites.preferred.clone(),
            pass_window_hours: self.passes.window_hours,
            min_elevation_deg: self.passes.min_elevation_deg,
            pass_refresh: self.passes.refresh,
            pass_track_step_seconds: self.pass_track.step_seconds,
            orbit_look_ahead_minutes: self.orbit.look_ahead_minutes,
            orbit_step_seconds: self.orbit.step_seconds,
            orbit_refresh: self.orbit.refresh,
            position_refresh: self.position.refresh,
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
