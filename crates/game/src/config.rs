//! Simulation configuration. Loaded from config.ron at startup.

use camera::CameraConfig;
use drone::{EnergyConfig, FlightConfig};
use engine_core::{Vec3, DEFAULT_FIXED_RATE_HZ};
use input::InputConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Static box placed in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Obstacle {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Rotation about world Y, radians.
    pub rotation_y: f32,
}

impl Default for Obstacle {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            half_extents: Vec3::ONE,
            rotation_y: 0.0,
        }
    }
}

/// Every tunable of a drone session. Missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed tick rate for input, energy, flight and physics.
    pub fixed_rate_hz: f64,
    pub spawn_position: Vec3,
    pub obstacles: Vec<Obstacle>,
    pub input: InputConfig,
    pub energy: EnergyConfig,
    pub flight: FlightConfig,
    pub camera: CameraConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_rate_hz: DEFAULT_FIXED_RATE_HZ,
            spawn_position: Vec3::new(0.0, 2.0, 0.0),
            obstacles: Vec::new(),
            input: InputConfig::default(),
            energy: EnergyConfig::default(),
            flight: FlightConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&data)
    }

    pub fn from_ron_str(data: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(data)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let data = self.to_ron_string()?;
        std::fs::write(path, data).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Err(e) = self.save_to(&path) {
            log::warn!("Could not write config to {:?}: {}", path, e);
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone::RechargePolicy;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = SimConfig::from_ron_str("()").unwrap();
        assert_eq!(config.fixed_rate_hz, 50.0);
        assert_eq!(config.flight.thrust, 25.0);
        assert_eq!(config.energy.max_energy, 100.0);
        assert_eq!(config.input.smoothing_factor, 0.3);
        assert_eq!(config.camera.top_down_height, 10.0);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = SimConfig::from_ron_str(
            "(fixed_rate_hz: 100.0, energy: (max_energy: 50.0, \
             recharge_policy: BelowConsumptionFloor(floor: 0.05)))",
        )
        .unwrap();
        assert_eq!(config.fixed_rate_hz, 100.0);
        assert_eq!(config.energy.max_energy, 50.0);
        assert_eq!(config.energy.critical_threshold, 20.0);
        assert_eq!(
            config.energy.recharge_policy,
            RechargePolicy::BelowConsumptionFloor { floor: 0.05 }
        );
        assert_eq!(config.flight.pitch_power, 5.0);
    }

    #[test]
    fn pretty_output_reads_back() {
        let mut config = SimConfig::default();
        config.spawn_position = Vec3::new(1.0, 3.0, -2.0);
        config.obstacles.push(Obstacle {
            center: Vec3::new(0.0, 2.0, -6.0),
            half_extents: Vec3::new(4.0, 2.0, 0.5),
            rotation_y: 0.0,
        });
        let text = config.to_ron_string().unwrap();
        let back = SimConfig::from_ron_str(&text).unwrap();
        assert_eq!(back.spawn_position, config.spawn_position);
        assert_eq!(back.obstacles.len(), 1);
        assert_eq!(back.obstacles[0].half_extents, Vec3::new(4.0, 2.0, 0.5));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = SimConfig::from_ron_str("(fixed_rate_hz: \"fast\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("cyberdrone-no-such-config.ron");
        let err = SimConfig::from_path(&path).unwrap_err();
        match err {
            ConfigError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn save_to_then_from_path() {
        let path =
            std::env::temp_dir().join(format!("cyberdrone-config-{}.ron", std::process::id()));
        let mut config = SimConfig::default();
        config.flight.crash_speed_threshold = 7.5;
        config.save_to(&path).unwrap();
        let back = SimConfig::from_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back.flight.crash_speed_threshold, 7.5);
    }
}
