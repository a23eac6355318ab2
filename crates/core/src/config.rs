//! Engine configuration
//!
//! Every field has a default matching the stock presentation, so hosts usually
//! override one or two values with struct-update syntax:
//!
//! ```
//! use wx_fx_core::FxConfig;
//!
//! let config = FxConfig {
//!     population_step: 4,
//!     ..Default::default()
//! };
//! assert_eq!(config.max_particles, 220);
//! ```
//!
//! Configs can also be stored as JSON; missing keys fall back to the defaults.

use crate::gauge::GaugeConfig;
use crate::surface::MAX_DEVICE_PIXEL_RATIO;
use crate::tween::POP_DURATION_MS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Hard cap on the particle pool.
pub const MAX_PARTICLES: usize = 220;

/// Particle field tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Pool cap, at most [`MAX_PARTICLES`]
    pub max_particles: usize,
    /// Largest `dt` integrated in one frame (seconds)
    pub max_dt: f32,
    /// Wind normalization: `wind = mph / wind_divisor`
    pub wind_divisor: f32,
    /// Intensity at or below which the field is suspended
    pub suspend_threshold: f32,
    /// Particles spawned or removed per frame while converging
    pub population_step: usize,
    /// Initial global opacity
    pub default_opacity: f32,
    /// Device-pixel-ratio cap for backing buffers
    pub max_device_pixel_ratio: f32,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            max_particles: MAX_PARTICLES,
            max_dt: crate::clock::DEFAULT_MAX_DT,
            wind_divisor: 30.0,
            suspend_threshold: 0.01,
            population_step: 1,
            default_opacity: 0.55,
            max_device_pixel_ratio: MAX_DEVICE_PIXEL_RATIO,
        }
    }
}

impl FxConfig {
    /// Replace out-of-range values with usable ones, logging each correction.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.max_particles == 0 || self.max_particles > MAX_PARTICLES {
            let fixed = self.max_particles.clamp(1, MAX_PARTICLES);
            warn!(
                "max_particles {} out of range, using {}",
                self.max_particles, fixed
            );
            self.max_particles = fixed;
        }
        if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
            warn!("max_dt {} invalid, using {}", self.max_dt, defaults.max_dt);
            self.max_dt = defaults.max_dt;
        }
        if !(self.wind_divisor.is_finite() && self.wind_divisor > 0.0) {
            warn!(
                "wind_divisor {} invalid, using {}",
                self.wind_divisor, defaults.wind_divisor
            );
            self.wind_divisor = defaults.wind_divisor;
        }
        if !self.suspend_threshold.is_finite() {
            warn!(
                "suspend_threshold {} invalid, using {}",
                self.suspend_threshold, defaults.suspend_threshold
            );
            self.suspend_threshold = defaults.suspend_threshold;
        }
        if self.population_step == 0 {
            warn!("population_step 0 would never converge, using 1");
            self.population_step = 1;
        }
        if !(0.0..=1.0).contains(&self.default_opacity) {
            let fixed = if self.default_opacity.is_nan() {
                defaults.default_opacity
            } else {
                self.default_opacity.clamp(0.0, 1.0)
            };
            warn!(
                "default_opacity {} out of range, using {}",
                self.default_opacity, fixed
            );
            self.default_opacity = fixed;
        }
        if !(self.max_device_pixel_ratio.is_finite() && self.max_device_pixel_ratio >= 1.0) {
            warn!(
                "max_device_pixel_ratio {} invalid, using {}",
                self.max_device_pixel_ratio, defaults.max_device_pixel_ratio
            );
            self.max_device_pixel_ratio = defaults.max_device_pixel_ratio;
        }

        self
    }
}

/// Complete configuration for a host embedding both components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Particle field tuning
    pub fx: FxConfig,
    /// Barometer gauge tuning
    pub gauge: GaugeConfig,
    /// Duration of the numeric pop animation (ms)
    pub pop_duration_ms: f64,
    /// RNG seed for reproducible particle runs (`None` seeds from the OS)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fx: FxConfig::default(),
            gauge: GaugeConfig::default(),
            pop_duration_ms: POP_DURATION_MS,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        let config: Self =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;

        Ok(config.validate())
    }

    /// Save configuration to a JSON file
    ///
    /// # Errors
    /// Returns error if file cannot be written or config cannot be serialized
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeFailed(e.to_string()))?;

        fs::write(path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        Ok(())
    }

    /// Normalise nonsense values, logging each correction.
    #[must_use]
    pub fn validate(mut self) -> Self {
        self.fx = self.fx.sanitized();
        self.gauge = self.gauge.sanitized();

        if !(self.pop_duration_ms.is_finite() && self.pop_duration_ms >= 0.0) {
            warn!(
                "pop_duration_ms {} invalid, using {}",
                self.pop_duration_ms, POP_DURATION_MS
            );
            self.pop_duration_ms = POP_DURATION_MS;
        }

        self
    }
}

/// Errors that can occur loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read file
    LoadFailed(String),
    /// Failed to parse file contents
    ParseFailed(String),
    /// Failed to serialize config
    SerializeFailed(String),
    /// Failed to write file
    SaveFailed(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadFailed(msg) => write!(f, "Failed to load config: {msg}"),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {msg}"),
            ConfigError::SerializeFailed(msg) => write!(f, "Failed to serialize config: {msg}"),
            ConfigError::SaveFailed(msg) => write!(f, "Failed to save config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::NeedleSweep;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "fx": { "population_step": 3 }, "seed": 42 }"#).unwrap();
        assert_eq!(config.fx.population_step, 3);
        assert_eq!(config.fx.max_particles, MAX_PARTICLES);
        assert_eq!(config.gauge, GaugeConfig::default());
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_validate_corrects_nonsense() {
        let config = EngineConfig {
            fx: FxConfig {
                max_particles: 0,
                max_dt: -1.0,
                population_step: 0,
                default_opacity: 4.0,
                ..Default::default()
            },
            pop_duration_ms: f64::NAN,
            ..Default::default()
        }
        .validate();

        assert_eq!(config.fx.max_particles, 1);
        assert_eq!(config.fx.max_dt, 0.05);
        assert_eq!(config.fx.population_step, 1);
        assert_eq!(config.fx.default_opacity, 1.0);
        assert_eq!(config.pop_duration_ms, POP_DURATION_MS);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("wx-fx-config-{}.json", std::process::id()));
        let config = EngineConfig {
            gauge: GaugeConfig {
                sweep: NeedleSweep::Full,
                ..Default::default()
            },
            seed: Some(7),
            ..Default::default()
        };

        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_reports_error() {
        let err = EngineConfig::load("/nonexistent/wx-fx.json").unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed(_)));
        assert!(err.to_string().starts_with("Failed to load config"));
    }
}
