//! FX modes, state and partial updates.

use crate::core_types::{MilesPerHour, UnitInterval};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete ambient-weather category governing spawn and physics rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FxMode {
    /// Fast diagonal streaks
    Rain,
    /// Slow wobbling flakes
    Snow,
    /// A few large soft blobs drifting sideways
    Fog,
    /// Sparse motes drifting on the ambient air (fallback for dry conditions)
    #[default]
    Dust,
}

impl FxMode {
    /// All modes, in table order.
    pub const ALL: [FxMode; 4] = [FxMode::Rain, FxMode::Snow, FxMode::Fog, FxMode::Dust];

    /// `(base, span)` of the population table: `floor(base + intensity * span)`.
    const fn population_curve(self) -> (f32, f32) {
        match self {
            FxMode::Rain => (50.0, 170.0),
            FxMode::Snow => (30.0, 120.0),
            FxMode::Fog => (6.0, 16.0),
            FxMode::Dust => (10.0, 22.0),
        }
    }

    /// Live-particle target for this mode at `intensity`, capped at `cap`.
    ///
    /// Monotonically non-decreasing in intensity. Intensity outside `[0, 1]` is clamped first.
    pub fn target_count(self, intensity: f32, cap: usize) -> usize {
        let (base, span) = self.population_curve();
        let i = *UnitInterval::new(intensity);
        ((base + i * span).floor() as usize).min(cap)
    }

    /// Lowercase name (`"rain"`, `"snow"`, `"fog"`, `"dust"`).
    pub const fn name(self) -> &'static str {
        match self {
            FxMode::Rain => "rain",
            FxMode::Snow => "snow",
            FxMode::Fog => "fog",
            FxMode::Dust => "dust",
        }
    }

    /// Classify a WMO weather code into an FX mode.
    ///
    /// Fog (45-48) wins over snow (71-77, 85-86), which wins over rain
    /// (51-67, 80-82, thunderstorms 95+). Everything else falls back to dust.
    pub fn from_weather_code(code: u16) -> Self {
        let is_fog = (45..=48).contains(&code);
        let is_snow = (71..=77).contains(&code) || (85..=86).contains(&code);
        let is_rain = (51..=67).contains(&code) || (80..=82).contains(&code) || code >= 95;

        if is_fog {
            FxMode::Fog
        } else if is_snow {
            FxMode::Snow
        } else if is_rain {
            FxMode::Rain
        } else {
            FxMode::Dust
        }
    }

    /// Stable numeric tag used across FFI (`0` rain .. `3` dust).
    pub const fn as_raw(self) -> i32 {
        match self {
            FxMode::Rain => 0,
            FxMode::Snow => 1,
            FxMode::Fog => 2,
            FxMode::Dust => 3,
        }
    }

    /// Decode a numeric tag produced by [`FxMode::as_raw`].
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(FxMode::Rain),
            1 => Some(FxMode::Snow),
            2 => Some(FxMode::Fog),
            3 => Some(FxMode::Dust),
            _ => None,
        }
    }
}

impl fmt::Display for FxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFxModeError(String);

impl fmt::Display for ParseFxModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown FX mode '{}' (expected rain, snow, fog or dust)",
            self.0
        )
    }
}

impl std::error::Error for ParseFxModeError {}

impl FromStr for FxMode {
    type Err = ParseFxModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rain" => Ok(FxMode::Rain),
            "snow" => Ok(FxMode::Snow),
            "fog" => Ok(FxMode::Fog),
            "dust" => Ok(FxMode::Dust),
            other => Err(ParseFxModeError(other.to_string())),
        }
    }
}

/// Global FX settings. Mutated only through [`FxState::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxState {
    /// Active particle mode
    pub mode: FxMode,
    /// Density driver, `[0, 1]`
    pub intensity: UnitInterval,
    /// Wind speed supplied upstream
    pub wind_mph: MilesPerHour,
    /// Global multiplier on every particle's alpha, `[0, 1]`
    pub opacity: UnitInterval,
}

impl FxState {
    /// Default opacity for a freshly created field.
    pub const DEFAULT_OPACITY: f32 = 0.55;

    /// Shallow merge: fields absent from `update` keep their current value.
    pub fn merge(&mut self, update: &FxUpdate) {
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(intensity) = update.intensity {
            self.intensity = UnitInterval::new(intensity);
        }
        if let Some(wind) = update.wind_mph {
            self.wind_mph = MilesPerHour::new(wind);
        }
        if let Some(opacity) = update.opacity {
            self.opacity = UnitInterval::new(opacity);
        }
    }

    /// Target population for the current mode and intensity.
    pub fn target_count(&self, cap: usize) -> usize {
        self.mode.target_count(*self.intensity, cap)
    }
}

impl Default for FxState {
    fn default() -> Self {
        Self {
            mode: FxMode::Dust,
            intensity: UnitInterval::ZERO,
            wind_mph: MilesPerHour::CALM,
            opacity: UnitInterval::new(Self::DEFAULT_OPACITY),
        }
    }
}

/// Partial state update pushed by the weather controller.
///
/// ```
/// use wx_fx_core::{FxMode, FxUpdate};
///
/// let update = FxUpdate::new().mode(FxMode::Snow).intensity(0.4);
/// assert_eq!(update.wind_mph, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FxUpdate {
    /// New mode, if changing
    pub mode: Option<FxMode>,
    /// New intensity (clamped into `[0, 1]` on merge)
    pub intensity: Option<f32>,
    /// New wind speed in mph
    pub wind_mph: Option<f32>,
    /// New global opacity (clamped into `[0, 1]` on merge)
    pub opacity: Option<f32>,
}

impl FxUpdate {
    /// Empty update (no change).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode.
    pub fn mode(mut self, mode: FxMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the intensity.
    pub fn intensity(mut self, intensity: f32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    /// Set the wind speed (mph).
    pub fn wind_mph(mut self, wind_mph: f32) -> Self {
        self.wind_mph = Some(wind_mph);
        self
    }

    /// Set the global opacity.
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Whether this update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.intensity.is_none()
            && self.wind_mph.is_none()
            && self.opacity.is_none()
    }

    /// Build the controller's update from current conditions.
    ///
    /// # Arguments
    ///
    /// * `weather_code` - WMO weather code of the current hour
    /// * `precipitation_probability` - Percent chance of precipitation (absent means 0)
    /// * `wind_mph` - Wind speed in mph, whatever unit the display uses
    pub fn from_conditions(
        weather_code: u16,
        precipitation_probability: Option<f32>,
        wind_mph: f32,
    ) -> Self {
        let intensity = *UnitInterval::new(precipitation_probability.unwrap_or(0.0) / 100.0);
        Self::new()
            .mode(FxMode::from_weather_code(weather_code))
            .intensity(intensity)
            .wind_mph(wind_mph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_table_endpoints() {
        assert_eq!(FxMode::Rain.target_count(0.0, 220), 50);
        assert_eq!(FxMode::Rain.target_count(1.0, 220), 220);
        assert_eq!(FxMode::Snow.target_count(0.5, 220), 90);
        assert_eq!(FxMode::Fog.target_count(1.0, 220), 22);
        assert_eq!(FxMode::Dust.target_count(0.25, 220), 15);
    }

    #[test]
    fn test_population_respects_cap() {
        assert_eq!(FxMode::Rain.target_count(1.0, 100), 100);
        assert_eq!(FxMode::Rain.target_count(7.0, 220), 220);
    }

    #[test]
    fn test_weather_code_classification() {
        assert_eq!(FxMode::from_weather_code(0), FxMode::Dust);
        assert_eq!(FxMode::from_weather_code(3), FxMode::Dust);
        assert_eq!(FxMode::from_weather_code(45), FxMode::Fog);
        assert_eq!(FxMode::from_weather_code(53), FxMode::Rain);
        assert_eq!(FxMode::from_weather_code(73), FxMode::Snow);
        assert_eq!(FxMode::from_weather_code(81), FxMode::Rain);
        assert_eq!(FxMode::from_weather_code(86), FxMode::Snow);
        assert_eq!(FxMode::from_weather_code(99), FxMode::Rain);
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut state = FxState::default();
        state.merge(&FxUpdate::new().mode(FxMode::Rain).wind_mph(12.0));
        state.merge(&FxUpdate::new().intensity(1.8));

        assert_eq!(state.mode, FxMode::Rain);
        assert_eq!(*state.wind_mph, 12.0);
        assert_eq!(*state.intensity, 1.0);
        assert_eq!(*state.opacity, FxState::DEFAULT_OPACITY);
    }

    #[test]
    fn test_from_conditions_normalizes_probability() {
        let update = FxUpdate::from_conditions(61, Some(70.0), 9.0);
        assert_eq!(update.mode, Some(FxMode::Rain));
        assert!((update.intensity.unwrap() - 0.7).abs() < 1e-6);

        let dry = FxUpdate::from_conditions(1, None, 3.0);
        assert_eq!(dry.intensity, Some(0.0));
    }

    #[test]
    fn test_mode_parse_and_raw_tags() {
        assert_eq!(" Snow ".parse::<FxMode>(), Ok(FxMode::Snow));
        assert!("hail".parse::<FxMode>().is_err());
        for mode in FxMode::ALL {
            assert_eq!(FxMode::from_raw(mode.as_raw()), Some(mode));
        }
        assert_eq!(FxMode::from_raw(9), None);
    }
}
