//! Barometer gauge
//!
//! Wraps a [`TweenAnimator`] and derives the dial's visual encodings from the
//! *interpolated* pressure on every frame: needle angle, arc dash offset, hue and the
//! position of the dot riding the arc. The trend label compares raw samples only.
//!
//! Pressure maps linearly from a clamped range (970-1040 hPa by default) onto a ratio
//! in `[0, 1]`; out-of-range samples pin the needle at an endpoint.
//!
//! ```
//! use wx_fx_core::{Barometer, GaugeConfig, Trend};
//!
//! let mut gauge = Barometer::new(GaugeConfig::default());
//! assert_eq!(gauge.submit(1010.0, 0.0), Trend::Stable);
//! assert_eq!(gauge.submit(1015.0, 100.0), Trend::Rising);
//!
//! let reading = gauge.tick(1_000.0).unwrap();
//! assert_eq!(reading.label, "1015 hPa");
//! ```

use crate::core_types::{Hectopascals, Vec2};
use crate::tween::{TweenAnimator, GAUGE_DURATION_MS};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Needle angle range. One sweep is used for the lifetime of a gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedleSweep {
    /// -135 deg to +45 deg
    #[default]
    Compact,
    /// -135 deg to +135 deg
    Full,
}

impl NeedleSweep {
    /// `(start, end)` angle in degrees.
    pub const fn range(self) -> (f32, f32) {
        match self {
            NeedleSweep::Compact => (-135.0, 45.0),
            NeedleSweep::Full => (-135.0, 135.0),
        }
    }

    /// Needle angle for a normalized ratio.
    pub fn angle(self, ratio: f32) -> f32 {
        let (start, end) = self.range();
        start + ratio * (end - start)
    }
}

/// Gauge tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Pressure mapped to ratio 0
    pub min_hpa: f32,
    /// Pressure mapped to ratio 1
    pub max_hpa: f32,
    /// Tween duration (ms)
    pub duration_ms: f64,
    pub sweep: NeedleSweep,
    /// Stroke length of the arc, for the dash offset
    pub arc_length: f32,
    /// Smallest change reported as rising/falling
    pub stable_threshold_hpa: f32,
    /// Hue at ratio 0
    pub hue_low: f32,
    /// Hue at ratio 1
    pub hue_high: f32,
    /// Dial centre in gauge-local units
    pub dial_center: Vec2,
    /// Radius the indicator dot rides on
    pub dial_radius: f32,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            min_hpa: 970.0,
            max_hpa: 1040.0,
            duration_ms: GAUGE_DURATION_MS,
            sweep: NeedleSweep::Compact,
            arc_length: 212.0,
            stable_threshold_hpa: 1.0,
            hue_low: 25.0,
            hue_high: 210.0,
            dial_center: Vec2::new(60.0, 60.0),
            dial_radius: 45.0,
        }
    }
}

impl GaugeConfig {
    /// Replace out-of-range values with usable ones, logging each correction.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let range_ok = self.min_hpa.is_finite() && self.max_hpa.is_finite() && self.min_hpa < self.max_hpa;
        if !range_ok {
            warn!(
                "Pressure range [{}, {}] invalid, using [{}, {}]",
                self.min_hpa, self.max_hpa, defaults.min_hpa, defaults.max_hpa
            );
            self.min_hpa = defaults.min_hpa;
            self.max_hpa = defaults.max_hpa;
        }
        if !(self.duration_ms.is_finite() && self.duration_ms >= 0.0) {
            warn!(
                "Gauge duration {} invalid, using {}",
                self.duration_ms, defaults.duration_ms
            );
            self.duration_ms = defaults.duration_ms;
        }
        if !(self.stable_threshold_hpa.is_finite() && self.stable_threshold_hpa >= 0.0) {
            warn!(
                "Stable threshold {} invalid, using {}",
                self.stable_threshold_hpa, defaults.stable_threshold_hpa
            );
            self.stable_threshold_hpa = defaults.stable_threshold_hpa;
        }

        self
    }
}

/// Clamp `pressure` into `[min, max]` and normalise to `[0, 1]`.
///
/// Returns 0 for an empty range.
pub fn pressure_ratio(pressure: f32, min: f32, max: f32) -> f32 {
    if max <= min {
        return 0.0;
    }
    (pressure.clamp(min, max) - min) / (max - min)
}

/// Direction of the latest raw pressure change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Trend {
    #[default]
    Stable,
    Rising,
    Falling,
}

impl Trend {
    pub const fn label(self) -> &'static str {
        match self {
            Trend::Stable => "Stable",
            Trend::Rising => "Rising",
            Trend::Falling => "Falling",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compare a new raw sample against the previous one.
///
/// No previous sample, or a change smaller than `threshold`, is [`Trend::Stable`].
pub fn classify_trend(previous: Option<f32>, current: f32, threshold: f32) -> Trend {
    let Some(previous) = previous else {
        return Trend::Stable;
    };
    let diff = current - previous;
    if diff.abs() < threshold {
        Trend::Stable
    } else if diff > 0.0 {
        Trend::Rising
    } else {
        Trend::Falling
    }
}

/// Visual encodings of one pressure value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeReading {
    /// Pressure the encodings were derived from (hPa)
    pub pressure: f32,
    /// Clamped, normalised position in the range
    pub ratio: f32,
    /// Needle rotation (degrees)
    pub needle_degrees: f32,
    /// Arc stroke-dash offset: 0 is a full arc
    pub dash_offset: f32,
    /// Rounded hue for the colour cue
    pub hue: f32,
    /// Indicator dot on the dial
    pub dot: Vec2,
    /// `"NNNN hPa"`
    pub label: String,
}

impl GaugeReading {
    /// Derive every encoding from `pressure`.
    pub fn compute(pressure: f32, config: &GaugeConfig) -> Self {
        let ratio = pressure_ratio(pressure, config.min_hpa, config.max_hpa);
        let needle_degrees = config.sweep.angle(ratio);
        let theta = (needle_degrees - 90.0).to_radians();

        Self {
            pressure,
            ratio,
            needle_degrees,
            dash_offset: (1.0 - ratio) * config.arc_length,
            hue: (config.hue_low + ratio * (config.hue_high - config.hue_low)).round(),
            dot: config.dial_center + Vec2::new(theta.cos(), theta.sin()) * config.dial_radius,
            label: Hectopascals::new(pressure).to_string(),
        }
    }
}

/// Animated barometer.
///
/// Owns its tween, the previous raw sample and the last trend.
#[derive(Debug, Clone)]
pub struct Barometer {
    config: GaugeConfig,
    animator: TweenAnimator,
    last_sample: Option<Hectopascals>,
    trend: Trend,
}

impl Barometer {
    pub fn new(config: GaugeConfig) -> Self {
        let config = config.sanitized();
        info!(
            "Creating barometer [{}, {}] hPa, {:?} sweep",
            config.min_hpa, config.max_hpa, config.sweep
        );
        Self {
            animator: TweenAnimator::new(config.duration_ms),
            config,
            last_sample: None,
            trend: Trend::Stable,
        }
    }

    /// Record a new sample and retarget the needle toward it.
    ///
    /// The trend is computed against the previous raw sample and the sample memory is
    /// updated even if the previous tween has not finished. `pressure` must be finite.
    pub fn submit(&mut self, pressure: impl Into<Hectopascals>, now_ms: f64) -> Trend {
        let pressure = pressure.into();
        let trend = classify_trend(
            self.last_sample.map(f32::from),
            pressure.value(),
            self.config.stable_threshold_hpa,
        );
        debug!(
            "Barometer sample {} (previous {:?}): {}",
            pressure, self.last_sample, trend
        );

        self.last_sample = Some(pressure);
        self.trend = trend;
        self.animator.submit(pressure.value(), now_ms);
        trend
    }

    /// Advance the needle. Returns the reading for this frame while animating.
    pub fn tick(&mut self, now_ms: f64) -> Option<GaugeReading> {
        let value = self.animator.tick(now_ms)?;
        Some(self.reading_for(value))
    }

    /// Reading for the latest target, as shown once the needle settles.
    pub fn reading_at_rest(&self) -> Option<GaugeReading> {
        self.animator.target().map(|p| self.reading_for(p))
    }

    /// Encodings for an arbitrary pressure under this gauge's config.
    pub fn reading_for(&self, pressure: f32) -> GaugeReading {
        GaugeReading::compute(pressure, &self.config)
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    pub fn last_sample(&self) -> Option<Hectopascals> {
        self.last_sample
    }

    /// Pressure currently on the dial.
    pub fn displayed_pressure(&self) -> Option<f32> {
        self.animator.displayed()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn animator(&self) -> &TweenAnimator {
        &self.animator
    }
}

impl Default for Barometer {
    fn default() -> Self {
        Self::new(GaugeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needle_ranges() {
        assert_eq!(NeedleSweep::Compact.angle(0.0), -135.0);
        assert_eq!(NeedleSweep::Compact.angle(1.0), 45.0);
        assert_eq!(NeedleSweep::Full.angle(0.5), 0.0);
    }

    #[test]
    fn test_reading_encodings_at_midpoint() {
        let reading = GaugeReading::compute(1005.0, &GaugeConfig::default());
        assert!((reading.ratio - 0.5).abs() < 1e-6);
        assert!((reading.needle_degrees + 45.0).abs() < 1e-4);
        assert!((reading.dash_offset - 106.0).abs() < 1e-4);
        assert_eq!(reading.hue, 118.0);
        assert_eq!(reading.label, "1005 hPa");
    }

    #[test]
    fn test_dot_rides_the_dial() {
        let config = GaugeConfig {
            sweep: NeedleSweep::Full,
            ..Default::default()
        };
        // needle at 0 deg points straight up
        let reading = GaugeReading::compute(1005.0, &config);
        assert!((reading.dot.x - 60.0).abs() < 1e-4);
        assert!((reading.dot.y - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_first_sample_is_stable() {
        assert_eq!(classify_trend(None, 990.0, 1.0), Trend::Stable);
        assert_eq!(classify_trend(Some(1010.0), 1009.0, 1.0), Trend::Falling);
    }

    #[test]
    fn test_sanitize_inverted_range() {
        let config = GaugeConfig {
            min_hpa: 1040.0,
            max_hpa: 970.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.min_hpa, 970.0);
        assert_eq!(config.max_hpa, 1040.0);
    }

    #[test]
    fn test_trend_memory_updates_before_tween_finishes() {
        let mut gauge = Barometer::default();
        gauge.submit(1000.0, 0.0);
        gauge.submit(1003.0, 10.0);
        assert!(gauge.is_animating());
        assert_eq!(gauge.submit(1003.4, 20.0), Trend::Stable);
        assert_eq!(gauge.last_sample(), Some(Hectopascals::new(1003.4)));
    }
}
