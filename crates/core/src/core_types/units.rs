//! Semantic unit types for the numeric signals the weather controller supplies
//!
//! Newtype wrappers keep wind speed, pressure and normalized driver values from being
//! mixed up at the boundary between the upstream controller and the FX components.
//!
//! # Design Philosophy
//! - All types wrap `f32`; the values drive visuals, not physics
//! - Total ordering via `Ord` (NaN handled as greater than all values)
//! - `Deref` to the raw value for arithmetic-heavy call sites
//! - Serde support for configuration and snapshots
//!
//! # Usage
//! ```
//! use wx_fx_core::core_types::units::{Hectopascals, MilesPerHour, UnitInterval};
//!
//! let wind = MilesPerHour::new(15.0);
//! assert!((wind.normalized(30.0) - 0.5).abs() < 1e-6);
//!
//! let intensity = UnitInterval::new(1.4);
//! assert_eq!(*intensity, 1.0);
//!
//! assert_eq!(Hectopascals::new(1013.4).to_string(), "1013 hPa");
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, Sub};

/// Compare f32 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f32_total_cmp(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}

// ============================================================================
// WIND
// ============================================================================

/// Wind speed in miles per hour.
///
/// The upstream controller supplies wind in mph regardless of the unit the display is
/// showing, so this is the only wind unit the FX engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MilesPerHour(f32);

impl Eq for MilesPerHour {}

impl PartialOrd for MilesPerHour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MilesPerHour {
    fn cmp(&self, other: &Self) -> Ordering {
        f32_total_cmp(self.0, other.0)
    }
}

impl Deref for MilesPerHour {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl MilesPerHour {
    /// Calm air.
    pub const CALM: MilesPerHour = MilesPerHour(0.0);

    /// Create a new wind speed. Negative input is treated as calm.
    #[inline]
    #[must_use]
    pub fn new(value: f32) -> Self {
        MilesPerHour(value.max(0.0))
    }

    /// Wind as a dimensionless bias: `mph / divisor` (roughly 0..1 for everyday wind).
    #[inline]
    #[must_use]
    pub fn normalized(self, divisor: f32) -> f32 {
        if divisor > 0.0 {
            self.0 / divisor
        } else {
            0.0
        }
    }
}

impl From<f32> for MilesPerHour {
    fn from(v: f32) -> Self {
        MilesPerHour::new(v)
    }
}

impl fmt::Display for MilesPerHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} mph", self.0)
    }
}

// ============================================================================
// PRESSURE
// ============================================================================

/// Atmospheric pressure in hectopascals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hectopascals(f32);

impl Eq for Hectopascals {}

impl PartialOrd for Hectopascals {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hectopascals {
    fn cmp(&self, other: &Self) -> Ordering {
        f32_total_cmp(self.0, other.0)
    }
}

impl Deref for Hectopascals {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl Hectopascals {
    /// Standard sea-level pressure.
    pub const STANDARD: Hectopascals = Hectopascals(1013.25);

    /// Create a new pressure value.
    ///
    /// The value must be finite; callers reject NaN/inf samples before they reach a gauge.
    #[inline]
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Hectopascals(value)
    }

    /// Get the raw f32 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<f32> for Hectopascals {
    fn from(v: f32) -> Self {
        Hectopascals(v)
    }
}

impl From<Hectopascals> for f32 {
    fn from(p: Hectopascals) -> f32 {
        p.0
    }
}

impl Sub for Hectopascals {
    type Output = f32;
    fn sub(self, rhs: Hectopascals) -> f32 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Hectopascals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hPa", self.0.round() as i64)
    }
}

// ============================================================================
// NORMALIZED DRIVERS
// ============================================================================

/// A value clamped into `[0, 1]` (intensity, opacity).
///
/// NaN input clamps to 0 so a malformed upstream value never leaves the range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(from = "f32", into = "f32")]
pub struct UnitInterval(f32);

impl Eq for UnitInterval {}

impl PartialOrd for UnitInterval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnitInterval {
    fn cmp(&self, other: &Self) -> Ordering {
        f32_total_cmp(self.0, other.0)
    }
}

impl Deref for UnitInterval {
    type Target = f32;
    #[inline]
    fn deref(&self) -> &f32 {
        &self.0
    }
}

impl UnitInterval {
    /// Lower bound.
    pub const ZERO: UnitInterval = UnitInterval(0.0);

    /// Upper bound.
    pub const ONE: UnitInterval = UnitInterval(1.0);

    /// Create a new value, clamping into `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return UnitInterval(0.0);
        }
        UnitInterval(value.clamp(0.0, 1.0))
    }

    /// Get the raw f32 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<f32> for UnitInterval {
    fn from(v: f32) -> Self {
        UnitInterval::new(v)
    }
}

impl From<UnitInterval> for f32 {
    fn from(v: UnitInterval) -> f32 {
        v.0
    }
}

impl fmt::Display for UnitInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_interval_clamps() {
        assert_eq!(*UnitInterval::new(-0.3), 0.0);
        assert_eq!(*UnitInterval::new(0.42), 0.42);
        assert_eq!(*UnitInterval::new(3.0), 1.0);
        assert_eq!(*UnitInterval::new(f32::NAN), 0.0);
    }

    #[test]
    fn test_unit_interval_deserialize_clamps() {
        let v: UnitInterval = serde_json::from_str("1.7").unwrap();
        assert_eq!(v, UnitInterval::ONE);
    }

    #[test]
    fn test_wind_normalization() {
        assert_eq!(MilesPerHour::new(-4.0), MilesPerHour::CALM);
        assert!((MilesPerHour::new(45.0).normalized(30.0) - 1.5).abs() < 1e-6);
        assert_eq!(MilesPerHour::new(10.0).normalized(0.0), 0.0);
    }

    #[test]
    fn test_pressure_display_rounds() {
        assert_eq!(Hectopascals::new(1009.6).to_string(), "1010 hPa");
        assert_eq!(Hectopascals::new(1015.0) - Hectopascals::new(1010.0), 5.0);
    }
}
