//! Host frame clock.
//!
//! Turns the timestamps a host's animation-frame callback receives (milliseconds, as
//! `requestAnimationFrame` or a game loop would hand them over) into the clamped `dt`
//! the particle field expects. The clamp keeps a resumed background tab from
//! integrating a multi-second step in one go.
//!
//! # Example
//!
//! ```
//! use wx_fx_core::FrameClock;
//!
//! let mut clock = FrameClock::starting_at(1_000.0);
//! assert!((clock.tick(1_016.0) - 0.016).abs() < 1e-6);
//! assert_eq!(clock.tick(9_000.0), 0.05); // long stall clamps
//! assert_eq!(clock.frame(), 2);
//! ```

/// Default upper bound on a single frame step, in seconds.
pub const DEFAULT_MAX_DT: f32 = 0.05;

/// Converts host timestamps into clamped per-frame deltas.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Timestamp of the previous tick (ms)
    last_ms: f64,
    /// Largest delta handed out (seconds)
    max_dt: f32,
    /// Total ticks since creation
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock whose first tick measures from `now_ms`.
    pub fn starting_at(now_ms: f64) -> Self {
        Self::with_max_dt(now_ms, DEFAULT_MAX_DT)
    }

    /// Create a clock with a custom clamp.
    pub fn with_max_dt(now_ms: f64, max_dt: f32) -> Self {
        Self {
            last_ms: now_ms,
            max_dt: max_dt.max(0.0),
            frame_count: 0,
        }
    }

    /// Advance to `now_ms` and return the elapsed time in seconds, clamped to `[0, max_dt]`.
    ///
    /// Timestamps running backwards yield 0 rather than a negative step.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let raw = ((now_ms - self.last_ms) / 1000.0) as f32;
        self.last_ms = now_ms;
        self.frame_count += 1;

        if raw.is_finite() {
            raw.clamp(0.0, self.max_dt)
        } else {
            0.0
        }
    }

    /// Total ticks since creation.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Timestamp of the most recent tick (ms).
    #[inline]
    pub fn last_timestamp(&self) -> f64 {
        self.last_ms
    }

    /// Clamp applied to every delta (seconds).
    #[inline]
    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }
}
