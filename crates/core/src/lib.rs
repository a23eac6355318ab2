//! Ambient Weather FX Core Library
//!
//! Frame-driven visual effects that sit behind a weather display:
//!
//! - [`ParticleField`] - a bounded particle pool rendering rain, snow, fog or drifting dust,
//!   steered by `{mode, intensity, wind}` updates from the weather controller
//! - [`TweenAnimator`] - cubic ease-out interpolation that retargets mid-flight from the
//!   value currently on screen
//! - [`Barometer`] - a pressure gauge built on the animator (needle angle, arc fill, hue ramp
//!   and a rising/falling trend label)
//!
//! Both components are single-threaded and cooperative. The host owns the frame loop and
//! passes elapsed time in explicitly; nothing in this crate reads a wall clock or blocks.
//!
//! ## Quick Start
//!
//! ```
//! use wx_fx_core::{CommandBuffer, FxMode, FxUpdate, ParticleField, SurfaceGeometry};
//!
//! let mut field = ParticleField::new(SurfaceGeometry::from_layout(800.0, 480.0, 1.0)).with_seed(7);
//! field.set(FxUpdate::new().mode(FxMode::Rain).intensity(0.6).wind_mph(8.0));
//!
//! let mut surface = CommandBuffer::new();
//! for _ in 0..120 {
//!     field.step(1.0 / 60.0, &mut surface);
//! }
//! assert!(field.live_count() > 0);
//! ```

// Core types and utilities
pub mod core_types;

// Drawing target, geometry and host-facing frame helpers
pub mod clock;
pub mod motion;
pub mod surface;

// Simulation components
pub mod fx;
pub mod gauge;
pub mod tween;

// Configuration
pub mod config;

// Re-export core types
pub use core_types::{Hectopascals, MilesPerHour, UnitInterval, Vec2};

// Re-export host-facing helpers
pub use clock::FrameClock;
pub use motion::{MotionPreference, NoMotionPreference, SharedMotionPreference};
pub use surface::{CommandBuffer, DrawCommand, DrawKind, Surface, SurfaceGeometry};

// Re-export simulation types
pub use config::{ConfigError, EngineConfig, FxConfig};
pub use fx::{FrameOutcome, FxMode, FxState, FxUpdate, Particle, ParticleField};
pub use gauge::{Barometer, GaugeConfig, GaugeReading, NeedleSweep, Trend};
pub use tween::{ease_out_cubic, FrameRequest, FrameResult, Tween, TweenAnimator};
