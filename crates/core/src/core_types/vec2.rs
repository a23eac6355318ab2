//! Vector type alias for surface-local positions and velocities.

use nalgebra::Vector2;

/// 2D vector type for positions, velocities, and dial points.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`. Coordinates are logical
/// (CSS-style) pixels on the drawing surface; device-pixel scaling is applied by the host.
pub type Vec2 = Vector2<f32>;
