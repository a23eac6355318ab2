//! Drawing surface abstraction and geometry
//!
//! The FX engine never talks to a graphics API directly. Every frame it clears a
//! [`Surface`] and issues a handful of primitive draw calls in logical coordinates;
//! the host maps them onto a canvas, a GPU quad batch or a terminal.
//!
//! [`CommandBuffer`] is the reference implementation: it records each frame as a flat
//! list of `#[repr(C)]` [`DrawCommand`]s that can be handed across FFI or uploaded to a
//! vertex buffer with [`CommandBuffer::as_floats`].

use crate::core_types::Vec2;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Upper bound for device-pixel-ratio scaling of the backing buffer.
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 2.0;

/// Logical size of the drawing surface plus the device-pixel scale the host should apply.
///
/// Derived from the host element's layout box. A zero-size or NaN box degrades to a
/// 1x1 logical surface instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    /// Logical width (>= 1)
    pub width: f32,
    /// Logical height (>= 1)
    pub height: f32,
    /// Device-pixel scale, capped at [`MAX_DEVICE_PIXEL_RATIO`]
    pub scale: f32,
}

impl SurfaceGeometry {
    /// Build geometry from a layout box and device pixel ratio using the default 2x cap.
    pub fn from_layout(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self::from_layout_capped(width, height, device_pixel_ratio, MAX_DEVICE_PIXEL_RATIO)
    }

    /// Build geometry with an explicit device-pixel-ratio cap.
    pub fn from_layout_capped(width: f32, height: f32, device_pixel_ratio: f32, max_ratio: f32) -> Self {
        // f32::max ignores NaN, so NaN boxes land on the 1px floor
        let width = width.floor().max(1.0);
        let height = height.floor().max(1.0);
        let scale = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(max_ratio.max(1.0))
        } else {
            1.0
        };

        Self {
            width,
            height,
            scale,
        }
    }

    /// Pixel dimensions of the backing buffer `(floor(w * scale), floor(h * scale))`.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale).floor() as u32,
            (self.height * self.scale).floor() as u32,
        )
    }

    /// Logical size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            scale: 1.0,
        }
    }
}

/// Drawing target for one frame of FX output.
///
/// All coordinates are logical pixels. `alpha` is the final per-op opacity
/// (particle weight times the global opacity setting).
pub trait Surface {
    /// Erase the whole surface. Called once at the start of every frame.
    fn clear(&mut self, width: f32, height: f32);

    /// Stroke an anti-aliased line segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, line_width: f32, alpha: f32);

    /// Fill a solid circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, alpha: f32);

    /// Fill a radial-gradient blob: `core_alpha` at the centre fading to transparent at `radius`,
    /// the whole blob multiplied by `alpha`.
    fn fill_soft_circle(&mut self, center: Vec2, radius: f32, alpha: f32, core_alpha: f32);
}

/// Primitive kind stored in [`DrawCommand::kind`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawKind {
    /// Surface cleared; `x1`/`y1` hold the logical size
    Clear = 0,
    /// Line from `(x0, y0)` to `(x1, y1)`, `radius` holds the line width
    Line = 1,
    /// Solid circle at `(x0, y0)`
    Circle = 2,
    /// Radial gradient blob at `(x0, y0)`
    SoftCircle = 3,
}

impl DrawKind {
    /// Decode a raw kind tag.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(DrawKind::Clear),
            1 => Some(DrawKind::Line),
            2 => Some(DrawKind::Circle),
            3 => Some(DrawKind::SoftCircle),
            _ => None,
        }
    }
}

/// C-compatible record of one draw call.
/// Keep this layout stable for C/C++/C# consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct DrawCommand {
    /// [`DrawKind`] discriminant
    pub kind: u32,
    /// Start point / centre X
    pub x0: f32,
    /// Start point / centre Y
    pub y0: f32,
    /// Line end X (clear: surface width)
    pub x1: f32,
    /// Line end Y (clear: surface height)
    pub y1: f32,
    /// Circle radius or line width
    pub radius: f32,
    /// Final opacity of the op
    pub alpha: f32,
    /// Centre opacity of a soft circle's gradient
    pub core_alpha: f32,
}

impl DrawCommand {
    /// Decoded primitive kind.
    pub fn draw_kind(&self) -> Option<DrawKind> {
        DrawKind::from_raw(self.kind)
    }
}

/// [`Surface`] that records the current frame as [`DrawCommand`]s.
///
/// `clear` starts a new frame, so after a step the buffer holds exactly that frame's output.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with room for `capacity` commands per frame.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Commands recorded for the current frame (including the leading clear).
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands as a flat float-compatible slice (8 x 4 bytes per command).
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.commands)
    }

    /// Number of primitive draws, excluding clears.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| c.kind != DrawKind::Clear as u32)
            .count()
    }

    /// Drop all recorded commands and release spare capacity.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.commands.shrink_to_fit();
    }
}

impl Surface for CommandBuffer {
    fn clear(&mut self, width: f32, height: f32) {
        self.commands.clear(); // keeps capacity
        self.commands.push(DrawCommand {
            kind: DrawKind::Clear as u32,
            x1: width,
            y1: height,
            ..DrawCommand::default()
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, line_width: f32, alpha: f32) {
        self.commands.push(DrawCommand {
            kind: DrawKind::Line as u32,
            x0: from.x,
            y0: from.y,
            x1: to.x,
            y1: to.y,
            radius: line_width,
            alpha,
            core_alpha: 0.0,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, alpha: f32) {
        self.commands.push(DrawCommand {
            kind: DrawKind::Circle as u32,
            x0: center.x,
            y0: center.y,
            x1: center.x,
            y1: center.y,
            radius,
            alpha,
            core_alpha: 0.0,
        });
    }

    fn fill_soft_circle(&mut self, center: Vec2, radius: f32, alpha: f32, core_alpha: f32) {
        self.commands.push(DrawCommand {
            kind: DrawKind::SoftCircle as u32,
            x0: center.x,
            y0: center.y,
            x1: center.x,
            y1: center.y,
            radius,
            alpha,
            core_alpha,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_floors_and_caps() {
        let g = SurfaceGeometry::from_layout(640.7, 360.2, 3.0);
        assert_eq!(g.width, 640.0);
        assert_eq!(g.height, 360.0);
        assert_eq!(g.scale, 2.0);
        assert_eq!(g.backing_size(), (1280, 720));
    }

    #[test]
    fn test_geometry_degenerate_box() {
        let g = SurfaceGeometry::from_layout(0.0, f32::NAN, f32::NAN);
        assert_eq!(g.width, 1.0);
        assert_eq!(g.height, 1.0);
        assert_eq!(g.scale, 1.0);
        assert_eq!(g.backing_size(), (1, 1));
    }

    #[test]
    fn test_command_buffer_clear_starts_frame() {
        let mut buf = CommandBuffer::new();
        buf.clear(10.0, 10.0);
        buf.fill_circle(Vec2::new(1.0, 2.0), 3.0, 0.5);
        assert_eq!(buf.draw_count(), 1);

        buf.clear(10.0, 10.0);
        assert_eq!(buf.commands().len(), 1);
        assert_eq!(buf.commands()[0].draw_kind(), Some(DrawKind::Clear));
        assert_eq!(buf.draw_count(), 0);
    }

    #[test]
    fn test_command_layout_is_flat() {
        let mut buf = CommandBuffer::new();
        buf.clear(4.0, 3.0);
        buf.stroke_line(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 1.0, 0.25);
        let floats = buf.as_floats();
        assert_eq!(floats.len(), 2 * 8);
        assert_eq!(floats[3], 4.0); // clear: x1 = width
        assert_eq!(floats[8 + 6], 0.25); // line: alpha
    }
}
