//! Rain: fast diagonal streaks pushed sideways by the wind.

use super::particle::{uniform, StepContext};
use crate::core_types::Vec2;
use crate::surface::Surface;
use rand::Rng;

/// Horizontal drift per unit of normalized wind (px per reference frame).
const WIND_DRIFT: f32 = 6.0;
/// How far below the bottom edge a drop may fall before recycling.
const BOTTOM_MARGIN: f32 = 20.0;
/// How far past the right edge a drop may drift before recycling.
const RIGHT_MARGIN: f32 = 60.0;
/// Recycled drops re-enter in this band above the surface.
const RESPAWN_Y: (f32, f32) = (-120.0, -20.0);
/// Tail foreshortening applied to the vertical velocity.
const TAIL_FALL_FACTOR: f32 = 0.6;
const LINE_WIDTH: f32 = 1.0;

/// A single rain streak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainDrop {
    pub position: Vec2,
    /// px per reference frame
    pub velocity: Vec2,
    /// Streak length multiplier
    pub length: f32,
    pub alpha: f32,
}

impl RainDrop {
    /// Spawn above the surface, spread beyond both side edges so wind-drift never leaves a gap.
    pub fn spawn<R: Rng>(bounds: Vec2, rng: &mut R) -> Self {
        let (w, h) = (bounds.x, bounds.y);
        Self {
            position: Vec2::new(uniform(rng, -w * 0.2, w * 1.2), uniform(rng, -h, 0.0)),
            velocity: Vec2::new(uniform(rng, 0.2, 0.6), uniform(rng, 8.0, 16.0)),
            length: uniform(rng, 10.0, 22.0),
            alpha: uniform(rng, 0.08, 0.16),
        }
    }

    pub fn advance<R: Rng>(&mut self, ctx: &StepContext, rng: &mut R) {
        let frames = ctx.frames();
        self.position.x += (self.velocity.x + WIND_DRIFT * ctx.wind) * frames;
        self.position.y += self.velocity.y * frames;

        let (w, h) = (ctx.bounds.x, ctx.bounds.y);
        if self.position.y > h + BOTTOM_MARGIN || self.position.x > w + RIGHT_MARGIN {
            self.position = Vec2::new(
                uniform(rng, -w * 0.2, w * 1.2),
                uniform(rng, RESPAWN_Y.0, RESPAWN_Y.1),
            );
        }
    }

    /// Tail end of the streak, trailing back along the velocity.
    pub fn tail(&self) -> Vec2 {
        Vec2::new(
            self.position.x - self.velocity.x * self.length,
            self.position.y - self.velocity.y * TAIL_FALL_FACTOR,
        )
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, opacity: f32) {
        surface.stroke_line(self.position, self.tail(), LINE_WIDTH, self.alpha * opacity);
    }
}
