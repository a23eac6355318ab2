//! Snow: slow fall with a sinusoidal wobble whose frequency and amplitude grow with wind.

use super::particle::{uniform, StepContext};
use crate::core_types::Vec2;
use crate::surface::Surface;
use rand::Rng;
use std::f32::consts::TAU;

/// Wobble phase advance per second in calm air.
const WOBBLE_RATE: f32 = 1.2;
/// Calm-air wobble amplitude (px per reference frame).
const WOBBLE_AMPLITUDE: f32 = 0.35;
/// Extra amplitude per unit of normalized wind.
const WOBBLE_WIND_GAIN: f32 = 0.25;
/// Sideways drift per unit of normalized wind.
const WIND_DRIFT: f32 = 0.8;
const BOTTOM_MARGIN: f32 = 10.0;
const SIDE_MARGIN: f32 = 20.0;
const RESPAWN_Y: (f32, f32) = (-80.0, -10.0);

/// A single snow flake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnowFlake {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Wobble phase accumulator (radians)
    pub wobble: f32,
    pub alpha: f32,
}

impl SnowFlake {
    pub fn spawn<R: Rng>(bounds: Vec2, rng: &mut R) -> Self {
        let (w, h) = (bounds.x, bounds.y);
        Self {
            position: Vec2::new(uniform(rng, 0.0, w), uniform(rng, -h, 0.0)),
            velocity: Vec2::new(uniform(rng, -0.4, 0.4), uniform(rng, 0.8, 1.8)),
            radius: uniform(rng, 0.8, 2.2),
            wobble: uniform(rng, 0.0, TAU),
            alpha: uniform(rng, 0.10, 0.22),
        }
    }

    pub fn advance<R: Rng>(&mut self, ctx: &StepContext, rng: &mut R) {
        let frames = ctx.frames();
        self.wobble += ctx.dt * (WOBBLE_RATE + ctx.wind);

        let sway = self.wobble.sin() * WOBBLE_AMPLITUDE * (1.0 + WOBBLE_WIND_GAIN * ctx.wind);
        self.position.x += (self.velocity.x + sway + WIND_DRIFT * ctx.wind) * frames;
        self.position.y += self.velocity.y * frames;

        let (w, h) = (ctx.bounds.x, ctx.bounds.y);
        if self.position.y > h + BOTTOM_MARGIN {
            self.position = Vec2::new(uniform(rng, 0.0, w), uniform(rng, RESPAWN_Y.0, RESPAWN_Y.1));
        }
        if self.position.x < -SIDE_MARGIN {
            self.position.x = w + SIDE_MARGIN;
        }
        if self.position.x > w + SIDE_MARGIN {
            self.position.x = -SIDE_MARGIN;
        }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, opacity: f32) {
        surface.fill_circle(self.position, self.radius, self.alpha * opacity);
    }
}
