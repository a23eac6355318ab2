//! Dust: sparse motes drifting on the ambient air, wrapping on every edge.

use super::particle::{uniform, StepContext};
use crate::core_types::Vec2;
use crate::surface::Surface;
use rand::Rng;

const WIND_DRIFT: f32 = 0.25;
const EDGE_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DustMote {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

impl DustMote {
    pub fn spawn<R: Rng>(bounds: Vec2, rng: &mut R) -> Self {
        Self {
            position: Vec2::new(uniform(rng, 0.0, bounds.x), uniform(rng, 0.0, bounds.y)),
            velocity: Vec2::new(uniform(rng, -0.05, 0.12), uniform(rng, -0.08, 0.05)),
            radius: uniform(rng, 0.6, 1.8),
            alpha: uniform(rng, 0.02, 0.06),
        }
    }

    /// Dust never recycles; it wraps, so no RNG is needed here.
    pub fn advance(&mut self, ctx: &StepContext) {
        let frames = ctx.frames();
        self.position.x += (self.velocity.x + WIND_DRIFT * ctx.wind) * frames;
        self.position.y += self.velocity.y * frames;

        let (w, h) = (ctx.bounds.x, ctx.bounds.y);
        if self.position.x > w + EDGE_MARGIN {
            self.position.x = -EDGE_MARGIN;
        }
        if self.position.x < -EDGE_MARGIN {
            self.position.x = w + EDGE_MARGIN;
        }
        if self.position.y > h + EDGE_MARGIN {
            self.position.y = -EDGE_MARGIN;
        }
        if self.position.y < -EDGE_MARGIN {
            self.position.y = h + EDGE_MARGIN;
        }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, opacity: f32) {
        surface.fill_circle(self.position, self.radius, self.alpha * opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mote(x: f32, y: f32, vx: f32, vy: f32) -> DustMote {
        DustMote {
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            radius: 1.0,
            alpha: 0.04,
        }
    }

    #[test]
    fn test_wraps_on_all_edges() {
        let ctx = StepContext {
            dt: 0.05,
            wind: 0.0,
            bounds: Vec2::new(100.0, 50.0),
        };

        let mut right = mote(109.9, 20.0, 0.1, 0.0);
        right.advance(&ctx);
        assert_eq!(right.position.x, -10.0);

        let mut left = mote(-9.9, 20.0, -0.05, 0.0);
        left.advance(&ctx);
        assert_eq!(left.position.x, 110.0);

        let mut bottom = mote(50.0, 59.9, 0.0, 0.05);
        bottom.advance(&ctx);
        assert_eq!(bottom.position.y, -10.0);

        let mut top = mote(50.0, -9.9, 0.0, -0.08);
        top.advance(&ctx);
        assert_eq!(top.position.y, 60.0);
    }

    #[test]
    fn test_wind_biases_drift() {
        let ctx = StepContext {
            dt: 1.0 / 60.0,
            wind: 2.0,
            bounds: Vec2::new(100.0, 100.0),
        };
        let mut m = mote(50.0, 50.0, 0.0, 0.0);
        m.advance(&ctx);
        assert!((m.position.x - 50.5).abs() < 1e-4);
        assert_eq!(m.position.y, 50.0);
    }
}
