//! Fog: a few large soft blobs drifting slowly to the right.

use super::particle::{uniform, StepContext};
use crate::core_types::Vec2;
use crate::surface::Surface;
use rand::Rng;

const WIND_DRIFT: f32 = 0.9;
/// Centre opacity of the radial gradient.
const CORE_ALPHA: f32 = 0.18;
/// Vertical band (fractions of height) fog banks occupy.
const BAND: (f32, f32) = (0.15, 0.75);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogBank {
    pub position: Vec2,
    /// Horizontal speed (px per reference frame)
    pub velocity_x: f32,
    /// Soft-edge radius
    pub radius: f32,
    pub alpha: f32,
}

impl FogBank {
    pub fn spawn<R: Rng>(bounds: Vec2, rng: &mut R) -> Self {
        let (w, h) = (bounds.x, bounds.y);
        Self {
            position: Vec2::new(
                uniform(rng, -w * 0.2, w * 1.2),
                uniform(rng, h * BAND.0, h * BAND.1),
            ),
            velocity_x: uniform(rng, 0.12, 0.35),
            radius: uniform(rng, 80.0, 170.0),
            alpha: uniform(rng, 0.015, 0.03),
        }
    }

    /// Drift right; once fully past the right edge, re-enter at the left in a new band position.
    pub fn advance<R: Rng>(&mut self, ctx: &StepContext, rng: &mut R) {
        self.position.x += (self.velocity_x + WIND_DRIFT * ctx.wind) * ctx.frames();

        let (w, h) = (ctx.bounds.x, ctx.bounds.y);
        if self.position.x > w + self.radius {
            self.position.x = -self.radius;
            self.position.y = uniform(rng, h * BAND.0, h * BAND.1);
        }
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, opacity: f32) {
        surface.fill_soft_circle(self.position, self.radius, self.alpha * opacity, CORE_ALPHA);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CommandBuffer, DrawKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reenters_from_left_in_band() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut bank = FogBank {
            position: Vec2::new(699.5, 10.0),
            velocity_x: 0.3,
            radius: 100.0,
            alpha: 0.02,
        };
        let ctx = StepContext {
            dt: 0.05,
            wind: 0.0,
            bounds: Vec2::new(600.0, 400.0),
        };
        bank.advance(&ctx, &mut rng);

        assert_eq!(bank.position.x, -100.0);
        assert!((60.0..300.0).contains(&bank.position.y));
    }

    #[test]
    fn test_draws_soft_circle() {
        let bank = FogBank {
            position: Vec2::new(5.0, 5.0),
            velocity_x: 0.2,
            radius: 90.0,
            alpha: 0.02,
        };
        let mut buf = CommandBuffer::new();
        buf.clear(10.0, 10.0);
        bank.draw(&mut buf, 1.0);

        let cmd = buf.commands()[1];
        assert_eq!(cmd.draw_kind(), Some(DrawKind::SoftCircle));
        assert_eq!(cmd.core_alpha, CORE_ALPHA);
        assert_eq!(cmd.radius, 90.0);
    }
}
