//! Mode-tagged particle and its dispatch table.

use super::dust::DustMote;
use super::fog::FogBank;
use super::mode::FxMode;
use super::rain::RainDrop;
use super::snow::SnowFlake;
use crate::core_types::Vec2;
use crate::surface::Surface;
use rand::Rng;

/// Velocities are stored in pixels per 60 Hz frame.
pub(crate) const REFERENCE_FPS: f32 = 60.0;

/// Per-frame inputs shared by every particle's physics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Elapsed time (seconds, already clamped)
    pub dt: f32,
    /// Normalized wind bias (`mph / divisor`)
    pub wind: f32,
    /// Logical surface size
    pub bounds: Vec2,
}

impl StepContext {
    /// `dt` expressed in reference frames.
    #[inline]
    pub(crate) fn frames(&self) -> f32 {
        self.dt * REFERENCE_FPS
    }
}

/// Uniform sample in `[low, high)`, or `low` when the range is empty.
#[inline]
pub(crate) fn uniform<R: Rng>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}

/// One particle of the active mode.
///
/// Particles are never converted between variants: after a mode change the old ones are
/// retired from the pool and the new mode spawns its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Particle {
    /// Rain streak
    Rain(RainDrop),
    /// Snow flake
    Snow(SnowFlake),
    /// Fog blob
    Fog(FogBank),
    /// Dust mote
    Dust(DustMote),
}

impl Particle {
    /// Sample a fresh particle from `mode`'s initial distribution within `bounds`.
    pub fn spawn<R: Rng>(mode: FxMode, bounds: Vec2, rng: &mut R) -> Self {
        match mode {
            FxMode::Rain => Particle::Rain(RainDrop::spawn(bounds, rng)),
            FxMode::Snow => Particle::Snow(SnowFlake::spawn(bounds, rng)),
            FxMode::Fog => Particle::Fog(FogBank::spawn(bounds, rng)),
            FxMode::Dust => Particle::Dust(DustMote::spawn(bounds, rng)),
        }
    }

    /// Mode this particle belongs to.
    pub fn mode(&self) -> FxMode {
        match self {
            Particle::Rain(_) => FxMode::Rain,
            Particle::Snow(_) => FxMode::Snow,
            Particle::Fog(_) => FxMode::Fog,
            Particle::Dust(_) => FxMode::Dust,
        }
    }

    /// Position in surface-local logical coordinates.
    pub fn position(&self) -> Vec2 {
        match self {
            Particle::Rain(p) => p.position,
            Particle::Snow(p) => p.position,
            Particle::Fog(p) => p.position,
            Particle::Dust(p) => p.position,
        }
    }

    /// Per-particle alpha weight (before global opacity).
    pub fn alpha(&self) -> f32 {
        match self {
            Particle::Rain(p) => p.alpha,
            Particle::Snow(p) => p.alpha,
            Particle::Fog(p) => p.alpha,
            Particle::Dust(p) => p.alpha,
        }
    }

    /// Integrate one frame, recycling or wrapping at the edges.
    pub fn advance<R: Rng>(&mut self, ctx: &StepContext, rng: &mut R) {
        match self {
            Particle::Rain(p) => p.advance(ctx, rng),
            Particle::Snow(p) => p.advance(ctx, rng),
            Particle::Fog(p) => p.advance(ctx, rng),
            Particle::Dust(p) => p.advance(ctx),
        }
    }

    /// Issue this particle's draw call with its alpha scaled by `opacity`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, opacity: f32) {
        match self {
            Particle::Rain(p) => p.draw(surface, opacity),
            Particle::Snow(p) => p.draw(surface, opacity),
            Particle::Fog(p) => p.draw(surface, opacity),
            Particle::Dust(p) => p.draw(surface, opacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_dispatches_on_mode() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = Vec2::new(300.0, 200.0);
        for mode in FxMode::ALL {
            let p = Particle::spawn(mode, bounds, &mut rng);
            assert_eq!(p.mode(), mode);
            assert!(p.alpha() > 0.0);
        }
    }

    #[test]
    fn test_uniform_empty_range() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(uniform(&mut rng, 4.0, 4.0), 4.0);
        let v = uniform(&mut rng, -1.0, 1.0);
        assert!((-1.0..1.0).contains(&v));
    }
}
