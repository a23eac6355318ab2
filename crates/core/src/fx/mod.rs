//! Particle Field Engine
//!
//! A bounded particle pool driven by `{mode, intensity, wind, opacity}`. Each frame the
//! field nudges its live population toward the mode's target count, advances every
//! particle by the elapsed time and redraws the whole surface.
//!
//! Spawn, physics and draw rules for each mode live in their own module ([`rain`],
//! [`snow`], [`fog`], [`dust`]) and [`Particle`] dispatches between them.

pub mod dust;
pub mod fog;
pub mod mode;
pub mod particle;
pub mod rain;
pub mod snow;

pub use mode::{FxMode, FxState, FxUpdate, ParseFxModeError};
pub use particle::{Particle, StepContext};

use crate::config::FxConfig;
use crate::core_types::UnitInterval;
use crate::motion::{MotionPreference, NoMotionPreference};
use crate::surface::{Surface, SurfaceGeometry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;
use tracing::{debug, info, trace};

/// What a call to [`ParticleField::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Surface cleared only: reduced motion is active or intensity is negligible.
    /// Population, physics and draw were skipped.
    Suspended,
    /// Population adjusted, particles advanced and drawn
    Drawn {
        /// Live particles after the population adjustment
        live: usize,
        /// Population the field is converging toward
        target: usize,
    },
}

impl FrameOutcome {
    /// Whether particles were drawn this frame.
    pub fn is_drawn(&self) -> bool {
        matches!(self, FrameOutcome::Drawn { .. })
    }
}

/// Ambient weather particle field.
///
/// `set` and `resize` only record input; everything visible happens in `step`, so an
/// update is observed by the next frame and never by one already drawn.
pub struct ParticleField {
    config: FxConfig,
    state: FxState,
    geometry: SurfaceGeometry,
    particles: Vec<Particle>,
    rng: StdRng,
    motion: Box<dyn MotionPreference>,
    frame_count: u64,
    suspended: bool,
}

impl ParticleField {
    /// Create a field with the default configuration.
    pub fn new(geometry: SurfaceGeometry) -> Self {
        Self::with_config(FxConfig::default(), geometry)
    }

    /// Create a field with a custom configuration.
    pub fn with_config(config: FxConfig, geometry: SurfaceGeometry) -> Self {
        let config = config.sanitized();
        let state = FxState {
            opacity: UnitInterval::new(config.default_opacity),
            ..FxState::default()
        };

        info!(
            "Creating particle field {}x{} (scale {}), pool cap {}",
            geometry.width, geometry.height, geometry.scale, config.max_particles
        );

        Self {
            particles: Vec::with_capacity(config.max_particles),
            config,
            state,
            geometry,
            rng: StdRng::from_os_rng(),
            motion: Box::new(NoMotionPreference),
            frame_count: 0,
            suspended: false,
        }
    }

    /// Reseed the particle RNG for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Poll `preference` every frame for reduced-motion suspension.
    #[must_use]
    pub fn with_motion_preference<M: MotionPreference + 'static>(mut self, preference: M) -> Self {
        self.motion = Box::new(preference);
        self
    }

    /// Replace the reduced-motion source.
    pub fn set_motion_preference<M: MotionPreference + 'static>(&mut self, preference: M) {
        self.motion = Box::new(preference);
    }

    /// Merge a partial update. Takes effect on the next frame.
    ///
    /// After a mode change the old particles are retired from the pool over the following
    /// frames while the new mode spawns in. They are never converted to the new mode.
    pub fn set(&mut self, update: FxUpdate) {
        let previous = self.state.mode;
        self.state.merge(&update);

        if self.state.mode != previous {
            debug!(
                "FX mode {} -> {}, retiring {} particles",
                previous,
                self.state.mode,
                self.retiring_count()
            );
        }
    }

    /// Replace cached geometry. Particle positions are kept as-is; they pick up the new
    /// bounds on their next recycle.
    pub fn resize(&mut self, geometry: SurfaceGeometry) {
        if geometry != self.geometry {
            debug!(
                "Particle field resized {}x{} -> {}x{}",
                self.geometry.width, self.geometry.height, geometry.width, geometry.height
            );
            self.geometry = geometry;
        }
    }

    /// Resize from a host layout box, applying the configured pixel-ratio cap.
    pub fn resize_to_layout(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.resize(SurfaceGeometry::from_layout_capped(
            width,
            height,
            device_pixel_ratio,
            self.config.max_device_pixel_ratio,
        ));
    }

    /// Run one frame: clear `surface`, then (unless suspended) converge the population,
    /// advance every particle by `dt` seconds and draw it.
    pub fn step<S: Surface + ?Sized>(&mut self, dt: f32, surface: &mut S) -> FrameOutcome {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_dt)
        } else {
            0.0
        };
        self.frame_count += 1;

        let bounds = self.geometry.size();
        surface.clear(bounds.x, bounds.y);

        let reduced = self.motion.prefers_reduced_motion();
        if reduced || *self.state.intensity <= self.config.suspend_threshold {
            if !self.suspended {
                debug!(
                    "Particle field suspended (reduced motion: {}, intensity: {})",
                    reduced, self.state.intensity
                );
                self.suspended = true;
            }
            return FrameOutcome::Suspended;
        }
        if self.suspended {
            debug!("Particle field resumed");
            self.suspended = false;
        }

        let target = self.target_count();
        self.converge_population(target);

        let ctx = StepContext {
            dt,
            wind: self.state.wind_mph.normalized(self.config.wind_divisor),
            bounds,
        };
        let opacity = *self.state.opacity;
        for particle in &mut self.particles {
            particle.advance(&ctx, &mut self.rng);
            particle.draw(surface, opacity);
        }

        trace!(
            "frame {}: {} {} particles (target {}), dt {:.4}",
            self.frame_count,
            self.particles.len(),
            self.state.mode,
            target,
            dt
        );

        FrameOutcome::Drawn {
            live: self.particles.len(),
            target,
        }
    }

    /// Retire up to `population_step` particles left over from a previous mode, then
    /// append or remove up to `population_step` current-mode particles at the tail.
    fn converge_population(&mut self, target: usize) {
        let mode = self.state.mode;
        let step = self.config.population_step.max(1);

        let mut retired = 0;
        while retired < step {
            let Some(index) = self.particles.iter().rposition(|p| p.mode() != mode) else {
                break;
            };
            self.particles.remove(index);
            retired += 1;
        }

        let current = self.particles.len() - self.retiring_count();
        let changed = match current.cmp(&target) {
            Ordering::Less => {
                let room = self.config.max_particles.saturating_sub(self.particles.len());
                let bounds = self.geometry.size();
                let spawn = (target - current).min(step).min(room);
                for _ in 0..spawn {
                    self.particles.push(Particle::spawn(mode, bounds, &mut self.rng));
                }
                spawn > 0
            }
            Ordering::Greater => {
                for _ in 0..(current - target).min(step) {
                    if let Some(index) = self.particles.iter().rposition(|p| p.mode() == mode) {
                        self.particles.remove(index);
                    }
                }
                true
            }
            Ordering::Equal => false,
        };

        let settled = self.particles.len() == target && self.retiring_count() == 0;
        if (changed || retired > 0) && settled {
            debug!("{} population converged at {}", mode, target);
        }
    }

    /// Current merged state.
    pub fn state(&self) -> &FxState {
        &self.state
    }

    /// Effective configuration.
    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    /// Cached surface geometry.
    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    /// Live particles, oldest first.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles, including any still retiring after a mode change.
    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    /// Particles left over from a previous mode that have not been retired yet.
    pub fn retiring_count(&self) -> usize {
        let mode = self.state.mode;
        self.particles.iter().filter(|p| p.mode() != mode).count()
    }

    /// Population the field is converging toward for the current state.
    pub fn target_count(&self) -> usize {
        self.state.target_count(self.config.max_particles)
    }

    /// Whether the most recent frame was suspended.
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Frames stepped since creation (suspended frames included).
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl std::fmt::Debug for ParticleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleField")
            .field("state", &self.state)
            .field("geometry", &self.geometry)
            .field("live", &self.particles.len())
            .field("frame_count", &self.frame_count)
            .field("suspended", &self.suspended)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CommandBuffer;

    fn field() -> ParticleField {
        ParticleField::new(SurfaceGeometry::from_layout(320.0, 240.0, 1.0)).with_seed(99)
    }

    #[test]
    fn test_default_state() {
        let f = field();
        assert_eq!(f.state().mode, FxMode::Dust);
        assert_eq!(*f.state().intensity, 0.0);
        assert_eq!(*f.state().opacity, 0.55);
        assert_eq!(f.live_count(), 0);
    }

    #[test]
    fn test_grows_one_particle_per_frame() {
        let mut f = field();
        let mut buf = CommandBuffer::new();
        f.set(FxUpdate::new().mode(FxMode::Fog).intensity(0.5));

        for expected in 1..=5 {
            let outcome = f.step(0.016, &mut buf);
            assert_eq!(
                outcome,
                FrameOutcome::Drawn {
                    live: expected,
                    target: 14
                }
            );
            assert_eq!(buf.draw_count(), expected);
        }
    }

    #[test]
    fn test_population_step_config() {
        let config = FxConfig {
            population_step: 10,
            ..Default::default()
        };
        let mut f = ParticleField::with_config(config, SurfaceGeometry::from_layout(100.0, 100.0, 1.0))
            .with_seed(1);
        let mut buf = CommandBuffer::new();
        f.set(FxUpdate::new().mode(FxMode::Rain).intensity(1.0));
        f.step(0.016, &mut buf);
        assert_eq!(f.live_count(), 10);
    }

    #[test]
    fn test_mode_change_retires_old_particles_gradually() {
        let mut f = field();
        let mut buf = CommandBuffer::new();
        f.set(FxUpdate::new().mode(FxMode::Rain).intensity(0.5));
        for _ in 0..20 {
            f.step(0.016, &mut buf);
        }
        assert_eq!(f.live_count(), 20);

        f.set(FxUpdate::new().mode(FxMode::Snow));
        assert_eq!(f.live_count(), 20);
        assert_eq!(f.retiring_count(), 20);

        f.step(0.016, &mut buf);
        assert_eq!(f.retiring_count(), 19);
        assert_eq!(f.live_count(), 20);
        assert_eq!(buf.draw_count(), 20);
        assert_eq!(f.particles().last().map(Particle::mode), Some(FxMode::Snow));

        for _ in 0..19 {
            f.step(0.016, &mut buf);
        }
        assert_eq!(f.retiring_count(), 0);
        assert!(f.particles().iter().all(|p| p.mode() == FxMode::Snow));
    }

    #[test]
    fn test_mode_change_respects_cap_while_retiring() {
        let mut f = field();
        let mut buf = CommandBuffer::new();
        f.set(FxUpdate::new().mode(FxMode::Rain).intensity(1.0));
        for _ in 0..220 {
            f.step(0.016, &mut buf);
        }
        assert_eq!(f.live_count(), 220);

        f.set(FxUpdate::new().mode(FxMode::Snow));
        for _ in 0..300 {
            f.step(0.016, &mut buf);
            assert!(f.live_count() <= 220);
        }
        assert_eq!(f.retiring_count(), 0);
        assert_eq!(f.live_count(), 150);
    }

    #[test]
    fn test_same_mode_update_keeps_pool() {
        let mut f = field();
        let mut buf = CommandBuffer::new();
        f.set(FxUpdate::new().mode(FxMode::Dust).intensity(1.0));
        for _ in 0..3 {
            f.step(0.016, &mut buf);
        }
        f.set(FxUpdate::new().mode(FxMode::Dust).wind_mph(20.0));
        assert_eq!(f.live_count(), 3);
    }

    #[test]
    fn test_suspended_frame_only_clears() {
        let mut f = field();
        let mut buf = CommandBuffer::new();
        f.set(FxUpdate::new().intensity(0.01));
        assert_eq!(f.step(0.016, &mut buf), FrameOutcome::Suspended);
        assert!(f.is_suspended());
        assert_eq!(buf.commands().len(), 1);
        assert_eq!(f.frame_count(), 1);
    }

    #[test]
    fn test_non_finite_dt_does_not_move_particles() {
        let mut f = field();
        let mut buf = CommandBuffer::new();
        f.set(FxUpdate::new().mode(FxMode::Dust).intensity(1.0));
        f.step(0.0, &mut buf);
        let before = f.particles()[0].position();
        f.step(f32::NAN, &mut buf);
        assert_eq!(f.particles()[0].position(), before);
    }
}
