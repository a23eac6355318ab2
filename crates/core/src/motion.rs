//! Reduced-motion preference sources.
//!
//! The particle field polls its preference once per frame instead of subscribing to
//! change events, so any of these can be flipped at runtime and the next frame honours it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host-side "prefers reduced motion" signal.
pub trait MotionPreference: Send + Sync {
    /// Whether animation should be suspended for this frame.
    fn prefers_reduced_motion(&self) -> bool;
}

/// Preference source for hosts without an accessibility setting: never reduced.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMotionPreference;

impl MotionPreference for NoMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

/// Shared flag the host can toggle from anywhere (settings UI, OS notification, FFI call).
#[derive(Debug, Clone, Default)]
pub struct SharedMotionPreference {
    reduced: Arc<AtomicBool>,
}

impl SharedMotionPreference {
    /// Create a flag with the given initial value.
    pub fn new(reduced: bool) -> Self {
        Self {
            reduced: Arc::new(AtomicBool::new(reduced)),
        }
    }

    /// Update the preference. Takes effect on the next frame.
    pub fn set(&self, reduced: bool) {
        self.reduced.store(reduced, Ordering::Relaxed);
    }

    /// Current value.
    pub fn get(&self) -> bool {
        self.reduced.load(Ordering::Relaxed)
    }
}

impl MotionPreference for SharedMotionPreference {
    fn prefers_reduced_motion(&self) -> bool {
        self.get()
    }
}

impl<F> MotionPreference for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn prefers_reduced_motion(&self) -> bool {
        self()
    }
}
