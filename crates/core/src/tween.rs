//! Value-Tween Animator
//!
//! Eases a displayed scalar toward the most recent target with a cubic ease-out.
//! A target arriving mid-flight restarts the tween from the value currently on screen,
//! so the display never jumps.
//!
//! The animator does not own a scheduler. [`TweenAnimator::submit`] hands back a
//! [`FrameRequest`] standing in for the host's animation-frame callback; servicing an
//! older request after a newer submit yields [`FrameResult::Cancelled`], which is how two
//! overlapping animations of the same quantity are kept from fighting.
//!
//! ```
//! use wx_fx_core::tween::{FrameResult, TweenAnimator};
//!
//! let mut pop = TweenAnimator::new(500.0);
//! pop.submit(10.0, 0.0);
//! let request = pop.submit(20.0, 0.0);
//!
//! assert!(matches!(pop.frame(request, 250.0), FrameResult::Running(_)));
//! assert_eq!(pop.frame(request, 500.0), FrameResult::Finished(20.0));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Numeric pop animation duration (ms).
pub const POP_DURATION_MS: f64 = 520.0;

/// Barometer gauge animation duration (ms).
pub const GAUGE_DURATION_MS: f64 = 900.0;

/// Cubic ease-out: `1 - (1 - p)^3`, with `p` clamped to `[0, 1]`.
#[inline]
pub fn ease_out_cubic(p: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// A single time-bounded interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Host timestamp the tween started at (ms)
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl Tween {
    /// Linear progress in `[0, 1]`. A zero-length tween is complete immediately.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        let p = (now_ms - self.start_ms) / self.duration_ms;
        if p.is_nan() {
            1.0
        } else {
            p.clamp(0.0, 1.0) as f32
        }
    }

    /// Eased value at `now_ms`.
    pub fn value_at(&self, now_ms: f64) -> f32 {
        let p = self.progress(now_ms);
        if p >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * ease_out_cubic(p)
    }

    pub fn is_complete(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// Handle for the one frame callback an animator has scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// Raw id, monotonically increasing per animator.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Result of servicing a [`FrameRequest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameResult {
    /// The request was superseded (or nothing is scheduled); draw nothing.
    Cancelled,
    /// Still easing; reschedule.
    Running(f32),
    /// Reached the target; no further frames are scheduled.
    Finished(f32),
}

impl FrameResult {
    /// Displayed value for this frame, if any.
    pub fn value(self) -> Option<f32> {
        match self {
            FrameResult::Cancelled => None,
            FrameResult::Running(v) | FrameResult::Finished(v) => Some(v),
        }
    }
}

/// Eases one displayed quantity toward its latest target.
///
/// Assumes finite targets; callers reject NaN/inf before submitting.
#[derive(Debug, Clone)]
pub struct TweenAnimator {
    duration_ms: f64,
    tween: Option<Tween>,
    displayed: Option<f32>,
    pending: Option<FrameRequest>,
    next_request: u64,
}

impl TweenAnimator {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms: duration_ms.max(0.0),
            tween: None,
            displayed: None,
            pending: None,
            next_request: 0,
        }
    }

    /// Animator for numeric pop labels.
    pub fn pop() -> Self {
        Self::new(POP_DURATION_MS)
    }

    /// Retarget toward `target`, starting at `now_ms`.
    ///
    /// The origin is the value on screen at `now_ms`: the in-flight tween's interpolated
    /// value, else the last displayed value, else `target` itself for the first sample.
    /// Any previously scheduled request is cancelled.
    pub fn submit(&mut self, target: f32, now_ms: f64) -> FrameRequest {
        let origin = match (self.pending, self.tween, self.displayed) {
            (Some(_), Some(tween), _) => tween.value_at(now_ms),
            (_, _, Some(shown)) => shown,
            _ => target,
        };

        if self.pending.is_some() {
            debug!("Retargeting tween mid-flight from {origin} to {target}");
        }

        self.tween = Some(Tween {
            from: origin,
            to: target,
            start_ms: now_ms,
            duration_ms: self.duration_ms,
        });
        self.displayed = Some(origin);

        self.next_request += 1;
        let request = FrameRequest(self.next_request);
        self.pending = Some(request);
        request
    }

    /// Service a scheduled frame at `now_ms`.
    pub fn frame(&mut self, request: FrameRequest, now_ms: f64) -> FrameResult {
        if self.pending != Some(request) {
            return FrameResult::Cancelled;
        }
        let Some(tween) = self.tween else {
            self.pending = None;
            return FrameResult::Cancelled;
        };

        let value = tween.value_at(now_ms);
        self.displayed = Some(value);

        if tween.is_complete(now_ms) {
            self.pending = None;
            FrameResult::Finished(value)
        } else {
            FrameResult::Running(value)
        }
    }

    /// Service whatever request is pending. Returns the displayed value while animating.
    pub fn tick(&mut self, now_ms: f64) -> Option<f32> {
        let request = self.pending?;
        self.frame(request, now_ms).value()
    }

    /// Value most recently put on screen.
    pub fn displayed(&self) -> Option<f32> {
        self.displayed
    }

    /// Displayed value rounded for integer labels.
    pub fn displayed_rounded(&self) -> Option<i64> {
        self.displayed.map(|v| v.round() as i64)
    }

    /// Latest submitted target.
    pub fn target(&self) -> Option<f32> {
        self.tween.map(|t| t.to)
    }

    /// In-flight tween, if any has been submitted.
    pub fn tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    /// Currently scheduled request.
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Whether a frame is scheduled.
    pub fn is_animating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }
}

impl Default for TweenAnimator {
    fn default() -> Self {
        Self::pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_resumes_from_saved_json() {
        let json = r#"{ "from": 1000.0, "to": 1020.0, "start_ms": 0.0, "duration_ms": 900.0 }"#;
        let tween: Tween = serde_json::from_str(json).unwrap();
        assert!((tween.value_at(450.0) - 1017.5).abs() < 1e-3);
        assert!(tween.is_complete(900.0));

        let saved = serde_json::to_string(&tween).unwrap();
        assert!(saved.contains("\"duration_ms\":900.0"));
    }

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn test_zero_duration_is_complete() {
        let tween = Tween {
            from: 0.0,
            to: 5.0,
            start_ms: 100.0,
            duration_ms: 0.0,
        };
        assert!(tween.is_complete(100.0));
        assert_eq!(tween.value_at(100.0), 5.0);
    }

    #[test]
    fn test_first_submit_starts_at_target() {
        let mut anim = TweenAnimator::pop();
        anim.submit(1013.0, 0.0);
        assert_eq!(anim.displayed(), Some(1013.0));
        assert_eq!(anim.tick(10.0), Some(1013.0));
    }

    #[test]
    fn test_stale_request_is_cancelled() {
        let mut anim = TweenAnimator::new(100.0);
        let first = anim.submit(0.0, 0.0);
        let second = anim.submit(10.0, 0.0);
        assert!(second.id() > first.id());
        assert_eq!(anim.frame(first, 50.0), FrameResult::Cancelled);
        assert!(anim.frame(second, 50.0).value().is_some());
    }

    #[test]
    fn test_finished_is_terminal() {
        let mut anim = TweenAnimator::new(100.0);
        anim.submit(3.0, 0.0);
        anim.submit(7.0, 0.0);
        assert_eq!(anim.tick(150.0), Some(7.0));
        assert!(!anim.is_animating());
        assert_eq!(anim.tick(200.0), None);
        assert_eq!(anim.displayed_rounded(), Some(7));
    }

    #[test]
    fn test_settled_animator_retargets_from_display() {
        let mut anim = TweenAnimator::new(100.0);
        anim.submit(40.0, 0.0);
        anim.tick(100.0);
        anim.submit(60.0, 500.0);
        assert_eq!(anim.tween().map(|t| t.from), Some(40.0));
        assert_eq!(anim.target(), Some(60.0));
    }
}
