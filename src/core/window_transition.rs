use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::core::ValueRange;

/// Fixed duration of an animated window-length change.
pub const WINDOW_TRANSITION_MS: f64 = 750.0;

/// Result of advancing the transition for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStep {
    /// Window length to display this frame (seconds).
    pub window_secs: f64,
    /// Eased progress in `[0, 1]`; `1` on the frame the transition completes.
    pub progress: f64,
    /// Whether the transition is still running after this frame.
    pub active: bool,
}

/// Animated change of the displayed window length.
///
/// The window interpolates on a log scale with a raised-cosine ease while the
/// value range cross-fades from the range displayed when the transition
/// started to the range computed for the target window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowTransition {
    from: f64,
    to: f64,
    start_ms: Option<f64>,
    range_from: ValueRange,
    range_to: ValueRange,
}

impl WindowTransition {
    #[must_use]
    pub fn new(window_secs: f64) -> Self {
        Self {
            from: window_secs,
            to: window_secs,
            start_ms: None,
            range_from: ValueRange::new(0.0, 0.0),
            range_to: ValueRange::new(0.0, 0.0),
        }
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.start_ms.is_some()
    }

    #[must_use]
    pub fn range_from(&self) -> ValueRange {
        self.range_from
    }

    #[must_use]
    pub fn range_to(&self) -> ValueRange {
        self.range_to
    }

    /// Starts a new transition when `target_secs` differs from the current
    /// target. An interrupted transition restarts from what is displayed now.
    ///
    /// `target_range` is evaluated only when a transition starts; `None`
    /// keeps the previous destination range.
    pub fn retarget(
        &mut self,
        target_secs: f64,
        displayed_window: f64,
        displayed_range: ValueRange,
        now_ms: f64,
        target_range: impl FnOnce() -> Option<ValueRange>,
    ) -> bool {
        if self.to == target_secs {
            return false;
        }
        self.from = displayed_window;
        self.to = target_secs;
        self.start_ms = Some(now_ms);
        self.range_from = displayed_range;
        if let Some(range) = target_range() {
            self.range_to = range;
        }
        true
    }

    /// Advances to `now_ms`. With `no_motion` the transition completes at once.
    pub fn advance(&mut self, now_ms: f64, no_motion: bool) -> WindowStep {
        let Some(start_ms) = self.start_ms else {
            return WindowStep {
                window_secs: self.to,
                progress: 0.0,
                active: false,
            };
        };

        let t = if no_motion {
            1.0
        } else {
            ((now_ms - start_ms) / WINDOW_TRANSITION_MS).clamp(0.0, 1.0)
        };
        if t >= 1.0 {
            self.start_ms = None;
            return WindowStep {
                window_secs: self.to,
                progress: 1.0,
                active: false,
            };
        }

        let eased = (1.0 - (t * PI).cos()) / 2.0;
        let log_from = self.from.ln();
        let log_to = self.to.ln();
        WindowStep {
            window_secs: (log_from + (log_to - log_from) * eased).exp(),
            progress: eased,
            active: true,
        }
    }

    /// Cross-faded value range at `progress`.
    #[must_use]
    pub fn interpolate_range(&self, progress: f64) -> ValueRange {
        ValueRange::new(
            self.range_from.min + (self.range_to.min - self.range_from.min) * progress,
            self.range_from.max + (self.range_to.max - self.range_from.max) * progress,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{WINDOW_TRANSITION_MS, WindowTransition};
    use crate::core::ValueRange;

    #[test]
    fn idle_transition_reports_target() {
        let mut transition = WindowTransition::new(30.0);
        let step = transition.advance(5_000.0, false);
        assert_eq!(step.window_secs, 30.0);
        assert!(!step.active);
    }

    #[test]
    fn midpoint_is_geometric_mean() {
        let mut transition = WindowTransition::new(60.0);
        assert!(transition.retarget(3600.0, 60.0, ValueRange::new(0.0, 1.0), 1_000.0, || None));
        let step = transition.advance(1_000.0 + WINDOW_TRANSITION_MS / 2.0, false);
        assert!((step.progress - 0.5).abs() <= 1e-9);
        assert!((step.window_secs - (60.0f64 * 3600.0).sqrt()).abs() <= 1e-6);
        assert!(step.active);
    }

    #[test]
    fn same_target_does_not_restart() {
        let mut transition = WindowTransition::new(60.0);
        assert!(!transition.retarget(60.0, 60.0, ValueRange::new(0.0, 1.0), 0.0, || None));
        assert!(!transition.is_active());
    }

    #[test]
    fn range_cross_fades_with_progress() {
        let mut transition = WindowTransition::new(60.0);
        transition.retarget(120.0, 60.0, ValueRange::new(0.0, 10.0), 0.0, || {
            Some(ValueRange::new(10.0, 30.0))
        });
        let mid = transition.interpolate_range(0.5);
        assert_eq!(mid, ValueRange::new(5.0, 20.0));
    }

    #[test]
    fn no_motion_completes_in_one_step() {
        let mut transition = WindowTransition::new(60.0);
        transition.retarget(5.0, 60.0, ValueRange::new(0.0, 1.0), 10.0, || None);
        let step = transition.advance(10.0, true);
        assert_eq!(step.window_secs, 5.0);
        assert!(!step.active);
    }
}
