use serde::{Deserialize, Serialize};

use crate::core::REFERENCE_FRAME_MS;

/// Longest frame delta fed to the animation; longer gaps (tab switches,
/// stalls) are treated as this.
pub const MAX_FRAME_DELTA_MS: f64 = 50.0;

/// Coalescing frame request state for one engine.
///
/// Any number of redraw requests between two host frames collapse into a
/// single pending tick. A destroyed scheduler never ticks again.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameScheduler {
    pending: bool,
    destroyed: bool,
    hidden: bool,
    last_frame_ms: Option<f64>,
}

impl FrameScheduler {
    /// Marks a tick as pending. Returns `true` when this call scheduled it.
    pub fn request(&mut self) -> bool {
        if self.destroyed || self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Consumes the pending tick at `now_ms` and returns its delta time.
    ///
    /// The first tick uses one reference frame; later ones are clamped to
    /// [`MAX_FRAME_DELTA_MS`]. Hidden or destroyed schedulers, and those with
    /// nothing pending, return `None`.
    pub fn begin_frame(&mut self, now_ms: f64) -> Option<f64> {
        if self.destroyed || !self.pending {
            return None;
        }
        self.pending = false;
        if self.hidden {
            return None;
        }
        let dt = match self.last_frame_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => REFERENCE_FRAME_MS,
        };
        self.last_frame_ms = Some(now_ms);
        Some(dt)
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Cancels any pending tick for good. Idempotent.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.pending = false;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
