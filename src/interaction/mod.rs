use serde::{Deserialize, Serialize};

use crate::core::Size;

/// Host input consumed by a live chart.
///
/// Pointer and touch `x` coordinates are relative to the container's left
/// edge in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerMove { x: f64 },
    PointerLeave,
    TouchStart { x: f64, touches: usize },
    TouchMove { x: f64, touches: usize },
    TouchEnd,
    TouchCancel,
    VisibilityChange { visible: bool },
    ReducedMotionChange { reduced: bool },
    Resize { width: f64, height: f64 },
}

/// Follow-up the host should perform after recording an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputOutcome {
    /// The tick loop was idle (hidden host) and should be restarted.
    pub request_redraw: bool,
}

/// Latest-input record shared between event handlers and the tick.
///
/// Every handler is O(1): it only stores the newest pointer position or flag.
/// Inverse layout and value interpolation happen inside the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerTracker {
    hover_x: Option<f64>,
    hover_ended: bool,
    visible: bool,
    reduced_motion: bool,
    container_size: Option<Size>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            hover_x: None,
            hover_ended: false,
            visible: true,
            reduced_motion: false,
            container_size: None,
        }
    }
}

impl PointerTracker {
    #[must_use]
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            reduced_motion,
            ..Self::default()
        }
    }

    /// Records `event`. Scrub input is ignored unless `scrub_enabled`.
    pub fn apply(&mut self, event: InputEvent, scrub_enabled: bool) -> InputOutcome {
        match event {
            InputEvent::PointerMove { x } => {
                if scrub_enabled {
                    self.hover_x = Some(x);
                }
            }
            InputEvent::TouchStart { x, touches } | InputEvent::TouchMove { x, touches } => {
                if scrub_enabled && touches == 1 {
                    self.hover_x = Some(x);
                }
            }
            InputEvent::PointerLeave | InputEvent::TouchEnd | InputEvent::TouchCancel => {
                self.hover_x = None;
                self.hover_ended = true;
            }
            InputEvent::VisibilityChange { visible } => {
                let resumed = visible && !self.visible;
                self.visible = visible;
                return InputOutcome {
                    request_redraw: resumed,
                };
            }
            InputEvent::ReducedMotionChange { reduced } => self.reduced_motion = reduced,
            InputEvent::Resize { width, height } => {
                self.container_size = Some(Size::new(width, height));
            }
        }
        InputOutcome::default()
    }

    #[must_use]
    pub fn hover_x(&self) -> Option<f64> {
        self.hover_x
    }

    /// Returns whether a hover ended since the last call, clearing the flag.
    pub fn take_hover_ended(&mut self) -> bool {
        std::mem::take(&mut self.hover_ended)
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Last size reported through a resize notification.
    #[must_use]
    pub fn container_size(&self) -> Option<Size> {
        self.container_size
    }
}
