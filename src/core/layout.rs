use serde::{Deserialize, Serialize};

use crate::core::{Padding, Size, ValueRange};

/// Fraction of the window reserved right of "now" for the live dot.
pub const WINDOW_BUFFER: f64 = 0.05;
/// Horizontal room (px) the momentum chevrons need right of the live dot.
pub const ARROW_ROOM_PX: f64 = 37.0;
/// Substitute span when the value range collapses to zero.
const MIN_VALUE_SPAN: f64 = 1e-3;

/// Right-side buffer fraction for a given plot width.
#[must_use]
pub fn window_buffer(chart_width: f64, reserve_arrow_room: bool) -> f64 {
    if reserve_arrow_room {
        WINDOW_BUFFER.max(ARROW_ROOM_PX / chart_width.max(1.0))
    } else {
        WINDOW_BUFFER
    }
}

/// Visible time edges `(left, right)` for a window ending slightly after `now`.
#[must_use]
pub fn window_edges(now: f64, window_secs: f64, buffer: f64) -> (f64, f64) {
    let right = now + window_secs * buffer;
    (right - window_secs, right)
}

/// Pure `(time, value) <-> (x, y)` mapping for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub chart_width: f64,
    pub chart_height: f64,
    pub left_edge: f64,
    pub right_edge: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub value_span: f64,
}

impl ChartLayout {
    #[must_use]
    pub fn new(size: Size, padding: Padding, edges: (f64, f64), range: ValueRange) -> Self {
        let span = range.span();
        Self {
            width: size.width,
            height: size.height,
            padding,
            chart_width: size.width - padding.left - padding.right,
            chart_height: size.height - padding.top - padding.bottom,
            left_edge: edges.0,
            right_edge: edges.1,
            min_value: range.min,
            max_value: range.max,
            value_span: if span == 0.0 { MIN_VALUE_SPAN } else { span },
        }
    }

    #[must_use]
    pub fn to_x(&self, time: f64) -> f64 {
        self.padding.left
            + (time - self.left_edge) / (self.right_edge - self.left_edge) * self.chart_width
    }

    #[must_use]
    pub fn to_y(&self, value: f64) -> f64 {
        self.padding.top + (1.0 - (value - self.min_value) / self.value_span) * self.chart_height
    }

    /// Inverse of [`Self::to_x`].
    #[must_use]
    pub fn x_to_time(&self, x: f64) -> f64 {
        self.left_edge
            + (x - self.padding.left) / self.chart_width * (self.right_edge - self.left_edge)
    }

    #[must_use]
    pub fn plot_top(&self) -> f64 {
        self.padding.top
    }

    #[must_use]
    pub fn plot_bottom(&self) -> f64 {
        self.height - self.padding.bottom
    }

    #[must_use]
    pub fn plot_left(&self) -> f64 {
        self.padding.left
    }

    #[must_use]
    pub fn plot_right(&self) -> f64 {
        self.width - self.padding.right
    }

    #[must_use]
    pub fn clamp_y(&self, y: f64) -> f64 {
        y.clamp(self.plot_top(), self.plot_bottom().max(self.plot_top()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartLayout, WINDOW_BUFFER, window_buffer, window_edges};
    use crate::core::{Padding, Size, ValueRange};

    fn layout() -> ChartLayout {
        let padding = Padding {
            top: 10.0,
            right: 20.0,
            bottom: 30.0,
            left: 40.0,
        };
        ChartLayout::new(
            Size::new(460.0, 240.0),
            padding,
            (100.0, 200.0),
            ValueRange::new(0.0, 50.0),
        )
    }

    #[test]
    fn maps_edges_to_plot_bounds() {
        let layout = layout();
        assert_eq!(layout.to_x(100.0), 40.0);
        assert_eq!(layout.to_x(200.0), 440.0);
        assert_eq!(layout.to_y(50.0), 10.0);
        assert_eq!(layout.to_y(0.0), 210.0);
    }

    #[test]
    fn x_to_time_inverts_to_x() {
        let layout = layout();
        let x = layout.to_x(137.5);
        assert!((layout.x_to_time(x) - 137.5).abs() <= 1e-9);
    }

    #[test]
    fn buffer_reserves_arrow_room_on_narrow_plots() {
        assert_eq!(window_buffer(2000.0, true), WINDOW_BUFFER);
        assert!((window_buffer(370.0, true) - 0.1).abs() <= 1e-12);
        assert_eq!(window_buffer(370.0, false), WINDOW_BUFFER);
    }

    #[test]
    fn edges_leave_buffer_after_now() {
        let (left, right) = window_edges(1000.0, 60.0, 0.05);
        assert!((right - 1003.0).abs() <= 1e-9);
        assert!((left - 943.0).abs() <= 1e-9);
    }
}
