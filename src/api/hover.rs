use serde::{Deserialize, Serialize};

use crate::core::{ChartLayout, Sample, interpolate_at_time};
use crate::render::{
    CirclePrimitive, LinePrimitive, RenderFrame, TextHAlign, TextMeasurer, TextPrimitive,
};

use super::LivelineConfig;

/// Per-frame easing of the scrub amount.
pub const SCRUB_LERP_SPEED: f64 = 0.12;
/// Below this distance (px) from the live dot the crosshair is hidden.
pub const CROSSHAIR_FADE_MIN_PX: f64 = 5.0;
const CROSSHAIR_FADE_MAX_PX: f64 = 80.0;
const CROSSHAIR_FADE_PLOT_RATIO: f64 = 0.3;
const TOOLTIP_MIN_WIDTH_PX: f64 = 300.0;
const TOOLTIP_SEPARATOR: &str = "  \u{b7}  ";

/// Hovered point reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverPoint {
    pub time: f64,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

/// Scrub position kept while the crosshair fades out after a leave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrubSample {
    pub x: f64,
    pub time: f64,
    pub value: f64,
}

/// Result of resolving the pointer for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoverResolution {
    /// Point to draw the crosshair and split line at, if any.
    pub sample: Option<ScrubSample>,
    /// Point under an active pointer; reported to the host.
    pub active: Option<HoverPoint>,
    /// Eased scrub intensity in `[0, 1]`.
    pub scrub_amount: f64,
}

/// Scrub easing and the last hovered sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HoverState {
    scrub_amount: f64,
    last: Option<ScrubSample>,
}

impl HoverState {
    #[must_use]
    pub fn scrub_amount(&self) -> f64 {
        self.scrub_amount
    }

    /// Maps the pointer to a time, interpolates the series there and eases
    /// the scrub amount toward the hover state.
    ///
    /// Pointer positions right of the live point are clamped onto it, and
    /// positions outside the plot are ignored.
    pub fn update(
        &mut self,
        hover_x: Option<f64>,
        layout: &ChartLayout,
        now: f64,
        visible: &[Sample],
        no_motion: bool,
    ) -> HoverResolution {
        let mut active = None;
        let mut current = None;
        let in_plot = hover_x.filter(|x| *x >= layout.plot_left() && *x <= layout.plot_right());
        if let Some(raw_x) = in_plot {
            let x = raw_x.min(layout.to_x(now));
            let time = layout.x_to_time(x);
            if let Some(value) = interpolate_at_time(visible, time) {
                let sample = ScrubSample { x, time, value };
                self.last = Some(sample);
                current = Some(sample);
                active = Some(HoverPoint {
                    time,
                    value,
                    x,
                    y: layout.to_y(value),
                });
            }
        }

        let target = if active.is_some() { 1.0 } else { 0.0 };
        if no_motion {
            self.scrub_amount = target;
        } else {
            self.scrub_amount += (target - self.scrub_amount) * SCRUB_LERP_SPEED;
            if self.scrub_amount < 0.01 {
                self.scrub_amount = 0.0;
            }
            if self.scrub_amount > 0.99 {
                self.scrub_amount = 1.0;
            }
        }

        let sample = current.or(if self.scrub_amount > 0.0 {
            self.last
        } else {
            None
        });
        HoverResolution {
            sample,
            active,
            scrub_amount: self.scrub_amount,
        }
    }
}

/// Opacity of scrub effects for a hover `distance` px left of the live dot.
///
/// Effects vanish as the pointer reaches the dot and ramp up to
/// `scrub_amount` over a zone capped at 80px or 30% of the plot width.
#[must_use]
pub fn crosshair_opacity(distance: f64, chart_width: f64, scrub_amount: f64) -> f64 {
    let fade_start = CROSSHAIR_FADE_MAX_PX.min(chart_width * CROSSHAIR_FADE_PLOT_RATIO);
    if distance < CROSSHAIR_FADE_MIN_PX {
        0.0
    } else if distance >= fade_start {
        scrub_amount
    } else {
        (distance - CROSSHAIR_FADE_MIN_PX) / (fade_start - CROSSHAIR_FADE_MIN_PX) * scrub_amount
    }
}

/// Crosshair inputs resolved for one frame.
pub(super) struct Crosshair {
    pub sample: ScrubSample,
    pub opacity: f64,
    /// Tooltips never extend past the live dot.
    pub live_dot_x: f64,
}

/// Pushes the crosshair line, its dot and the value/time tooltip.
pub(super) fn draw_crosshair(
    frame: &mut RenderFrame,
    layout: &ChartLayout,
    config: &LivelineConfig,
    crosshair: Crosshair,
    measurer: &dyn TextMeasurer,
) {
    let Crosshair {
        sample,
        opacity,
        live_dot_x,
    } = crosshair;
    let palette = &config.palette;
    let y = layout.to_y(sample.value);
    frame.line(LinePrimitive::new(
        sample.x,
        layout.plot_top(),
        sample.x,
        layout.plot_bottom(),
        1.0,
        palette.crosshair_line.fade(opacity * 0.5),
    ));

    let dot_radius = 4.0 * (opacity * 3.0).min(1.0);
    if dot_radius > 0.5 {
        frame.circle(CirclePrimitive::filled(sample.x, y, dot_radius, palette.line));
    }

    if opacity < 0.1 || layout.width < TOOLTIP_MIN_WIDTH_PX {
        return;
    }

    let value_text = (config.format_value)(sample.value);
    let tail_text = format!("{TOOLTIP_SEPARATOR}{}", (config.format_time)(sample.time));
    let font_px = palette.tooltip_font_px;
    let value_width = measurer.measure_text(&value_text, font_px);
    let total_width = value_width + measurer.measure_text(&tail_text, font_px);

    let mut tx = sample.x - total_width / 2.0;
    let min_x = layout.plot_left() + 4.0;
    let max_x = live_dot_x + 7.0 - total_width;
    if tx < min_x {
        tx = min_x;
    }
    if tx > max_x {
        tx = max_x;
    }
    let ty = layout.plot_top() + config.tooltip_y + 10.0;

    let mut value_label = TextPrimitive::new(
        value_text,
        tx,
        ty,
        font_px,
        palette.tooltip_text.fade(opacity),
        TextHAlign::Left,
    );
    let mut tail_label = TextPrimitive::new(
        tail_text,
        tx + value_width,
        ty,
        font_px,
        palette.grid_label.fade(opacity),
        TextHAlign::Left,
    );
    if config.tooltip_outline {
        let outline = palette.tooltip_bg.fade(opacity);
        value_label = value_label.with_outline(outline, 3.0);
        tail_label = tail_label.with_outline(outline, 3.0);
    }
    frame.text(value_label);
    frame.text(tail_label);
}

#[cfg(test)]
mod tests {
    use super::{HoverState, crosshair_opacity};
    use crate::core::{ChartLayout, Padding, Sample, Size, ValueRange};

    fn layout() -> ChartLayout {
        let padding = Padding {
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
        };
        ChartLayout::new(
            Size::new(300.0, 100.0),
            padding,
            (0.0, 30.0),
            ValueRange::new(0.0, 10.0),
        )
    }

    #[test]
    fn hover_interpolates_between_samples() {
        let visible = [Sample::new(10.0, 4.0), Sample::new(20.0, 8.0)];
        let mut hover = HoverState::default();
        let layout = layout();
        let resolution = hover.update(Some(layout.to_x(15.0)), &layout, 25.0, &visible, false);
        let point = resolution.active.expect("hovered point");
        assert!((point.value - 6.0).abs() <= 1e-9);
        assert!((point.time - 15.0).abs() <= 1e-9);
    }

    #[test]
    fn pointer_right_of_live_point_is_clamped() {
        let visible = [Sample::new(10.0, 4.0), Sample::new(20.0, 8.0)];
        let mut hover = HoverState::default();
        let layout = layout();
        let resolution = hover.update(Some(290.0), &layout, 20.0, &visible, false);
        let point = resolution.active.expect("hovered point");
        assert!((point.x - layout.to_x(20.0)).abs() <= 1e-9);
        assert!((point.value - 8.0).abs() <= 1e-9);
    }

    #[test]
    fn scrub_eases_in_and_fades_with_last_sample() {
        let visible = [Sample::new(10.0, 4.0), Sample::new(20.0, 8.0)];
        let mut hover = HoverState::default();
        let layout = layout();
        let first = hover.update(Some(150.0), &layout, 20.0, &visible, false);
        assert!((first.scrub_amount - 0.12).abs() <= 1e-12);

        let leaving = hover.update(None, &layout, 20.0, &visible, false);
        assert!(leaving.active.is_none());
        assert!(leaving.sample.is_some());
        assert!(leaving.scrub_amount < first.scrub_amount);
    }

    #[test]
    fn reduced_motion_snaps_scrub() {
        let visible = [Sample::new(10.0, 4.0), Sample::new(20.0, 8.0)];
        let mut hover = HoverState::default();
        let resolution = hover.update(Some(150.0), &layout(), 20.0, &visible, true);
        assert_eq!(resolution.scrub_amount, 1.0);
    }

    #[test]
    fn opacity_ramps_away_from_live_dot() {
        assert_eq!(crosshair_opacity(2.0, 500.0, 1.0), 0.0);
        assert_eq!(crosshair_opacity(200.0, 500.0, 0.6), 0.6);
        let mid = crosshair_opacity(42.5, 500.0, 1.0);
        assert!((mid - 0.5).abs() <= 1e-12);
    }
}
