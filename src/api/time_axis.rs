use smallvec::SmallVec;

use crate::core::ChartLayout;
use crate::render::{LinePrimitive, RenderFrame, TextHAlign, TextMeasurer, TextPrimitive};

use super::{
    FadeLabelSet, Palette, PlacedLabel, TIME_LABEL_COLLISION_BUFFER_PX, TimeAxisTimeZone,
    TimeFormatterFn, first_time_tick, resolve_label_collisions, time_label_key, time_label_time,
    time_tick_interval,
};

const FADE_SPEED: f64 = 0.08;
/// Distance from the plot's left/right edge over which labels fade out.
const EDGE_FADE_PX: f64 = 50.0;
const MAX_TICKS: usize = 30;
const MIN_DRAW_ALPHA: f64 = 0.02;
/// Labels may start this far left of the plot before being culled.
const LEFT_SLACK_PX: f64 = 20.0;
const TICK_LENGTH_PX: f64 = 5.0;
const LABEL_OFFSET_PX: f64 = 14.0;

/// Time-axis ticks whose labels fade in and out as the window scrolls.
#[derive(Debug, Clone, Default)]
pub struct TimeAxisState {
    labels: FadeLabelSet<String>,
}

impl TimeAxisState {
    #[must_use]
    pub fn labels(&self) -> &FadeLabelSet<String> {
        &self.labels
    }

    /// Updates tick labels. `target_window_secs` is the window being
    /// transitioned to, so the interval does not churn mid-transition.
    pub fn advance(
        &mut self,
        layout: &ChartLayout,
        target_window_secs: f64,
        zone: TimeAxisTimeZone,
        format_time: &TimeFormatterFn,
        dt_ms: f64,
    ) {
        let interval = time_tick_interval(target_window_secs, layout.chart_width);
        if !(interval.is_finite() && interval > 0.0) {
            return;
        }

        let mut targets: SmallVec<[i64; MAX_TICKS]> = SmallVec::new();
        let mut time = first_time_tick(layout.left_edge, interval, zone);
        while time <= layout.right_edge + interval && targets.len() < MAX_TICKS {
            let key = time_label_key(time);
            targets.push(key);
            self.labels.upsert(key, 0.0, format_time(time_label_time(key)));
            time += interval;
        }

        let left = layout.plot_left();
        let right = layout.plot_right();
        self.labels.fade_toward(
            dt_ms,
            |key, _| {
                if targets.contains(&key) {
                    edge_alpha(layout.to_x(time_label_time(key)), left, right)
                } else {
                    0.0
                }
            },
            |_, _| FADE_SPEED,
        );
    }

    /// Pushes the axis baseline, tick marks and non-overlapping labels.
    pub fn draw(
        &self,
        frame: &mut RenderFrame,
        layout: &ChartLayout,
        palette: &Palette,
        measurer: &dyn TextMeasurer,
    ) {
        let left = layout.plot_left();
        let right = layout.plot_right();
        let line_y = layout.plot_bottom();
        frame.line(LinePrimitive::new(
            left,
            line_y,
            right,
            line_y,
            1.0,
            palette.grid_line,
        ));

        let candidates: Vec<PlacedLabel<&str>> = self
            .labels
            .iter()
            .filter(|(_, label)| label.alpha >= MIN_DRAW_ALPHA)
            .filter_map(|(key, label)| {
                let x = layout.to_x(time_label_time(key));
                (x >= left - LEFT_SLACK_PX && x <= right).then(|| PlacedLabel {
                    x,
                    width: measurer.measure_text(&label.payload, palette.label_font_px),
                    alpha: label.alpha,
                    item: label.payload.as_str(),
                })
            })
            .collect();

        for label in resolve_label_collisions(candidates, TIME_LABEL_COLLISION_BUFFER_PX) {
            frame.line(LinePrimitive::new(
                label.x,
                line_y,
                label.x,
                line_y + TICK_LENGTH_PX,
                1.0,
                palette.grid_line.fade(label.alpha),
            ));
            frame.text(TextPrimitive::new(
                label.item,
                label.x,
                line_y + TICK_LENGTH_PX + LABEL_OFFSET_PX,
                palette.label_font_px,
                palette.time_label.fade(label.alpha),
                TextHAlign::Center,
            ));
        }
    }
}

fn edge_alpha(x: f64, left: f64, right: f64) -> f64 {
    let from_edge = (x - left).min(right - x);
    if from_edge >= EDGE_FADE_PX {
        1.0
    } else if from_edge <= 0.0 {
        0.0
    } else {
        from_edge / EDGE_FADE_PX
    }
}
