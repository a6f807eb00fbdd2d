use indexmap::IndexMap;

use crate::core::ChartLayout;
use crate::render::{LinePrimitive, LineStrokeStyle, RenderFrame, TextHAlign, TextPrimitive};

use super::{
    FadeLabelSet, GRID_MIN_GAP_PX, Palette, ValueFormatterFn, divisible, grid_label_key,
    grid_label_value, pick_interval,
};

const FADE_IN_SPEED: f64 = 0.18;
const FADE_OUT_SPEED: f64 = 0.12;
/// Fine gridlines start fading in at this spacing.
const FINE_FADE_START_PX: f64 = 40.0;
/// Fine gridlines are fully shown from this spacing.
const FINE_FADE_END_PX: f64 = 60.0;
/// Distance from the plot's top/bottom edge over which lines fade out.
const EDGE_FADE_PX: f64 = 32.0;
/// Candidate lines may sit this far outside the plot.
const CANDIDATE_SLACK_PX: f64 = 2.0;
/// Drawn labels may sit this far outside the plot.
const DRAW_SLACK_PX: f64 = 10.0;
const MIN_DRAW_ALPHA: f64 = 0.02;
const MAX_CANDIDATES: usize = 512;

/// Horizontal value gridlines with fading labels.
///
/// The coarse interval is sticky across frames; half-interval lines fade in
/// once they are far enough apart.
#[derive(Debug, Clone, Default)]
pub struct ValueGridState {
    interval: f64,
    labels: FadeLabelSet<()>,
}

impl ValueGridState {
    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    #[must_use]
    pub fn labels(&self) -> &FadeLabelSet<()> {
        &self.labels
    }

    /// Updates the interval and label alphas for the current layout.
    pub fn advance(&mut self, layout: &ChartLayout, dt_ms: f64) {
        let value_span = layout.value_span;
        if layout.chart_height <= 0.0 || value_span <= 0.0 {
            return;
        }

        let px_per_unit = layout.chart_height / value_span;
        let coarse = pick_interval(value_span, px_per_unit, GRID_MIN_GAP_PX, self.interval);
        self.interval = coarse;
        if coarse <= 0.0 {
            return;
        }

        let fine = coarse / 2.0;
        let fine_target = fine_line_alpha(fine * px_per_unit);
        let top = layout.plot_top();
        let bottom = layout.plot_bottom();

        let mut targets: IndexMap<i64, f64> = IndexMap::new();
        let mut value = (layout.min_value / fine).ceil() * fine;
        while value <= layout.max_value && targets.len() < MAX_CANDIDATES {
            let y = layout.to_y(value);
            if y >= top - CANDIDATE_SLACK_PX && y <= bottom + CANDIDATE_SLACK_PX {
                let base = if divisible(value, coarse) {
                    1.0
                } else {
                    fine_target
                };
                targets.insert(grid_label_key(value), base * edge_alpha(y, top, bottom));
            }
            value += fine;
        }

        self.labels.fade_toward(
            dt_ms,
            |key, _| targets.get(&key).copied().unwrap_or(0.0),
            |goal, alpha| {
                if goal >= alpha {
                    FADE_IN_SPEED
                } else {
                    FADE_OUT_SPEED
                }
            },
        );
        for (key, target) in targets {
            self.labels.insert_absent(key, target * FADE_IN_SPEED, ());
        }
    }

    /// Pushes dotted gridlines and right-hand labels.
    pub fn draw(
        &self,
        frame: &mut RenderFrame,
        layout: &ChartLayout,
        palette: &Palette,
        format_value: &ValueFormatterFn,
    ) {
        let top = layout.plot_top();
        let bottom = layout.plot_bottom();
        for (key, label) in self.labels.iter() {
            if label.alpha < MIN_DRAW_ALPHA {
                continue;
            }
            let value = grid_label_value(key);
            let y = layout.to_y(value);
            if y < top - DRAW_SLACK_PX || y > bottom + DRAW_SLACK_PX {
                continue;
            }
            frame.line(
                LinePrimitive::new(
                    layout.plot_left(),
                    y,
                    layout.plot_right(),
                    y,
                    1.0,
                    palette.grid_line.fade(label.alpha),
                )
                .with_stroke_style(LineStrokeStyle::Dashed {
                    on_px: 1.0,
                    off_px: 3.0,
                }),
            );
            frame.text(TextPrimitive::new(
                format_value(value),
                layout.plot_right() + 8.0,
                y + 4.0,
                palette.label_font_px,
                palette.grid_label.fade(label.alpha),
                TextHAlign::Left,
            ));
        }
    }
}

fn fine_line_alpha(fine_px: f64) -> f64 {
    if fine_px < FINE_FADE_START_PX {
        0.0
    } else if fine_px >= FINE_FADE_END_PX {
        1.0
    } else {
        (fine_px - FINE_FADE_START_PX) / (FINE_FADE_END_PX - FINE_FADE_START_PX)
    }
}

fn edge_alpha(y: f64, top: f64, bottom: f64) -> f64 {
    let from_edge = (y - top).min(bottom - y);
    if from_edge >= EDGE_FADE_PX {
        1.0
    } else if from_edge <= 0.0 {
        0.0
    } else {
        from_edge / EDGE_FADE_PX
    }
}
