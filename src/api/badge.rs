use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::core::{ChartLayout, Momentum, lerp};
use crate::render::{Color, PathCommand, Shadow, TextMeasurer};

use super::{BadgeVariant, LivelineConfig, MOMENTUM_DOWN_COLOR, MOMENTUM_UP_COLOR};

pub const BADGE_PAD_X: f64 = 10.0;
pub const BADGE_PAD_Y: f64 = 3.0;
pub const BADGE_TAIL_LEN: f64 = 5.0;
pub const BADGE_TAIL_SPREAD: f64 = 2.5;
const BADGE_LINE_HEIGHT: f64 = 16.0;
const WIDTH_SPEED: f64 = 0.15;
const WIDTH_SNAP_PX: f64 = 0.3;
const Y_SPEED: f64 = 0.35;
const Y_SPEED_TRANSITION: f64 = 0.5;
const COLOR_SPEED: f64 = 0.12;

/// Fully resolved badge for one frame, positioned in container pixels.
///
/// `path` and `svg_path` describe the same outline in the badge's local
/// coordinates (origin at `left`, `top`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeOverlay {
    pub text: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Text starts this far right of `left`.
    pub text_offset_x: f64,
    pub font_px: f64,
    pub path: Vec<PathCommand>,
    pub svg_path: String,
    pub fill: Color,
    pub text_color: Color,
    pub shadow: Option<Shadow>,
}

/// Eased badge width, position and momentum color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BadgeState {
    display_width: Option<f64>,
    y: Option<f64>,
    /// `1` is fully green, `0` fully red.
    green: f64,
}

impl Default for BadgeState {
    fn default() -> Self {
        Self {
            display_width: None,
            y: None,
            green: 1.0,
        }
    }
}

/// Per-frame badge inputs.
#[derive(Debug, Clone, Copy)]
pub struct BadgeFrame<'a> {
    pub layout: &'a ChartLayout,
    pub smooth_value: f64,
    pub momentum: Momentum,
    pub transitioning: bool,
    pub no_motion: bool,
    pub dt_ms: f64,
}

impl BadgeState {
    #[must_use]
    pub fn green(&self) -> f64 {
        self.green
    }

    /// Resolves the badge, or `None` when the badge is disabled.
    ///
    /// The width follows a digits-as-`8` template so it does not jitter as
    /// digits change.
    pub fn update(
        &mut self,
        config: &LivelineConfig,
        input: BadgeFrame<'_>,
        measurer: &dyn TextMeasurer,
    ) -> Option<BadgeOverlay> {
        if !config.show_badge {
            return None;
        }
        let palette = &config.palette;
        let layout = input.layout;

        let text = (config.format_value)(input.smooth_value);
        let template: String = text
            .chars()
            .map(|ch| if ch.is_ascii_digit() { '8' } else { ch })
            .collect();
        let target_width = measurer.measure_text(&template, palette.label_font_px);
        let mut width = lerp(
            self.display_width.unwrap_or(target_width),
            target_width,
            WIDTH_SPEED,
            input.dt_ms,
        );
        if (width - target_width).abs() < WIDTH_SNAP_PX {
            width = target_width;
        }
        self.display_width = Some(width);

        let pill_width = width + BADGE_PAD_X * 2.0;
        let pill_height = BADGE_LINE_HEIGHT + BADGE_PAD_Y * 2.0;
        let tail = if config.badge_tail {
            BADGE_TAIL_LEN
        } else {
            0.0
        };

        let target_y = layout
            .to_y(input.smooth_value)
            .clamp(layout.plot_top(), layout.plot_bottom().max(layout.plot_top()));
        let y = match self.y {
            Some(previous) if !input.no_motion => {
                let speed = if input.transitioning {
                    Y_SPEED_TRANSITION
                } else {
                    Y_SPEED
                };
                lerp(previous, target_y, speed, input.dt_ms)
            }
            _ => target_y,
        };
        self.y = Some(y);

        let (path, svg_path) = if config.badge_tail {
            (
                tailed_pill_commands(pill_width, pill_height, tail, BADGE_TAIL_SPREAD),
                badge_svg_path(pill_width, pill_height, tail, BADGE_TAIL_SPREAD),
            )
        } else {
            (
                pill_commands(pill_width, pill_height),
                pill_svg_path(pill_width, pill_height),
            )
        };

        let (fill, text_color, shadow) = match config.badge_variant {
            BadgeVariant::Minimal => (
                palette.badge_outer_bg,
                palette.tooltip_text,
                Some(Shadow {
                    color: palette.badge_outer_shadow,
                    blur_px: 4.0,
                    offset_y: 1.0,
                }),
            ),
            BadgeVariant::Default => {
                let fill = if config.show_momentum {
                    self.advance_color(input.momentum, input.no_motion, input.dt_ms);
                    MOMENTUM_DOWN_COLOR.mix(MOMENTUM_UP_COLOR, self.green)
                } else {
                    palette.line
                };
                (fill, palette.badge_text, None)
            }
        };

        Some(BadgeOverlay {
            text,
            left: layout.plot_right() + 8.0 - BADGE_PAD_X - tail,
            top: y - pill_height / 2.0,
            width: tail + pill_width,
            height: pill_height,
            text_offset_x: tail + BADGE_PAD_X,
            font_px: palette.label_font_px,
            path,
            svg_path,
            fill,
            text_color,
            shadow,
        })
    }

    fn advance_color(&mut self, momentum: Momentum, no_motion: bool, dt_ms: f64) {
        let target = match momentum {
            Momentum::Up => 1.0,
            Momentum::Down => 0.0,
            Momentum::Flat => self.green,
        };
        self.green = if no_motion {
            target
        } else {
            lerp(self.green, target, COLOR_SPEED, dt_ms)
        };
        if self.green > 0.99 {
            self.green = 1.0;
        }
        if self.green < 0.01 {
            self.green = 0.0;
        }
    }
}

/// SVG outline of a pill with a curved tail pointing left at mid-height.
#[must_use]
pub fn badge_svg_path(pill_width: f64, pill_height: f64, tail_len: f64, tail_spread: f64) -> String {
    let r = pill_height / 2.0;
    let cx = tail_len + pill_width - r;
    let tl = tail_len + r;
    let mut svg = String::with_capacity(160);
    let _ = write!(
        svg,
        "M{tl},0 L{cx},0 A{r},{r},0,0,1,{cx},{pill_height} L{tl},{pill_height} \
         C{c1x},{pill_height} 3,{c2y} 0,{r} C3,{c3y} {c1x},0 {tl},0 Z",
        c1x = tail_len + 2.0,
        c2y = r + tail_spread,
        c3y = r - tail_spread,
    );
    svg
}

/// SVG outline of a plain pill.
#[must_use]
pub fn pill_svg_path(pill_width: f64, pill_height: f64) -> String {
    let r = pill_height / 2.0;
    let right = pill_width - r;
    format!("M{r},0 L{right},0 A{r},{r},0,0,1,{right},{pill_height} L{r},{pill_height} A{r},{r},0,0,1,{r},0 Z")
}

fn tailed_pill_commands(
    pill_width: f64,
    pill_height: f64,
    tail_len: f64,
    tail_spread: f64,
) -> Vec<PathCommand> {
    let r = pill_height / 2.0;
    let cx = tail_len + pill_width - r;
    let tl = tail_len + r;
    vec![
        PathCommand::MoveTo { x: tl, y: 0.0 },
        PathCommand::LineTo { x: cx, y: 0.0 },
        PathCommand::Arc {
            cx,
            cy: r,
            radius: r,
            start: -FRAC_PI_2,
            end: FRAC_PI_2,
        },
        PathCommand::LineTo { x: tl, y: pill_height },
        PathCommand::CubicTo {
            x1: tail_len + 2.0,
            y1: pill_height,
            x2: 3.0,
            y2: r + tail_spread,
            x: 0.0,
            y: r,
        },
        PathCommand::CubicTo {
            x1: 3.0,
            y1: r - tail_spread,
            x2: tail_len + 2.0,
            y2: 0.0,
            x: tl,
            y: 0.0,
        },
        PathCommand::Close,
    ]
}

fn pill_commands(pill_width: f64, pill_height: f64) -> Vec<PathCommand> {
    let r = pill_height / 2.0;
    let right = pill_width - r;
    vec![
        PathCommand::MoveTo { x: r, y: 0.0 },
        PathCommand::LineTo { x: right, y: 0.0 },
        PathCommand::Arc {
            cx: right,
            cy: r,
            radius: r,
            start: -FRAC_PI_2,
            end: FRAC_PI_2,
        },
        PathCommand::LineTo { x: r, y: pill_height },
        PathCommand::Arc {
            cx: r,
            cy: r,
            radius: r,
            start: FRAC_PI_2,
            end: PI + FRAC_PI_2,
        },
        PathCommand::Close,
    ]
}

#[cfg(test)]
mod tests {
    use super::{BadgeFrame, BadgeState, badge_svg_path, pill_svg_path};
    use crate::api::{BadgeVariant, LivelineConfig, MOMENTUM_UP_COLOR};
    use crate::core::{ChartLayout, Momentum, Padding, Size, ValueRange};
    use crate::render::EstimatedTextMeasurer;

    fn layout() -> ChartLayout {
        ChartLayout::new(
            Size::new(400.0, 200.0),
            Padding::default(),
            (0.0, 30.0),
            ValueRange::new(0.0, 100.0),
        )
    }

    fn frame(layout: &ChartLayout, momentum: Momentum) -> BadgeFrame<'_> {
        BadgeFrame {
            layout,
            smooth_value: 50.0,
            momentum,
            transitioning: false,
            no_motion: false,
            dt_ms: 16.67,
        }
    }

    #[test]
    fn tailed_path_matches_geometry() {
        let svg = badge_svg_path(60.0, 22.0, 5.0, 2.5);
        assert!(svg.starts_with("M16,0 L54,0 A11,11,0,0,1,54,22 L16,22"));
        assert!(svg.ends_with("Z"));
        assert_eq!(pill_svg_path(40.0, 22.0), "M11,0 L29,0 A11,11,0,0,1,29,22 L11,22 A11,11,0,0,1,11,0 Z");
    }

    #[test]
    fn disabled_badge_yields_nothing() {
        let config = LivelineConfig {
            show_badge: false,
            ..LivelineConfig::default()
        };
        let layout = layout();
        let mut badge = BadgeState::default();
        assert!(
            badge
                .update(&config, frame(&layout, Momentum::Up), &EstimatedTextMeasurer)
                .is_none()
        );
    }

    #[test]
    fn badge_sits_right_of_plot_and_centers_on_value() {
        let config = LivelineConfig::default();
        let layout = layout();
        let mut badge = BadgeState::default();
        let overlay = badge
            .update(&config, frame(&layout, Momentum::Up), &EstimatedTextMeasurer)
            .expect("badge");
        assert_eq!(overlay.text, "50.00");
        assert_eq!(overlay.height, 22.0);
        assert!((overlay.top + 11.0 - layout.to_y(50.0)).abs() <= 1e-9);
        assert_eq!(overlay.left, layout.plot_right() + 8.0 - 10.0 - 5.0);
        assert_eq!(overlay.fill, MOMENTUM_UP_COLOR);
    }

    #[test]
    fn color_cross_fades_on_reversal() {
        let config = LivelineConfig::default();
        let layout = layout();
        let mut badge = BadgeState::default();
        badge.update(&config, frame(&layout, Momentum::Down), &EstimatedTextMeasurer);
        assert!(badge.green() < 1.0 && badge.green() > 0.0);
        for _ in 0..200 {
            badge.update(&config, frame(&layout, Momentum::Down), &EstimatedTextMeasurer);
        }
        assert_eq!(badge.green(), 0.0);
        let flat_before = badge.green();
        badge.update(&config, frame(&layout, Momentum::Flat), &EstimatedTextMeasurer);
        assert_eq!(badge.green(), flat_before);
    }

    #[test]
    fn minimal_variant_uses_neutral_fill() {
        let config = LivelineConfig {
            badge_variant: BadgeVariant::Minimal,
            ..LivelineConfig::default()
        };
        let layout = layout();
        let mut badge = BadgeState::default();
        let overlay = badge
            .update(&config, frame(&layout, Momentum::Up), &EstimatedTextMeasurer)
            .expect("badge");
        assert_eq!(overlay.fill, config.palette.badge_outer_bg);
        assert!(overlay.shadow.is_some());
    }
}
