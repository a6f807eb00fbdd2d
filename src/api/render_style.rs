use serde::{Deserialize, Serialize};

use crate::render::Color;

/// Light/dark base for palette resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Default accent color of the series line.
pub const DEFAULT_LINE_COLOR: Color = Color::rgb(59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0);

/// Momentum green (`#22c55e`).
pub const MOMENTUM_UP_COLOR: Color = Color::rgb(34.0 / 255.0, 197.0 / 255.0, 94.0 / 255.0);
/// Momentum red (`#ef4444`).
pub const MOMENTUM_DOWN_COLOR: Color = Color::rgb(239.0 / 255.0, 68.0 / 255.0, 68.0 / 255.0);

/// Resolved colors and font sizes for one accent color and theme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub line: Color,
    pub line_width: f64,
    pub fill_top: Color,
    pub fill_bottom: Color,
    pub grid_line: Color,
    pub grid_label: Color,
    /// Value readout color on upward momentum.
    pub dot_up: Color,
    /// Value readout color on downward momentum.
    pub dot_down: Color,
    pub badge_outer_bg: Color,
    pub badge_outer_shadow: Color,
    pub badge_text: Color,
    pub dash_line: Color,
    pub ref_line: Color,
    pub ref_label: Color,
    pub time_label: Color,
    pub crosshair_line: Color,
    pub tooltip_bg: Color,
    pub tooltip_text: Color,
    /// Opaque chart background, used for label outlines and color blending.
    pub background: Color,
    pub label_font_px: f64,
    pub tooltip_font_px: f64,
}

impl Palette {
    #[must_use]
    pub fn resolve(line: Color, theme: ThemeMode) -> Self {
        let dark = theme.is_dark();
        let ink = |alpha_dark: f64, alpha_light: f64| {
            if dark {
                Color::rgba(1.0, 1.0, 1.0, alpha_dark)
            } else {
                Color::rgba(0.0, 0.0, 0.0, alpha_light)
            }
        };
        let line = line.with_alpha(1.0);

        Self {
            line,
            line_width: 2.0,
            fill_top: line.with_alpha(if dark { 0.12 } else { 0.08 }),
            fill_bottom: line.with_alpha(0.0),
            grid_line: ink(0.06, 0.06),
            grid_label: ink(0.4, 0.35),
            dot_up: MOMENTUM_UP_COLOR,
            dot_down: MOMENTUM_DOWN_COLOR,
            badge_outer_bg: if dark {
                Color::rgba8(40, 40, 40, 0.95)
            } else {
                Color::rgba(1.0, 1.0, 1.0, 0.95)
            },
            badge_outer_shadow: Color::rgba(0.0, 0.0, 0.0, if dark { 0.4 } else { 0.15 }),
            badge_text: Color::rgb(1.0, 1.0, 1.0),
            dash_line: line.with_alpha(0.4),
            ref_line: ink(0.15, 0.12),
            ref_label: ink(0.45, 0.4),
            time_label: ink(0.35, 0.3),
            crosshair_line: ink(0.2, 0.12),
            tooltip_bg: if dark {
                Color::rgba8(30, 30, 30, 0.95)
            } else {
                Color::rgba(1.0, 1.0, 1.0, 0.95)
            },
            tooltip_text: if dark {
                Color::rgba8(0xe5, 0xe5, 0xe5, 1.0)
            } else {
                Color::rgba8(0x1a, 0x1a, 0x1a, 1.0)
            },
            background: if dark {
                Color::rgba8(10, 10, 10, 1.0)
            } else {
                Color::rgb(1.0, 1.0, 1.0)
            },
            label_font_px: 11.0,
            tooltip_font_px: 13.0,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::resolve(DEFAULT_LINE_COLOR, ThemeMode::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::{Palette, ThemeMode};
    use crate::render::Color;

    #[test]
    fn fill_alpha_depends_on_theme() {
        let line = Color::from_hex("#3b82f6").expect("hex");
        assert_eq!(Palette::resolve(line, ThemeMode::Dark).fill_top.alpha, 0.12);
        assert_eq!(Palette::resolve(line, ThemeMode::Light).fill_top.alpha, 0.08);
    }

    #[test]
    fn dash_line_is_translucent_accent() {
        let line = Color::rgb(1.0, 0.5, 0.0);
        let palette = Palette::resolve(line, ThemeMode::Dark);
        assert_eq!(palette.dash_line, line.with_alpha(0.4));
        palette.background.validate().expect("valid background");
    }
}
