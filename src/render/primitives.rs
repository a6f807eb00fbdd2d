use serde::{Deserialize, Serialize};

use crate::error::{LivelineError, LivelineResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 8-bit channels.
    #[must_use]
    pub fn rgba8(red: u8, green: u8, blue: u8, alpha: f64) -> Self {
        Self::rgba(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            alpha,
        )
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(raw: &str) -> LivelineResult<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(LivelineError::InvalidData(format!(
                "invalid hex color `{raw}`"
            )));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|ch| [ch, ch]).collect(),
            6 | 8 => hex.to_owned(),
            _ => {
                return Err(LivelineError::InvalidData(format!(
                    "unsupported hex color `{raw}`"
                )));
            }
        };
        let channel = |index: usize| {
            u8::from_str_radix(&expanded[index..index + 2], 16)
                .map_err(|_| LivelineError::InvalidData(format!("invalid hex color `{raw}`")))
        };
        let alpha = if expanded.len() == 8 {
            f64::from(channel(6)?) / 255.0
        } else {
            1.0
        };
        Ok(Self::rgba8(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Parses a hex color or a CSS `rgb(..)` / `rgba(..)` function.
    pub fn parse(raw: &str) -> LivelineResult<Self> {
        let trimmed = raw.trim();
        if trimmed.starts_with('#') {
            return Self::from_hex(trimmed);
        }
        let inner = trimmed
            .strip_prefix("rgba(")
            .or_else(|| trimmed.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| LivelineError::InvalidData(format!("unsupported color `{raw}`")))?;
        let parts: Vec<f64> = inner
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| LivelineError::InvalidData(format!("invalid color `{raw}`")))?;
        match parts.as_slice() {
            [r, g, b] => Ok(Self::rgba(r / 255.0, g / 255.0, b / 255.0, 1.0)),
            [r, g, b, a] => Ok(Self::rgba(r / 255.0, g / 255.0, b / 255.0, *a)),
            _ => Err(LivelineError::InvalidData(format!(
                "invalid color `{raw}`"
            ))),
        }
    }

    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> Self {
        Self::rgba(self.red, self.green, self.blue, alpha)
    }

    /// Multiplies the alpha channel, clamped to `[0, 1]`.
    #[must_use]
    pub fn fade(self, factor: f64) -> Self {
        self.with_alpha((self.alpha * factor).clamp(0.0, 1.0))
    }

    /// Channel-wise blend toward `other`, rounded to 8-bit steps like a CSS
    /// `rgb()` color. The result is opaque.
    #[must_use]
    pub fn mix(self, other: Self, t: f64) -> Self {
        let channel = |a: f64, b: f64| ((a + (b - a) * t) * 255.0).round() / 255.0;
        Self::rgb(
            channel(self.red, other.red),
            channel(self.green, other.green),
            channel(self.blue, other.blue),
        )
    }

    pub fn validate(self) -> LivelineResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(LivelineError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Stroke pattern for line primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum LineStrokeStyle {
    #[default]
    Solid,
    Dashed {
        on_px: f64,
        off_px: f64,
    },
}

/// Draw command for one line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Color,
    pub stroke_style: LineStrokeStyle,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64, color: Color) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            stroke_width,
            color,
            stroke_style: LineStrokeStyle::Solid,
        }
    }

    #[must_use]
    pub const fn with_stroke_style(mut self, stroke_style: LineStrokeStyle) -> Self {
        self.stroke_style = stroke_style;
        self
    }

    pub fn validate(self) -> LivelineResult<()> {
        if !self.x1.is_finite()
            || !self.y1.is_finite()
            || !self.x2.is_finite()
            || !self.y2.is_finite()
        {
            return Err(LivelineError::InvalidData(
                "line coordinates must be finite".to_owned(),
            ));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(LivelineError::InvalidData(
                "line stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Vertical anchor of `TextPrimitive::y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Middle,
}

/// Outline stroked behind a label's glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextOutline {
    pub color: Color,
    pub width: f64,
}

/// Draw command for one label in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub font_weight: u16,
    pub color: Color,
    pub h_align: TextHAlign,
    pub baseline: TextBaseline,
    pub outline: Option<TextOutline>,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            font_weight: 400,
            color,
            h_align,
            baseline: TextBaseline::Alphabetic,
            outline: None,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, font_weight: u16) -> Self {
        self.font_weight = font_weight;
        self
    }

    #[must_use]
    pub fn with_baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    #[must_use]
    pub fn with_outline(mut self, color: Color, width: f64) -> Self {
        self.outline = Some(TextOutline { color, width });
        self
    }

    pub fn validate(&self) -> LivelineResult<()> {
        if self.text.is_empty() {
            return Err(LivelineError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(LivelineError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(LivelineError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        if let Some(outline) = self.outline {
            outline.color.validate()?;
        }
        self.color.validate()
    }
}
