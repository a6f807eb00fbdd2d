use serde::{Deserialize, Serialize};

use crate::core::SplineSegment;
use crate::error::{LivelineError, LivelineResult};
use crate::render::{Color, LineStrokeStyle};

/// One drawing instruction of a vector path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    CubicTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// Clockwise arc around `(cx, cy)` from `start` to `end` radians.
    Arc {
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
    },
    Close,
}

impl PathCommand {
    fn coordinates(self) -> impl Iterator<Item = f64> {
        let values: [f64; 6] = match self {
            Self::MoveTo { x, y } | Self::LineTo { x, y } => [x, y, 0.0, 0.0, 0.0, 0.0],
            Self::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => [x1, y1, x2, y2, x, y],
            Self::Arc {
                cx,
                cy,
                radius,
                start,
                end,
            } => [cx, cy, radius, start, end, 0.0],
            Self::Close => [0.0; 6],
        };
        values.into_iter()
    }
}

/// Appends spline pieces to a path that already sits at the spline start.
pub fn append_spline(commands: &mut Vec<PathCommand>, segments: &[SplineSegment]) {
    commands.extend(segments.iter().map(|segment| match *segment {
        SplineSegment::Line { to } => PathCommand::LineTo { x: to.0, y: to.1 },
        SplineSegment::Cubic {
            control1,
            control2,
            to,
            ..
        } => PathCommand::CubicTo {
            x1: control1.0,
            y1: control1.1,
            x2: control2.0,
            y2: control2.1,
            x: to.0,
            y: to.1,
        },
    }));
}

/// Color stop of a linear gradient, `offset` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// Fill paint for closed paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fill {
    Solid(Color),
    LinearGradient {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        stops: Vec<GradientStop>,
    },
}

/// Stroke paint for open or closed paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub style: LineStrokeStyle,
    pub round_joins: bool,
}

impl Stroke {
    #[must_use]
    pub const fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            style: LineStrokeStyle::Solid,
            round_joins: false,
        }
    }

    #[must_use]
    pub const fn rounded(mut self) -> Self {
        self.round_joins = true;
        self
    }
}

/// Blurred drop shadow cast by a filled shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: Color,
    pub blur_px: f64,
    pub offset_y: f64,
}

/// Vector path with optional fill and stroke, filled before stroking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPrimitive {
    pub commands: Vec<PathCommand>,
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
    pub alpha: f64,
}

impl PathPrimitive {
    #[must_use]
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Self {
            commands,
            fill: None,
            stroke: None,
            alpha: 1.0,
        }
    }

    #[must_use]
    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn validate(&self) -> LivelineResult<()> {
        if self.commands.is_empty() {
            return Err(LivelineError::InvalidData(
                "path primitive must not be empty".to_owned(),
            ));
        }
        if self
            .commands
            .iter()
            .flat_map(|command| command.coordinates())
            .any(|value| !value.is_finite())
        {
            return Err(LivelineError::InvalidData(
                "path coordinates must be finite".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(LivelineError::InvalidData(
                "path alpha must be in [0, 1]".to_owned(),
            ));
        }
        match &self.fill {
            Some(Fill::Solid(color)) => color.validate()?,
            Some(Fill::LinearGradient { stops, .. }) => {
                for stop in stops {
                    stop.color.validate()?;
                }
            }
            None => {}
        }
        if let Some(stroke) = self.stroke {
            if !stroke.width.is_finite() || stroke.width <= 0.0 {
                return Err(LivelineError::InvalidData(
                    "path stroke width must be finite and > 0".to_owned(),
                ));
            }
            stroke.color.validate()?;
        }
        Ok(())
    }
}

/// Filled and/or stroked circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePrimitive {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
    pub shadow: Option<Shadow>,
}

impl CirclePrimitive {
    #[must_use]
    pub const fn filled(x: f64, y: f64, radius: f64, color: Color) -> Self {
        Self {
            x,
            y,
            radius,
            fill: Some(color),
            stroke: None,
            shadow: None,
        }
    }

    #[must_use]
    pub const fn stroked(x: f64, y: f64, radius: f64, stroke: Stroke) -> Self {
        Self {
            x,
            y,
            radius,
            fill: None,
            stroke: Some(stroke),
            shadow: None,
        }
    }

    #[must_use]
    pub const fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn validate(self) -> LivelineResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(LivelineError::InvalidData(
                "circle center must be finite".to_owned(),
            ));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(LivelineError::InvalidData(
                "circle radius must be finite and >= 0".to_owned(),
            ));
        }
        if let Some(color) = self.fill {
            color.validate()?;
        }
        if let Some(stroke) = self.stroke {
            stroke.color.validate()?;
        }
        Ok(())
    }
}

/// Axis-aligned clip rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ClipRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Erases already drawn content over `[0, to_x] x [0, height]`, fully at
/// `from_x` and less toward `to_x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeFadePrimitive {
    pub from_x: f64,
    pub to_x: f64,
    pub height: f64,
}
