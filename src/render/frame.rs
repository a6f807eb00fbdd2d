use serde::{Deserialize, Serialize};

use crate::core::Size;
use crate::error::{LivelineError, LivelineResult};
use crate::render::{
    CirclePrimitive, ClipRect, EdgeFadePrimitive, LinePrimitive, PathPrimitive, TextPrimitive,
};

/// One ordered step of a draw pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Line(LinePrimitive),
    Path(PathPrimitive),
    Circle(CirclePrimitive),
    Text(TextPrimitive),
    /// Intersects the clip with `rect` until the matching `PopClip`.
    PushClip(ClipRect),
    PopClip,
    EdgeFade(EdgeFadePrimitive),
}

/// Backend-agnostic scene for one chart draw pass.
///
/// Coordinates are device-independent pixels; backends scale by
/// `pixel_ratio`. `offset` translates the whole scene (screen shake).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub size: Size,
    pub pixel_ratio: f64,
    pub offset: (f64, f64),
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(size: Size, pixel_ratio: f64) -> Self {
        Self {
            size,
            pixel_ratio,
            offset: (0.0, 0.0),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn line(&mut self, line: LinePrimitive) {
        self.commands.push(DrawCommand::Line(line));
    }

    pub fn path(&mut self, path: PathPrimitive) {
        self.commands.push(DrawCommand::Path(path));
    }

    pub fn circle(&mut self, circle: CirclePrimitive) {
        self.commands.push(DrawCommand::Circle(circle));
    }

    pub fn text(&mut self, text: TextPrimitive) {
        self.commands.push(DrawCommand::Text(text));
    }

    pub fn push_clip(&mut self, rect: ClipRect) {
        self.commands.push(DrawCommand::PushClip(rect));
    }

    pub fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    #[must_use]
    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset = (dx, dy);
        self
    }

    #[must_use]
    pub fn lines(&self) -> impl Iterator<Item = &LinePrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line(line) => Some(line),
            _ => None,
        })
    }

    #[must_use]
    pub fn texts(&self) -> impl Iterator<Item = &TextPrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    #[must_use]
    pub fn paths(&self) -> impl Iterator<Item = &PathPrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Path(path) => Some(path),
            _ => None,
        })
    }

    #[must_use]
    pub fn circles(&self) -> impl Iterator<Item = &CirclePrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Circle(circle) => Some(circle),
            _ => None,
        })
    }

    pub fn validate(&self) -> LivelineResult<()> {
        if self.size.is_empty() {
            return Err(LivelineError::InvalidViewport {
                width: self.size.width.max(0.0) as u32,
                height: self.size.height.max(0.0) as u32,
            });
        }
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            return Err(LivelineError::InvalidData(
                "pixel ratio must be finite and > 0".to_owned(),
            ));
        }

        let mut clip_depth = 0usize;
        for command in &self.commands {
            match command {
                DrawCommand::Line(line) => line.validate()?,
                DrawCommand::Path(path) => path.validate()?,
                DrawCommand::Circle(circle) => circle.validate()?,
                DrawCommand::Text(text) => text.validate()?,
                DrawCommand::PushClip(_) => clip_depth += 1,
                DrawCommand::PopClip => {
                    clip_depth = clip_depth.checked_sub(1).ok_or_else(|| {
                        LivelineError::InvalidData("unbalanced clip pop".to_owned())
                    })?;
                }
                DrawCommand::EdgeFade(_) => {}
            }
        }
        if clip_depth != 0 {
            return Err(LivelineError::InvalidData(
                "unbalanced clip push".to_owned(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::RenderFrame;
    use crate::core::Size;
    use crate::render::{ClipRect, Color, LinePrimitive};

    #[test]
    fn unbalanced_clip_is_rejected() {
        let mut frame = RenderFrame::new(Size::new(100.0, 100.0), 1.0);
        frame.push_clip(ClipRect::new(0.0, 0.0, 10.0, 10.0));
        assert!(frame.validate().is_err());
        frame.pop_clip();
        frame.validate().expect("balanced");
    }

    #[test]
    fn invalid_line_fails_validation() {
        let mut frame = RenderFrame::new(Size::new(100.0, 100.0), 2.0);
        frame.line(LinePrimitive::new(0.0, f64::NAN, 1.0, 1.0, 1.0, Color::rgb(0.0, 0.0, 0.0)));
        assert!(frame.validate().is_err());
    }
}
