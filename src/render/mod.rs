mod frame;
mod null_renderer;
mod primitives;
mod shapes;
mod text_metrics;

pub use frame::{DrawCommand, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, LinePrimitive, LineStrokeStyle, TextBaseline, TextHAlign, TextOutline, TextPrimitive,
};
pub use shapes::{
    CirclePrimitive, ClipRect, EdgeFadePrimitive, Fill, GradientStop, PathCommand, PathPrimitive,
    Shadow, Stroke, append_spline,
};
pub use text_metrics::{EstimatedTextMeasurer, TextMeasurer};

use crate::error::LivelineResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from animation state and input handling.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> LivelineResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
