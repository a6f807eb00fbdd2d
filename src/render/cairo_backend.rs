use cairo::{Context, Format, ImageSurface, LineCap, LineJoin, LinearGradient, Operator};
use pango::FontDescription;

use crate::core::Viewport;
use crate::error::{LivelineError, LivelineResult};
use crate::render::{
    CirclePrimitive, Color, DrawCommand, EdgeFadePrimitive, Fill, LinePrimitive,
    LineStrokeStyle, PathCommand, PathPrimitive, RenderFrame, Renderer, Stroke, TextBaseline,
    TextHAlign, TextMeasurer, TextPrimitive,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub paths_drawn: usize,
    pub circles_drawn: usize,
    pub texts_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> LivelineResult<()>;
}

/// Cairo + Pango + PangoCairo renderer backend.
///
/// This renderer supports two modes:
/// - offscreen image-surface rendering through `Renderer::render`
/// - in-place rendering on an external Cairo context through
///   `CairoContextRenderer`
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> LivelineResult<Self> {
        Ok(Self {
            surface: create_surface(width, height)?,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Recreates the offscreen surface when its physical size changed.
    pub fn ensure_size(&mut self, viewport: Viewport) -> LivelineResult<()> {
        let width = i32::try_from(viewport.width)
            .map_err(|_| LivelineError::Backend("surface width overflow".to_owned()))?;
        let height = i32::try_from(viewport.height)
            .map_err(|_| LivelineError::Backend("surface height overflow".to_owned()))?;
        if self.surface.width() != width || self.surface.height() != height {
            self.surface = create_surface(width, height)?;
        }
        Ok(())
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> LivelineResult<()> {
        frame.validate()?;

        context
            .save()
            .map_err(|err| map_backend_error("failed to save context", err))?;
        context.set_operator(Operator::Clear);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;
        context.set_operator(Operator::Over);
        context.scale(frame.pixel_ratio, frame.pixel_ratio);
        context.translate(frame.offset.0, frame.offset.1);

        let mut stats = CairoRenderStats::default();
        for command in &frame.commands {
            match command {
                DrawCommand::Line(line) => {
                    draw_line(context, line)?;
                    stats.lines_drawn += 1;
                }
                DrawCommand::Path(path) => {
                    draw_path(context, path)?;
                    stats.paths_drawn += 1;
                }
                DrawCommand::Circle(circle) => {
                    draw_circle(context, circle)?;
                    stats.circles_drawn += 1;
                }
                DrawCommand::Text(text) => {
                    draw_text(context, text)?;
                    stats.texts_drawn += 1;
                }
                DrawCommand::PushClip(rect) => {
                    context
                        .save()
                        .map_err(|err| map_backend_error("failed to save clip", err))?;
                    context.rectangle(rect.x, rect.y, rect.width, rect.height);
                    context.clip();
                }
                DrawCommand::PopClip => {
                    context
                        .restore()
                        .map_err(|err| map_backend_error("failed to restore clip", err))?;
                }
                DrawCommand::EdgeFade(fade) => draw_edge_fade(context, fade)?,
            }
        }

        context
            .restore()
            .map_err(|err| map_backend_error("failed to restore context", err))?;
        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> LivelineResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> LivelineResult<()> {
        self.render_with_context(context, frame)
    }
}

impl TextMeasurer for CairoRenderer {
    fn measure_text(&self, text: &str, font_size_px: f64) -> f64 {
        let Ok(context) = Context::new(&self.surface) else {
            return 0.0;
        };
        let layout = pangocairo::functions::create_layout(&context);
        layout.set_font_description(Some(&font_description(font_size_px, 400)));
        layout.set_text(text);
        let (width, _height) = layout.pixel_size();
        f64::from(width)
    }
}

fn create_surface(width: i32, height: i32) -> LivelineResult<ImageSurface> {
    if width <= 0 || height <= 0 {
        return Err(LivelineError::InvalidData(
            "cairo surface size must be > 0".to_owned(),
        ));
    }
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn apply_stroke(context: &Context, stroke: Stroke) {
    apply_color(context, stroke.color);
    context.set_line_width(stroke.width);
    match stroke.style {
        LineStrokeStyle::Solid => context.set_dash(&[], 0.0),
        LineStrokeStyle::Dashed { on_px, off_px } => context.set_dash(&[on_px, off_px], 0.0),
    }
    if stroke.round_joins {
        context.set_line_join(LineJoin::Round);
        context.set_line_cap(LineCap::Round);
    } else {
        context.set_line_join(LineJoin::Miter);
        context.set_line_cap(LineCap::Butt);
    }
}

fn draw_line(context: &Context, line: &LinePrimitive) -> LivelineResult<()> {
    apply_stroke(
        context,
        Stroke {
            color: line.color,
            width: line.stroke_width,
            style: line.stroke_style,
            round_joins: false,
        },
    );
    context.move_to(line.x1, line.y1);
    context.line_to(line.x2, line.y2);
    context
        .stroke()
        .map_err(|err| map_backend_error("failed to stroke line", err))
}

fn append_path(context: &Context, commands: &[PathCommand]) {
    context.new_path();
    for command in commands {
        match *command {
            PathCommand::MoveTo { x, y } => context.move_to(x, y),
            PathCommand::LineTo { x, y } => context.line_to(x, y),
            PathCommand::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => context.curve_to(x1, y1, x2, y2, x, y),
            PathCommand::Arc {
                cx,
                cy,
                radius,
                start,
                end,
            } => context.arc(cx, cy, radius, start, end),
            PathCommand::Close => context.close_path(),
        }
    }
}

fn draw_path(context: &Context, path: &PathPrimitive) -> LivelineResult<()> {
    let grouped = path.alpha < 1.0;
    if grouped {
        context.push_group();
    }

    if let Some(fill) = &path.fill {
        append_path(context, &path.commands);
        match fill {
            Fill::Solid(color) => apply_color(context, *color),
            Fill::LinearGradient {
                x0,
                y0,
                x1,
                y1,
                stops,
            } => {
                let gradient = LinearGradient::new(*x0, *y0, *x1, *y1);
                for stop in stops {
                    gradient.add_color_stop_rgba(
                        stop.offset,
                        stop.color.red,
                        stop.color.green,
                        stop.color.blue,
                        stop.color.alpha,
                    );
                }
                context
                    .set_source(&gradient)
                    .map_err(|err| map_backend_error("failed to set gradient", err))?;
            }
        }
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill path", err))?;
    }

    if let Some(stroke) = path.stroke {
        append_path(context, &path.commands);
        apply_stroke(context, stroke);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke path", err))?;
    }

    if grouped {
        context
            .pop_group_to_source()
            .map_err(|err| map_backend_error("failed to pop path group", err))?;
        context
            .paint_with_alpha(path.alpha)
            .map_err(|err| map_backend_error("failed to paint path group", err))?;
    }
    Ok(())
}

fn draw_circle(context: &Context, circle: &CirclePrimitive) -> LivelineResult<()> {
    if let Some(shadow) = circle.shadow {
        // Cairo has no blur; a widened translucent disc stands in for it.
        context.new_path();
        context.arc(
            circle.x,
            circle.y + shadow.offset_y,
            circle.radius + shadow.blur_px * 0.25,
            0.0,
            std::f64::consts::TAU,
        );
        apply_color(context, shadow.color);
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill shadow", err))?;
    }
    if let Some(color) = circle.fill {
        context.new_path();
        context.arc(circle.x, circle.y, circle.radius, 0.0, std::f64::consts::TAU);
        apply_color(context, color);
        context
            .fill()
            .map_err(|err| map_backend_error("failed to fill circle", err))?;
    }
    if let Some(stroke) = circle.stroke {
        context.new_path();
        context.arc(circle.x, circle.y, circle.radius, 0.0, std::f64::consts::TAU);
        apply_stroke(context, stroke);
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke circle", err))?;
    }
    Ok(())
}

fn font_description(font_size_px: f64, weight: u16) -> FontDescription {
    let mut description = FontDescription::from_string("Monospace");
    description.set_absolute_size(font_size_px * f64::from(pango::SCALE));
    description.set_weight(match weight {
        600.. => pango::Weight::Semibold,
        500..=599 => pango::Weight::Medium,
        _ => pango::Weight::Normal,
    });
    description
}

fn draw_text(context: &Context, text: &TextPrimitive) -> LivelineResult<()> {
    let layout = pangocairo::functions::create_layout(context);
    layout.set_font_description(Some(&font_description(
        text.font_size_px,
        text.font_weight,
    )));
    layout.set_text(&text.text);

    let (text_width, text_height) = layout.pixel_size();
    let x = match text.h_align {
        TextHAlign::Left => text.x,
        TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
        TextHAlign::Right => text.x - f64::from(text_width),
    };
    let y = match text.baseline {
        TextBaseline::Alphabetic => text.y - f64::from(layout.baseline()) / f64::from(pango::SCALE),
        TextBaseline::Middle => text.y - f64::from(text_height) / 2.0,
    };

    if let Some(outline) = text.outline {
        context.new_path();
        context.move_to(x, y);
        pangocairo::functions::layout_path(context, &layout);
        apply_stroke(
            context,
            Stroke::solid(outline.color, outline.width).rounded(),
        );
        context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke text outline", err))?;
    }

    apply_color(context, text.color);
    context.move_to(x, y);
    pangocairo::functions::show_layout(context, &layout);
    Ok(())
}

fn draw_edge_fade(context: &Context, fade: &EdgeFadePrimitive) -> LivelineResult<()> {
    context
        .save()
        .map_err(|err| map_backend_error("failed to save edge fade", err))?;
    context.set_operator(Operator::DestOut);
    let gradient = LinearGradient::new(fade.from_x, 0.0, fade.to_x, 0.0);
    gradient.add_color_stop_rgba(0.0, 0.0, 0.0, 0.0, 1.0);
    gradient.add_color_stop_rgba(1.0, 0.0, 0.0, 0.0, 0.0);
    context
        .set_source(&gradient)
        .map_err(|err| map_backend_error("failed to set edge fade gradient", err))?;
    context.rectangle(0.0, 0.0, fade.to_x, fade.height);
    context
        .fill()
        .map_err(|err| map_backend_error("failed to fill edge fade", err))?;
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore edge fade", err))
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> LivelineError {
    LivelineError::Backend(format!("{prefix}: {err}"))
}
