use crate::core::{
    ChartLayout, Momentum, PixelPoint, Sample, Size, SplineSegment, fit_monotone_spline,
};
use crate::render::{
    CirclePrimitive, ClipRect, DrawCommand, EdgeFadePrimitive, Fill, GradientStop, LinePrimitive,
    LineStrokeStyle, PathCommand, PathPrimitive, RenderFrame, Shadow, Stroke, TextHAlign,
    TextMeasurer, TextPrimitive, append_spline,
};

use super::engine_state::EngineState;
use super::hover::{Crosshair, draw_crosshair};
use super::{HoverResolution, LivelineConfig, ReferenceLine, SwingEvent, crosshair_opacity};

/// Width of the left-edge fade.
const EDGE_FADE_WIDTH_PX: f64 = 40.0;
/// Minimum scrub amount that dims the line right of the pointer.
const SCRUB_SPLIT_THRESHOLD: f64 = 0.05;
/// Live dot stays this far from the container's top and bottom.
const DOT_EDGE_MARGIN_PX: f64 = 10.0;
const PULSE_PERIOD_MS: f64 = 1500.0;
const PULSE_DURATION_MS: f64 = 900.0;
const REFERENCE_LABEL_GAP_PX: f64 = 8.0;

/// Resolved per-tick inputs to the draw pass.
pub(super) struct Scene<'a> {
    pub config: &'a LivelineConfig,
    pub layout: &'a ChartLayout,
    pub visible: &'a [Sample],
    pub smooth_value: f64,
    pub now: f64,
    pub wall_ms: f64,
    pub dt_ms: f64,
    pub pixel_ratio: f64,
    pub momentum: Momentum,
    pub swing: f64,
    pub hover: HoverResolution,
}

/// Builds the frame in fixed back-to-front order: reference line, grid,
/// order book, series, time axis, live dot, arrows, particles, left-edge
/// fade, crosshair.
pub(super) fn build_frame(
    state: &mut EngineState,
    scene: &Scene<'_>,
    measurer: &dyn TextMeasurer,
) -> RenderFrame {
    let config = scene.config;
    let layout = scene.layout;
    let palette = &config.palette;
    let mut frame = RenderFrame::new(Size::new(layout.width, layout.height), scene.pixel_ratio);

    if config.degen.is_some() {
        frame.offset = state.shake.offset(&mut state.rng);
        state.shake.decay(scene.dt_ms);
    }

    if let Some(reference) = &config.reference_line {
        draw_reference_line(&mut frame, layout, config, reference, measurer);
    }

    if config.show_grid {
        state.grid.advance(layout, scene.dt_ms);
        state
            .grid
            .draw(&mut frame, layout, palette, &config.format_value);
    }

    if let Some(book) = &config.orderbook {
        state
            .orderbook
            .advance(book, layout, scene.swing, scene.dt_ms, &mut state.rng);
        state.orderbook.draw(&mut frame, layout, palette);
    }

    let scrub = scene
        .hover
        .sample
        .filter(|_| scene.hover.scrub_amount > SCRUB_SPLIT_THRESHOLD)
        .map(|sample| (sample.x, scene.hover.scrub_amount));
    let live = draw_series(&mut frame, scene, scrub);

    state.time_axis.advance(
        layout,
        state.transition.target(),
        config.time_zone,
        &config.format_time,
        scene.dt_ms,
    );
    state.time_axis.draw(&mut frame, layout, palette, measurer);

    let dot_scrub = match scene.hover.sample {
        Some(sample) if scene.hover.scrub_amount > 0.0 => crosshair_opacity(
            live.0 - sample.x,
            layout.chart_width,
            scene.hover.scrub_amount,
        ),
        _ => scene.hover.scrub_amount,
    };
    draw_live_dot(&mut frame, live, config, dot_scrub, scene.wall_ms);

    if config.show_momentum {
        state.arrows.advance(scene.momentum, scene.dt_ms);
        state
            .arrows
            .draw(&mut frame, live.0, live.1, palette, scene.wall_ms);
    }

    if let Some(degen) = config.degen {
        let event = SwingEvent {
            momentum: scene.momentum,
            origin: live,
            swing: scene.swing,
            accent: palette.line,
        };
        let burst = state
            .particles
            .spawn_on_swing(event, scene.dt_ms, degen, &mut state.rng);
        if burst > 0.0 {
            state.shake.kick(scene.swing, burst);
        }
        state.particles.advance(scene.dt_ms);
        state.particles.draw(&mut frame);
    }

    frame.push(DrawCommand::EdgeFade(EdgeFadePrimitive {
        from_x: layout.plot_left(),
        to_x: layout.plot_left() + EDGE_FADE_WIDTH_PX,
        height: layout.height,
    }));

    if let Some(sample) = scene.hover.sample {
        let opacity = crosshair_opacity(
            live.0 - sample.x,
            layout.chart_width,
            scene.hover.scrub_amount,
        );
        if opacity > 0.01 {
            let crosshair = Crosshair {
                sample,
                opacity,
                live_dot_x: live.0,
            };
            draw_crosshair(&mut frame, layout, config, crosshair, measurer);
        }
    }

    frame
}

fn draw_reference_line(
    frame: &mut RenderFrame,
    layout: &ChartLayout,
    config: &LivelineConfig,
    reference: &ReferenceLine,
    measurer: &dyn TextMeasurer,
) {
    let palette = &config.palette;
    let y = layout.to_y(reference.value);
    if y < layout.plot_top() - 10.0 || y > layout.plot_bottom() + 10.0 {
        return;
    }
    let left = layout.plot_left();
    let right = layout.plot_right();

    match reference.label.as_deref().filter(|label| !label.is_empty()) {
        Some(label) => {
            let text_width = measurer.measure_text(label, palette.label_font_px);
            let center_x = left + layout.chart_width / 2.0;
            let gap_left = center_x - text_width / 2.0 - REFERENCE_LABEL_GAP_PX;
            let gap_right = center_x + text_width / 2.0 + REFERENCE_LABEL_GAP_PX;
            frame.line(LinePrimitive::new(left, y, gap_left, y, 1.0, palette.ref_line));
            frame.line(LinePrimitive::new(gap_right, y, right, y, 1.0, palette.ref_line));
            frame.text(
                TextPrimitive::new(
                    label,
                    center_x,
                    y + 4.0,
                    palette.label_font_px,
                    palette.ref_label,
                    TextHAlign::Center,
                )
                .with_weight(500),
            );
        }
        None => frame.line(
            LinePrimitive::new(left, y, right, y, 1.0, palette.ref_line).with_stroke_style(
                LineStrokeStyle::Dashed {
                    on_px: 4.0,
                    off_px: 4.0,
                },
            ),
        ),
    }
}

/// Draws the filled spline and the dashed live-value line; returns the
/// live dot position.
fn draw_series(
    frame: &mut RenderFrame,
    scene: &Scene<'_>,
    scrub: Option<(f64, f64)>,
) -> PixelPoint {
    let layout = scene.layout;
    let palette = &scene.config.palette;
    let smooth_y = layout.clamp_y(layout.to_y(scene.smooth_value));

    let last_index = scene.visible.len().saturating_sub(1);
    let mut points: Vec<PixelPoint> = Vec::with_capacity(scene.visible.len() + 1);
    points.extend(scene.visible.iter().enumerate().map(|(index, sample)| {
        let value = if index == last_index {
            scene.smooth_value
        } else {
            sample.value
        };
        (layout.to_x(sample.time), layout.clamp_y(layout.to_y(value)))
    }));
    points.push((layout.to_x(scene.now), smooth_y));
    let segments = fit_monotone_spline(&points);

    frame.push_clip(ClipRect::new(
        layout.plot_left() - 1.0,
        layout.plot_top(),
        layout.chart_width + 2.0,
        layout.chart_height,
    ));
    match scrub {
        Some((x, amount)) => {
            frame.push_clip(ClipRect::new(0.0, 0.0, x, layout.height));
            push_curve(frame, scene, &points, &segments, 1.0);
            frame.pop_clip();
            frame.push_clip(ClipRect::new(x, 0.0, layout.width - x, layout.height));
            push_curve(frame, scene, &points, &segments, 1.0 - amount * 0.6);
            frame.pop_clip();
        }
        None => push_curve(frame, scene, &points, &segments, 1.0),
    }
    frame.pop_clip();

    let dash_alpha = scrub.map_or(1.0, |(_, amount)| 1.0 - amount * 0.2);
    frame.line(
        LinePrimitive::new(
            layout.plot_left(),
            smooth_y,
            layout.plot_right(),
            smooth_y,
            1.0,
            palette.dash_line.fade(dash_alpha),
        )
        .with_stroke_style(LineStrokeStyle::Dashed {
            on_px: 4.0,
            off_px: 4.0,
        }),
    );

    let (x, y) = points[points.len() - 1];
    let max_y = (layout.height - DOT_EDGE_MARGIN_PX).max(DOT_EDGE_MARGIN_PX);
    (x, y.clamp(DOT_EDGE_MARGIN_PX, max_y))
}

fn push_curve(
    frame: &mut RenderFrame,
    scene: &Scene<'_>,
    points: &[PixelPoint],
    segments: &[SplineSegment],
    alpha: f64,
) {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    let layout = scene.layout;
    let palette = &scene.config.palette;
    let alpha = alpha.clamp(0.0, 1.0);

    if scene.config.show_fill {
        let bottom = layout.plot_bottom();
        let mut commands = Vec::with_capacity(segments.len() + 4);
        commands.push(PathCommand::MoveTo {
            x: first.0,
            y: bottom,
        });
        commands.push(PathCommand::LineTo {
            x: first.0,
            y: first.1,
        });
        append_spline(&mut commands, segments);
        commands.push(PathCommand::LineTo { x: last.0, y: bottom });
        commands.push(PathCommand::Close);
        frame.path(
            PathPrimitive::new(commands)
                .with_fill(Fill::LinearGradient {
                    x0: 0.0,
                    y0: layout.plot_top(),
                    x1: 0.0,
                    y1: bottom,
                    stops: vec![
                        GradientStop {
                            offset: 0.0,
                            color: palette.fill_top,
                        },
                        GradientStop {
                            offset: 1.0,
                            color: palette.fill_bottom,
                        },
                    ],
                })
                .with_alpha(alpha),
        );
    }

    let mut commands = Vec::with_capacity(segments.len() + 1);
    commands.push(PathCommand::MoveTo {
        x: first.0,
        y: first.1,
    });
    append_spline(&mut commands, segments);
    frame.path(
        PathPrimitive::new(commands)
            .with_stroke(Stroke::solid(palette.line, palette.line_width).rounded())
            .with_alpha(alpha),
    );
}

/// Live dot with its pulse ring, dimmed while scrubbing.
fn draw_live_dot(
    frame: &mut RenderFrame,
    (x, y): PixelPoint,
    config: &LivelineConfig,
    scrub: f64,
    wall_ms: f64,
) {
    let palette = &config.palette;
    let dim = scrub * 0.7;

    if config.show_pulse && dim < 0.3 {
        let t = wall_ms.rem_euclid(PULSE_PERIOD_MS) / PULSE_DURATION_MS;
        if t < 1.0 {
            let ring_alpha = 0.35 * (1.0 - t) * (1.0 - dim * 3.0);
            frame.circle(CirclePrimitive::stroked(
                x,
                y,
                9.0 + t * 12.0,
                Stroke::solid(palette.line.fade(ring_alpha), 1.5),
            ));
        }
    }

    frame.circle(
        CirclePrimitive::filled(x, y, 6.5, palette.badge_outer_bg).with_shadow(Shadow {
            color: palette.badge_outer_shadow,
            blur_px: 6.0 * (1.0 - dim),
            offset_y: 1.0,
        }),
    );

    let core = if dim > 0.01 {
        palette.line.mix(palette.badge_outer_bg, dim)
    } else {
        palette.line
    };
    frame.circle(CirclePrimitive::filled(x, y, 3.5, core));
}
