use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{
    ChartLayout, DEFAULT_MOMENTUM_LOOKBACK, Momentum, Size, ValueRange, Viewport, WindowStep,
    collect_visible_samples, compute_range, detect_momentum, lerp_snap, swing_magnitude,
    visible_samples, window_buffer, window_edges,
};
use crate::interaction::{InputEvent, InputOutcome, PointerTracker};
use crate::render::{Color, EstimatedTextMeasurer, RenderFrame, Renderer, TextMeasurer};

use super::engine_state::EngineState;
use super::frame_builder::{Scene, build_frame};
use super::{BadgeFrame, BadgeOverlay, FrameScheduler, HoverPoint, LivelineConfig};

/// Device pixel ratios above this are rendered at this density.
pub const MAX_PIXEL_RATIO: f64 = 3.0;
/// Extra convergence speed when the live value is close to the display.
const ADAPTIVE_SPEED_BOOST: f64 = 0.2;
/// The display value snaps once within this share of the displayed span.
const VALUE_SNAP_RATIO: f64 = 1e-3;
const RANGE_SNAP_FALLBACK: f64 = 1e-3;

/// Timestamps of one host frame.
///
/// `monotonic_ms` drives transitions and delta time; `wall_ms` is unix time
/// and places "now" on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    pub monotonic_ms: f64,
    pub wall_ms: f64,
}

impl FrameClock {
    #[must_use]
    pub const fn new(monotonic_ms: f64, wall_ms: f64) -> Self {
        Self {
            monotonic_ms,
            wall_ms,
        }
    }

    /// Samples the system clocks; `monotonic_ms` counts from `origin`.
    #[must_use]
    pub fn now(origin: Instant) -> Self {
        Self {
            monotonic_ms: origin.elapsed().as_secs_f64() * 1000.0,
            wall_ms: Utc::now().timestamp_millis() as f64,
        }
    }
}

/// Host-independent inputs of a single tick.
#[derive(Clone, Copy)]
pub struct TickInput<'a> {
    /// Container content box in device-independent pixels.
    pub size: Size,
    pub pixel_ratio: f64,
    pub clock: FrameClock,
    pub dt_ms: f64,
    pub hover_x: Option<f64>,
    pub reduced_motion: bool,
    pub measurer: &'a dyn TextMeasurer,
}

/// Why a tick produced no frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    /// The container has no area yet.
    EmptySurface,
    /// The surface could not provide a drawing context this tick.
    NoContext,
    /// Fewer than two samples in the series.
    NotEnoughData,
    /// Fewer than two samples inside the displayed window.
    NotEnoughVisibleData,
    /// The renderer rejected the frame.
    RenderFailed,
}

/// Current value shown next to the chart when enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueReadout {
    pub text: String,
    /// Momentum tint, if momentum coloring is enabled and not flat.
    pub color: Option<Color>,
}

/// Everything one drawn tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnFrame {
    pub frame: RenderFrame,
    pub badge: Option<BadgeOverlay>,
    pub hover: Option<HoverPoint>,
    pub readout: Option<ValueReadout>,
    pub momentum: Momentum,
    pub display_value: f64,
    pub display_range: ValueRange,
    pub window_secs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Drawn(Box<DrawnFrame>),
}

impl TickOutcome {
    #[must_use]
    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn(_))
    }

    #[must_use]
    pub fn drawn(&self) -> Option<&DrawnFrame> {
        match self {
            Self::Drawn(drawn) => Some(&**drawn),
            Self::Skipped(_) => None,
        }
    }

    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped(reason) => Some(*reason),
            Self::Drawn(_) => None,
        }
    }
}

/// Advances every animation by one frame and builds the frame to draw.
///
/// The live value and the value range converge faster the closer they
/// already are; a changed window length starts a log-scale transition.
/// Reduced motion snaps every animated quantity onto its target.
pub fn tick(state: &mut EngineState, config: &LivelineConfig, input: &TickInput<'_>) -> TickOutcome {
    if input.size.is_empty() {
        return TickOutcome::Skipped(SkipReason::EmptySurface);
    }
    if config.data.len() < 2 {
        return TickOutcome::Skipped(SkipReason::NotEnoughData);
    }

    let no_motion = input.reduced_motion;
    let dt_ms = input.dt_ms;
    let previous_span = non_zero_or(state.display_range.span(), 1.0);
    let gap_ratio = ((config.value - state.display_value).abs() / previous_span).min(1.0);
    let adaptive_speed = if no_motion {
        1.0
    } else {
        (config.lerp_speed + (1.0 - gap_ratio) * ADAPTIVE_SPEED_BOOST).min(1.0)
    };
    state.display_value = if no_motion {
        config.value
    } else {
        lerp_snap(
            state.display_value,
            config.value,
            adaptive_speed,
            dt_ms,
            previous_span * VALUE_SNAP_RATIO,
        )
    };
    let smooth_value = state.display_value;

    let chart_width = input.size.width - config.padding.left - config.padding.right;
    let chart_height = input.size.height - config.padding.top - config.padding.bottom;
    let buffer = window_buffer(chart_width, config.show_momentum);
    let now = input.clock.wall_ms / 1000.0;
    let reference_value = config.reference_line.as_ref().map(|line| line.value);

    let started = state.transition.retarget(
        config.window_secs,
        state.display_window,
        state.display_range,
        input.clock.monotonic_ms,
        || {
            let (left, right) = window_edges(now, config.window_secs, buffer);
            let target_visible = visible_samples(&config.data, left, right);
            (!target_visible.is_empty()).then(|| {
                compute_range(
                    &target_visible,
                    smooth_value,
                    reference_value,
                    config.exaggerate,
                )
            })
        },
    );
    if started {
        debug!(
            from = state.display_window,
            to = config.window_secs,
            "start window transition"
        );
    }
    let step = state.transition.advance(input.clock.monotonic_ms, no_motion);
    state.display_window = step.window_secs;

    let edges = window_edges(now, step.window_secs, buffer);
    let mut visible = std::mem::take(&mut state.visible);
    collect_visible_samples(&config.data, edges.0, edges.1, &mut visible);
    if visible.len() < 2 {
        state.visible = visible;
        return TickOutcome::Skipped(SkipReason::NotEnoughVisibleData);
    }

    let computed = compute_range(&visible, smooth_value, reference_value, config.exaggerate);
    update_range(state, computed, step, adaptive_speed, dt_ms, chart_height, no_motion);

    let layout = ChartLayout::new(input.size, config.padding, edges, state.display_range);
    let momentum = config
        .momentum_override
        .unwrap_or_else(|| detect_momentum(&visible, DEFAULT_MOMENTUM_LOOKBACK));
    let hover = state
        .hover
        .update(input.hover_x, &layout, now, &visible, no_motion);
    let swing = swing_magnitude(&visible, layout.value_span);

    let scene = Scene {
        config,
        layout: &layout,
        visible: &visible,
        smooth_value,
        now,
        wall_ms: input.clock.wall_ms,
        dt_ms,
        pixel_ratio: input.pixel_ratio,
        momentum,
        swing,
        hover,
    };
    let frame = build_frame(state, &scene, input.measurer);
    let badge = state.badge.update(
        config,
        BadgeFrame {
            layout: &layout,
            smooth_value,
            momentum,
            transitioning: step.active,
            no_motion,
            dt_ms,
        },
        input.measurer,
    );
    let readout = config
        .show_value
        .then(|| value_readout(config, smooth_value, momentum));
    trace!(
        visible = visible.len(),
        display_value = smooth_value,
        window_secs = step.window_secs,
        commands = frame.commands.len(),
        "tick"
    );
    state.visible = visible;

    TickOutcome::Drawn(Box::new(DrawnFrame {
        frame,
        badge,
        hover: hover.active,
        readout,
        momentum,
        display_value: smooth_value,
        display_range: state.display_range,
        window_secs: step.window_secs,
    }))
}

fn update_range(
    state: &mut EngineState,
    computed: ValueRange,
    step: WindowStep,
    speed: f64,
    dt_ms: f64,
    chart_height: f64,
    no_motion: bool,
) {
    state.target_range = computed;
    if !state.range_ready {
        state.display_range = computed;
        state.range_ready = true;
        return;
    }
    if step.active {
        state.display_range = state.transition.interpolate_range(step.progress);
        return;
    }
    if no_motion {
        state.display_range = computed;
        return;
    }

    let epsilon = non_zero_or(
        0.5 * state.display_range.span() / chart_height,
        RANGE_SNAP_FALLBACK,
    );
    state.display_range = ValueRange::new(
        lerp_snap(state.display_range.min, computed.min, speed, dt_ms, epsilon),
        lerp_snap(state.display_range.max, computed.max, speed, dt_ms, epsilon),
    );
}

fn non_zero_or(value: f64, fallback: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        fallback
    } else {
        value
    }
}

fn value_readout(config: &LivelineConfig, smooth_value: f64, momentum: Momentum) -> ValueReadout {
    if !config.value_momentum_color {
        return ValueReadout {
            text: (config.format_value)(smooth_value),
            color: None,
        };
    }
    let color = match momentum {
        Momentum::Up => Some(config.palette.dot_up),
        Momentum::Down => Some(config.palette.dot_down),
        Momentum::Flat => None,
    };
    ValueReadout {
        text: (config.format_value)(smooth_value.abs()),
        color,
    }
}

/// Drawing target owned by the engine.
pub trait Surface {
    /// Device pixel ratio of the display the surface is shown on.
    fn pixel_ratio(&self) -> f64;

    fn physical_size(&self) -> Viewport;

    /// Resizes the backing store to `physical` device pixels.
    fn resize(&mut self, physical: Viewport);

    /// Renderer for this tick, or `None` while the context is unavailable.
    fn context(&mut self) -> Option<&mut dyn Renderer>;

    fn text_measurer(&self) -> &dyn TextMeasurer {
        &EstimatedTextMeasurer
    }
}

/// Element whose content box the chart fills.
pub trait Container {
    /// Content-box size in device-independent pixels.
    fn content_size(&self) -> Size;
}

/// Reads the current configuration at the start of every tick.
pub type ConfigSource = Box<dyn FnMut() -> Arc<LivelineConfig>>;

/// Frame-clocked live chart bound to a surface and container.
pub struct LivelineEngine<S: Surface, C: Container> {
    surface: S,
    container: C,
    config_source: ConfigSource,
    state: EngineState,
    scheduler: FrameScheduler,
    tracker: PointerTracker,
    size: Size,
    badge: Option<BadgeOverlay>,
    readout: Option<ValueReadout>,
}

impl<S: Surface, C: Container> LivelineEngine<S, C> {
    pub fn new(
        surface: S,
        container: C,
        mut config_source: impl FnMut() -> Arc<LivelineConfig> + 'static,
    ) -> Self {
        let config = config_source();
        let size = container.content_size();
        let mut scheduler = FrameScheduler::default();
        scheduler.request();
        debug!(
            width = size.width,
            height = size.height,
            samples = config.data.len(),
            window_secs = config.window_secs,
            "create liveline engine"
        );
        Self {
            surface,
            container,
            config_source: Box::new(config_source),
            state: EngineState::new(&config),
            scheduler,
            tracker: PointerTracker::default(),
            size,
            badge: None,
            readout: None,
        }
    }

    /// Records a host event; handlers only store state for the next tick.
    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        let scrub_enabled = match event {
            InputEvent::PointerMove { .. }
            | InputEvent::TouchStart { .. }
            | InputEvent::TouchMove { .. } => (self.config_source)().scrub,
            _ => false,
        };
        let outcome = self.tracker.apply(event, scrub_enabled);
        match event {
            InputEvent::VisibilityChange { visible } => self.scheduler.set_hidden(!visible),
            InputEvent::Resize { width, height } => self.size = Size::new(width, height),
            _ => {}
        }
        if outcome.request_redraw {
            self.request_redraw();
        }
        outcome
    }

    /// Schedules a tick; repeated calls before the next frame coalesce.
    pub fn request_redraw(&mut self) {
        if self.scheduler.request() {
            trace!("redraw requested");
        }
    }

    /// Runs the pending tick, if any, and keeps the loop scheduled.
    pub fn on_frame(&mut self, clock: FrameClock) -> Option<TickOutcome> {
        let dt_ms = self.scheduler.begin_frame(clock.monotonic_ms)?;
        let outcome = self.run_tick(clock, dt_ms);
        self.scheduler.request();
        Some(outcome)
    }

    /// Stops the loop and detaches the overlays. Idempotent.
    pub fn destroy(&mut self) {
        if self.scheduler.is_destroyed() {
            return;
        }
        self.scheduler.destroy();
        self.badge = None;
        self.readout = None;
        debug!("destroy liveline engine");
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.scheduler.is_destroyed()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    #[must_use]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Badge drawn by the last tick; `None` while hidden or destroyed.
    #[must_use]
    pub fn badge(&self) -> Option<&BadgeOverlay> {
        self.badge.as_ref()
    }

    #[must_use]
    pub fn readout(&self) -> Option<&ValueReadout> {
        self.readout.as_ref()
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn run_tick(&mut self, clock: FrameClock, dt_ms: f64) -> TickOutcome {
        let config = (self.config_source)();
        if self.size.is_empty() {
            self.size = self.container.content_size();
        }
        if self.size.is_empty() {
            return TickOutcome::Skipped(SkipReason::EmptySurface);
        }

        let raw_ratio = self.surface.pixel_ratio();
        let pixel_ratio = if raw_ratio.is_finite() && raw_ratio > 0.0 {
            raw_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        let physical = Viewport::for_css_size(self.size, pixel_ratio);
        if self.surface.physical_size() != physical {
            debug!(
                width = physical.width,
                height = physical.height,
                pixel_ratio,
                "resize surface"
            );
            self.surface.resize(physical);
        }
        if self.surface.context().is_none() {
            trace!("surface context unavailable");
            return TickOutcome::Skipped(SkipReason::NoContext);
        }

        let hover_ended = self.tracker.take_hover_ended();
        let outcome = {
            let input = TickInput {
                size: self.size,
                pixel_ratio,
                clock,
                dt_ms,
                hover_x: self.tracker.hover_x(),
                reduced_motion: self.tracker.reduced_motion(),
                measurer: self.surface.text_measurer(),
            };
            tick(&mut self.state, &config, &input)
        };

        let drawn = match outcome {
            TickOutcome::Skipped(reason) => {
                if matches!(
                    reason,
                    SkipReason::NotEnoughData | SkipReason::NotEnoughVisibleData
                ) {
                    self.badge = None;
                    self.readout = None;
                }
                if hover_ended {
                    notify_hover(&config, None);
                }
                return TickOutcome::Skipped(reason);
            }
            TickOutcome::Drawn(drawn) => drawn,
        };

        let rendered = match self.surface.context() {
            Some(renderer) => renderer.render(&drawn.frame),
            None => Ok(()),
        };
        if let Err(err) = rendered {
            warn!(error = %err, "skipping frame after render failure");
            return TickOutcome::Skipped(SkipReason::RenderFailed);
        }

        self.badge = drawn.badge.clone();
        self.readout = drawn.readout.clone();
        match drawn.hover {
            Some(point) => notify_hover(&config, Some(point)),
            None if hover_ended => notify_hover(&config, None),
            None => {}
        }
        TickOutcome::Drawn(drawn)
    }
}

fn notify_hover(config: &LivelineConfig, point: Option<HoverPoint>) {
    if let Some(on_hover) = &config.on_hover {
        on_hover(point);
    }
}

/// Engine, or an inert stand-in when the host could not provide a surface.
pub enum EngineHandle<S: Surface, C: Container> {
    Live(Box<LivelineEngine<S, C>>),
    Noop,
}

impl<S: Surface, C: Container> EngineHandle<S, C> {
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    pub fn request_redraw(&mut self) {
        if let Self::Live(engine) = self {
            engine.request_redraw();
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        match self {
            Self::Live(engine) => engine.handle_input(event),
            Self::Noop => InputOutcome::default(),
        }
    }

    pub fn on_frame(&mut self, clock: FrameClock) -> Option<TickOutcome> {
        match self {
            Self::Live(engine) => engine.on_frame(clock),
            Self::Noop => None,
        }
    }

    pub fn destroy(&mut self) {
        if let Self::Live(engine) = self {
            engine.destroy();
        }
    }

    #[must_use]
    pub fn engine(&self) -> Option<&LivelineEngine<S, C>> {
        match self {
            Self::Live(engine) => Some(&**engine),
            Self::Noop => None,
        }
    }

    pub fn engine_mut(&mut self) -> Option<&mut LivelineEngine<S, C>> {
        match self {
            Self::Live(engine) => Some(&mut **engine),
            Self::Noop => None,
        }
    }
}

/// Binds an engine to the host's surface and container.
///
/// A missing surface or container, or a container without area, yields a
/// no-op handle whose operations do nothing.
pub fn create_engine<S: Surface, C: Container>(
    surface: Option<S>,
    container: Option<C>,
    config_source: impl FnMut() -> Arc<LivelineConfig> + 'static,
) -> EngineHandle<S, C> {
    let (Some(surface), Some(container)) = (surface, container) else {
        warn!("missing surface or container; live chart disabled");
        return EngineHandle::Noop;
    };
    let size = container.content_size();
    if size.is_empty() {
        warn!(
            width = size.width,
            height = size.height,
            "container has no area; live chart disabled"
        );
        return EngineHandle::Noop;
    }
    EngineHandle::Live(Box::new(LivelineEngine::new(
        surface,
        container,
        config_source,
    )))
}
