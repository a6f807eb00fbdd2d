use std::sync::{Arc, Mutex};

use liveline::api::{
    Container, EngineHandle, FrameClock, HoverPoint, LivelineConfig, LivelineEngine, SkipReason,
    Surface, create_engine,
};
use liveline::core::{Sample, Size, Viewport};
use liveline::error::{LivelineError, LivelineResult};
use liveline::interaction::InputEvent;
use liveline::render::{NullRenderer, RenderFrame, Renderer};

const FRAME_MS: f64 = 16.67;

#[derive(Default)]
struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn render(&mut self, _frame: &RenderFrame) -> LivelineResult<()> {
        Err(LivelineError::Backend("device lost".to_owned()))
    }
}

struct TestSurface {
    renderer: NullRenderer,
    failing: FailingRenderer,
    fail: bool,
    has_context: bool,
    pixel_ratio: f64,
    physical: Viewport,
}

impl TestSurface {
    fn new(pixel_ratio: f64) -> Self {
        Self {
            renderer: NullRenderer::default(),
            failing: FailingRenderer,
            fail: false,
            has_context: true,
            pixel_ratio,
            physical: Viewport::new(0, 0),
        }
    }
}

impl Surface for TestSurface {
    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn physical_size(&self) -> Viewport {
        self.physical
    }

    fn resize(&mut self, physical: Viewport) {
        self.physical = physical;
    }

    fn context(&mut self) -> Option<&mut dyn Renderer> {
        if !self.has_context {
            return None;
        }
        if self.fail {
            Some(&mut self.failing)
        } else {
            Some(&mut self.renderer)
        }
    }
}

struct TestContainer(Size);

impl Container for TestContainer {
    fn content_size(&self) -> Size {
        self.0
    }
}

fn config() -> LivelineConfig {
    let data = (0..30).map(|i| Sample::new(f64::from(i), 100.0 + f64::from(i))).collect();
    LivelineConfig::new(data, 129.0)
}

fn clock(frame: u32) -> FrameClock {
    FrameClock::new(f64::from(frame) * FRAME_MS, 29_000.0 + f64::from(frame) * FRAME_MS)
}

fn engine_with(config: LivelineConfig, pixel_ratio: f64) -> LivelineEngine<TestSurface, TestContainer> {
    let config = Arc::new(config);
    LivelineEngine::new(
        TestSurface::new(pixel_ratio),
        TestContainer(Size::new(400.0, 200.0)),
        move || Arc::clone(&config),
    )
}

#[test]
fn missing_or_empty_host_yields_noop_handle() {
    let shared = Arc::new(config());
    let source = Arc::clone(&shared);
    let mut missing: EngineHandle<TestSurface, TestContainer> = create_engine(
        None,
        Some(TestContainer(Size::new(400.0, 200.0))),
        move || Arc::clone(&source),
    );
    assert!(!missing.is_live());
    missing.request_redraw();
    missing.destroy();
    assert_eq!(missing.on_frame(clock(0)), None);
    assert!(!missing.handle_input(InputEvent::PointerLeave).request_redraw);

    let source = Arc::clone(&shared);
    let zero = create_engine(
        Some(TestSurface::new(1.0)),
        Some(TestContainer(Size::new(0.0, 0.0))),
        move || Arc::clone(&source),
    );
    assert!(zero.engine().is_none());

    let source = Arc::clone(&shared);
    let live = create_engine(
        Some(TestSurface::new(1.0)),
        Some(TestContainer(Size::new(400.0, 200.0))),
        move || Arc::clone(&source),
    );
    assert!(live.is_live());
}

#[test]
fn frames_render_and_keep_the_loop_scheduled() {
    let mut engine = engine_with(config(), 1.0);
    assert!(engine.is_pending());

    let outcome = engine.on_frame(clock(0)).expect("pending tick runs");
    assert!(outcome.is_drawn());
    assert!(engine.is_pending());
    assert_eq!(engine.surface().renderer.frames_rendered, 1);
    assert!(engine.badge().is_some());

    engine.request_redraw();
    engine.request_redraw();
    engine.on_frame(clock(1));
    assert_eq!(engine.surface().renderer.frames_rendered, 2);
}

#[test]
fn surface_follows_capped_pixel_ratio() {
    let mut engine = engine_with(config(), 2.0);
    engine.on_frame(clock(0));
    assert_eq!(engine.surface().physical_size(), Viewport::new(800, 400));

    let mut dense = engine_with(config(), 4.0);
    dense.on_frame(clock(0));
    assert_eq!(dense.surface().physical_size(), Viewport::new(1200, 600));
}

#[test]
fn destroy_stops_ticking_and_is_idempotent() {
    let mut engine = engine_with(config(), 1.0);
    engine.on_frame(clock(0));
    engine.destroy();
    engine.destroy();
    assert!(engine.is_destroyed());
    assert!(engine.badge().is_none());

    engine.request_redraw();
    assert!(!engine.is_pending());
    assert_eq!(engine.on_frame(clock(1)), None);
    assert_eq!(engine.surface().renderer.frames_rendered, 1);
}

#[test]
fn hidden_host_pauses_until_visible_again() {
    let mut engine = engine_with(config(), 1.0);
    engine.on_frame(clock(0));

    engine.handle_input(InputEvent::VisibilityChange { visible: false });
    assert_eq!(engine.on_frame(clock(1)), None);
    assert_eq!(engine.on_frame(clock(2)), None);

    let outcome = engine.handle_input(InputEvent::VisibilityChange { visible: true });
    assert!(outcome.request_redraw);
    assert!(engine.on_frame(clock(3)).is_some());
    assert_eq!(engine.surface().renderer.frames_rendered, 2);
}

#[test]
fn missing_context_and_render_errors_skip_the_tick() {
    let mut engine = engine_with(config(), 1.0);
    engine.surface_mut().has_context = false;
    let outcome = engine.on_frame(clock(0)).expect("tick runs");
    assert_eq!(outcome.skip_reason(), Some(SkipReason::NoContext));

    engine.surface_mut().has_context = true;
    engine.surface_mut().fail = true;
    let outcome = engine.on_frame(clock(1)).expect("tick runs");
    assert_eq!(outcome.skip_reason(), Some(SkipReason::RenderFailed));
    assert!(engine.is_pending());

    engine.surface_mut().fail = false;
    assert!(engine.on_frame(clock(2)).expect("tick runs").is_drawn());
}

#[test]
fn hover_callback_reports_points_then_none() {
    let seen: Arc<Mutex<Vec<Option<HoverPoint>>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let config = config().with_on_hover(Arc::new(move |point| {
        if let Ok(mut seen) = sink.lock() {
            seen.push(point);
        }
    }));
    let mut engine = engine_with(config, 1.0);

    engine.handle_input(InputEvent::PointerMove { x: 150.0 });
    engine.on_frame(clock(0));
    engine.handle_input(InputEvent::PointerLeave);
    engine.on_frame(clock(1));
    engine.on_frame(clock(2));

    let seen = seen.lock().expect("hover log");
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_some());
    assert!(seen[1].is_none());
}

#[test]
fn scrub_disabled_ignores_pointer() {
    let seen: Arc<Mutex<usize>> = Arc::default();
    let sink = Arc::clone(&seen);
    let mut config = config().with_on_hover(Arc::new(move |_| {
        if let Ok(mut count) = sink.lock() {
            *count += 1;
        }
    }));
    config.scrub = false;
    let mut engine = engine_with(config, 1.0);

    engine.handle_input(InputEvent::PointerMove { x: 150.0 });
    engine.on_frame(clock(0));
    assert_eq!(*seen.lock().expect("hover count"), 0);
    assert_eq!(engine.state().scrub_amount(), 0.0);
}

#[test]
fn resize_is_picked_up_on_the_next_tick() {
    let mut engine = engine_with(config(), 1.0);
    engine.on_frame(clock(0));
    engine.handle_input(InputEvent::Resize {
        width: 600.0,
        height: 300.0,
    });
    engine.on_frame(clock(1));
    assert_eq!(engine.size(), Size::new(600.0, 300.0));
    assert_eq!(engine.surface().physical_size(), Viewport::new(600, 300));
}
