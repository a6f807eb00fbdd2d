use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::core::Sample;
use crate::interaction::{InputEvent, InputOutcome};

use super::{
    Container, EngineHandle, FrameClock, LivelineConfig, LivelineOptions, Surface, TickOutcome,
    WindowPreset, create_engine,
};

/// One mounted chart: normalized options, the active window preset and the
/// engine reading the derived runtime config.
pub struct LivelineInstance<S: Surface, C: Container> {
    options: LivelineOptions,
    active_window: Option<f64>,
    runtime: Rc<RefCell<Arc<LivelineConfig>>>,
    engine: EngineHandle<S, C>,
    destroyed: bool,
}

impl<S: Surface, C: Container> LivelineInstance<S, C> {
    pub fn new(surface: Option<S>, container: Option<C>, options: LivelineOptions) -> Self {
        let active_window = sync_active_window(&options.windows, None);
        let runtime = Rc::new(RefCell::new(Arc::new(
            options.build_runtime_config(active_window),
        )));
        let source = Rc::clone(&runtime);
        let engine = create_engine(surface, container, move || Arc::clone(&source.borrow()));
        Self {
            options,
            active_window,
            runtime,
            engine,
            destroyed: false,
        }
    }

    pub fn from_json(surface: Option<S>, container: Option<C>, raw: &Value) -> Self {
        Self::new(surface, container, LivelineOptions::from_json(raw))
    }

    /// Merges `partial` over the current options and re-derives the config.
    pub fn set_options(&mut self, partial: &Value) {
        if self.destroyed {
            return;
        }
        self.options.apply_json(partial);
        self.refresh();
    }

    pub fn set_data(&mut self, data: Vec<Sample>, value: f64) {
        if self.destroyed {
            return;
        }
        self.options.set_data(data, value);
        self.refresh();
    }

    /// Activates the preset with `secs` and notifies `on_window_change`.
    ///
    /// Returns `false` when no preset has that length.
    pub fn select_window(&mut self, secs: f64) -> bool {
        if self.destroyed || !self.options.windows.iter().any(|preset| preset.secs == secs) {
            return false;
        }
        self.active_window = Some(secs);
        debug!(secs, "select window preset");
        if let Some(on_window_change) = &self.options.on_window_change {
            on_window_change(secs);
        }
        self.refresh();
        true
    }

    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        self.engine.handle_input(event)
    }

    pub fn on_frame(&mut self, clock: FrameClock) -> Option<TickOutcome> {
        self.engine.on_frame(clock)
    }

    pub fn request_redraw(&mut self) {
        self.engine.request_redraw();
    }

    /// Stops the engine. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.engine.destroy();
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Length of the active preset, if presets are configured.
    #[must_use]
    pub fn active_window(&self) -> Option<f64> {
        self.active_window
    }

    #[must_use]
    pub fn windows(&self) -> &[WindowPreset] {
        &self.options.windows
    }

    #[must_use]
    pub fn options(&self) -> &LivelineOptions {
        &self.options
    }

    #[must_use]
    pub fn runtime_config(&self) -> Arc<LivelineConfig> {
        Arc::clone(&self.runtime.borrow())
    }

    #[must_use]
    pub fn engine(&self) -> &EngineHandle<S, C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EngineHandle<S, C> {
        &mut self.engine
    }

    fn refresh(&mut self) {
        self.active_window = sync_active_window(&self.options.windows, self.active_window);
        *self.runtime.borrow_mut() = Arc::new(self.options.build_runtime_config(self.active_window));
        self.engine.request_redraw();
    }
}

/// Keeps the current preset while it still exists, else falls back to the
/// first one. No presets means no active window.
fn sync_active_window(windows: &[WindowPreset], current: Option<f64>) -> Option<f64> {
    let first = windows.first()?;
    match current {
        Some(secs) if windows.iter().any(|preset| preset.secs == secs) => Some(secs),
        _ => Some(first.secs),
    }
}
