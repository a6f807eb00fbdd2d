use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gtk4 as gtk;
use gtk::glib;
use gtk::prelude::*;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{Container, FrameClock, LivelineInstance, LivelineOptions, Surface};
use crate::core::{Sample, Size, Viewport};
use crate::error::LivelineResult;
use crate::interaction::InputEvent;
use crate::render::{
    CairoContextRenderer, CairoRenderer, EstimatedTextMeasurer, RenderFrame, Renderer,
    TextMeasurer,
};

type FrameSlot = Rc<RefCell<Option<RenderFrame>>>;
/// Chart instance mounted by [`GtkLivelineAdapter`].
pub type GtkInstance = LivelineInstance<GtkSurface, GtkContainer>;
type SharedInstance = Rc<RefCell<Option<GtkInstance>>>;

/// Keeps the last built frame for the next `draw_func` call.
struct FrameRecorder {
    slot: FrameSlot,
}

impl Renderer for FrameRecorder {
    fn render(&mut self, frame: &RenderFrame) -> LivelineResult<()> {
        frame.validate()?;
        if let Ok(mut slot) = self.slot.try_borrow_mut() {
            *slot = Some(frame.clone());
        }
        Ok(())
    }
}

/// `DrawingArea`-backed surface. Frames are recorded on tick and painted by
/// the area's draw function on the widget's own Cairo context.
pub struct GtkSurface {
    area: glib::WeakRef<gtk::DrawingArea>,
    physical: Viewport,
    recorder: FrameRecorder,
    measurer: Option<CairoRenderer>,
}

impl GtkSurface {
    fn new(area: &gtk::DrawingArea, slot: FrameSlot) -> Self {
        let measurer = match CairoRenderer::new(1, 1) {
            Ok(renderer) => Some(renderer),
            Err(err) => {
                warn!(error = %err, "pango measurer unavailable; estimating text widths");
                None
            }
        };
        Self {
            area: area.downgrade(),
            physical: Viewport::new(0, 0),
            recorder: FrameRecorder { slot },
            measurer,
        }
    }
}

impl Surface for GtkSurface {
    fn pixel_ratio(&self) -> f64 {
        self.area
            .upgrade()
            .map_or(1.0, |area| f64::from(area.scale_factor()))
    }

    fn physical_size(&self) -> Viewport {
        self.physical
    }

    fn resize(&mut self, physical: Viewport) {
        self.physical = physical;
    }

    fn context(&mut self) -> Option<&mut dyn Renderer> {
        self.area.upgrade()?;
        Some(&mut self.recorder)
    }

    fn text_measurer(&self) -> &dyn TextMeasurer {
        match &self.measurer {
            Some(measurer) => measurer,
            None => &EstimatedTextMeasurer,
        }
    }
}

pub struct GtkContainer {
    area: glib::WeakRef<gtk::DrawingArea>,
}

impl Container for GtkContainer {
    fn content_size(&self) -> Size {
        self.area.upgrade().map_or(Size::new(0.0, 0.0), |area| {
            Size::new(f64::from(area.width()), f64::from(area.height()))
        })
    }
}

/// Drives a live chart inside a GTK4 `DrawingArea`.
///
/// The chart is created on the first resize with a nonzero size. Ticks run
/// on the widget frame clock; pointer motion scrubs, map/unmap pause and
/// resume the loop.
pub struct GtkLivelineAdapter {
    area: gtk::DrawingArea,
    instance: SharedInstance,
    pending: Rc<RefCell<Option<LivelineOptions>>>,
    tick_id: Option<gtk::TickCallbackId>,
}

impl GtkLivelineAdapter {
    #[must_use]
    pub fn new(area: &gtk::DrawingArea, options: LivelineOptions) -> Self {
        let slot: FrameSlot = Rc::default();
        let instance: SharedInstance = Rc::default();
        let pending = Rc::new(RefCell::new(Some(options)));

        connect_draw(area, Rc::clone(&slot));
        connect_resize(area, &instance, &pending, &slot);
        connect_pointer(area, &instance);
        connect_visibility(area, &instance);

        let ticking = Rc::clone(&instance);
        let tick_id = area.add_tick_callback(move |area, clock| {
            let monotonic_ms = clock.frame_time() as f64 / 1000.0;
            let wall_ms = Utc::now().timestamp_millis() as f64;
            let drawn = with_instance(&ticking, |instance| {
                instance
                    .on_frame(FrameClock::new(monotonic_ms, wall_ms))
                    .is_some_and(|outcome| outcome.is_drawn())
            });
            if drawn == Some(true) {
                area.queue_draw();
            }
            glib::ControlFlow::Continue
        });

        Self {
            area: area.clone(),
            instance,
            pending,
            tick_id: Some(tick_id),
        }
    }

    #[must_use]
    pub fn area(&self) -> &gtk::DrawingArea {
        &self.area
    }

    /// `None` until the area first gets a size, or while the chart is busy.
    pub fn with_instance<R>(&self, f: impl FnOnce(&mut GtkInstance) -> R) -> Option<R> {
        with_instance(&self.instance, f)
    }

    pub fn set_options(&self, partial: &Value) {
        if self
            .with_instance(|instance| instance.set_options(partial))
            .is_none()
        {
            if let Some(options) = self.pending.borrow_mut().as_mut() {
                options.apply_json(partial);
            }
        }
    }

    pub fn set_data(&self, data: Vec<Sample>, value: f64) {
        if let Ok(mut guard) = self.instance.try_borrow_mut() {
            if let Some(instance) = guard.as_mut() {
                instance.set_data(data, value);
                return;
            }
        }
        if let Some(options) = self.pending.borrow_mut().as_mut() {
            options.set_data(data, value);
        }
    }

    pub fn select_window(&self, secs: f64) -> bool {
        self.with_instance(|instance| instance.select_window(secs))
            .unwrap_or(false)
    }

    /// Stops ticking and destroys the chart. Idempotent.
    pub fn destroy(&mut self) {
        if let Some(tick_id) = self.tick_id.take() {
            tick_id.remove();
        }
        with_instance(&self.instance, GtkInstance::destroy);
        self.pending.borrow_mut().take();
    }
}

impl Drop for GtkLivelineAdapter {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn with_instance<R>(shared: &SharedInstance, f: impl FnOnce(&mut GtkInstance) -> R) -> Option<R> {
    let mut guard = shared.try_borrow_mut().ok()?;
    guard.as_mut().map(f)
}

fn connect_draw(area: &gtk::DrawingArea, slot: FrameSlot) {
    let painter = RefCell::new(CairoRenderer::new(1, 1).ok());
    area.set_draw_func(move |_, context, _, _| {
        let Ok(frame) = slot.try_borrow() else {
            return;
        };
        let (Some(frame), Ok(mut painter)) = (frame.as_ref(), painter.try_borrow_mut()) else {
            return;
        };
        if let Some(renderer) = painter.as_mut() {
            if let Err(err) = renderer.render_on_cairo_context(context, frame) {
                warn!(error = %err, "failed to paint live chart");
            }
        }
    });
}

fn connect_resize(
    area: &gtk::DrawingArea,
    instance: &SharedInstance,
    pending: &Rc<RefCell<Option<LivelineOptions>>>,
    slot: &FrameSlot,
) {
    let instance = Rc::clone(instance);
    let pending = Rc::clone(pending);
    let slot = Rc::clone(slot);
    area.connect_resize(move |area, width, height| {
        let size = Size::new(f64::from(width), f64::from(height));
        let Ok(mut guard) = instance.try_borrow_mut() else {
            return;
        };
        if let Some(live) = guard.as_mut() {
            live.handle_input(InputEvent::Resize {
                width: size.width,
                height: size.height,
            });
            return;
        }
        if size.is_empty() {
            return;
        }
        let Some(options) = pending.borrow_mut().take() else {
            return;
        };
        debug!(width, height, "mount live chart");
        let mut live = LivelineInstance::new(
            Some(GtkSurface::new(area, Rc::clone(&slot))),
            Some(GtkContainer {
                area: area.downgrade(),
            }),
            options,
        );
        let reduced = gtk::Settings::default()
            .is_some_and(|settings| !settings.is_gtk_enable_animations());
        live.handle_input(InputEvent::ReducedMotionChange { reduced });
        *guard = Some(live);
    });
}

fn connect_pointer(area: &gtk::DrawingArea, instance: &SharedInstance) {
    let motion = gtk::EventControllerMotion::new();
    let moving = Rc::clone(instance);
    motion.connect_motion(move |_, x, _| {
        with_instance(&moving, |instance| {
            instance.handle_input(InputEvent::PointerMove { x });
        });
    });
    let leaving = Rc::clone(instance);
    motion.connect_leave(move |_| {
        with_instance(&leaving, |instance| {
            instance.handle_input(InputEvent::PointerLeave);
        });
    });
    area.add_controller(motion);
}

fn connect_visibility(area: &gtk::DrawingArea, instance: &SharedInstance) {
    let mapped = Rc::clone(instance);
    area.connect_map(move |_| {
        with_instance(&mapped, |instance| {
            instance.handle_input(InputEvent::VisibilityChange { visible: true });
        });
    });
    let unmapped = Rc::clone(instance);
    area.connect_unmap(move |_| {
        with_instance(&unmapped, |instance| {
            instance.handle_input(InputEvent::VisibilityChange { visible: false });
        });
    });
}
