use std::sync::{Arc, Mutex};

use liveline::api::{
    BadgeVariant, Container, FrameClock, LivelineInstance, LivelineOptions, MomentumSetting,
    Surface, ThemeMode, TimeAxisTimeZone,
};
use liveline::core::{Padding, Sample, Size, Viewport};
use liveline::render::{Color, NullRenderer, Renderer};
use serde_json::json;

struct HeadlessSurface {
    renderer: NullRenderer,
    physical: Viewport,
}

impl Surface for HeadlessSurface {
    fn pixel_ratio(&self) -> f64 {
        1.0
    }

    fn physical_size(&self) -> Viewport {
        self.physical
    }

    fn resize(&mut self, physical: Viewport) {
        self.physical = physical;
    }

    fn context(&mut self) -> Option<&mut dyn Renderer> {
        Some(&mut self.renderer)
    }
}

struct FixedContainer;

impl Container for FixedContainer {
    fn content_size(&self) -> Size {
        Size::new(480.0, 240.0)
    }
}

fn mount(options: LivelineOptions) -> LivelineInstance<HeadlessSurface, FixedContainer> {
    LivelineInstance::new(
        Some(HeadlessSurface {
            renderer: NullRenderer::default(),
            physical: Viewport::new(0, 0),
        }),
        Some(FixedContainer),
        options,
    )
}

fn presets() -> serde_json::Value {
    json!({
        "data": [{"time": 0, "value": 1}, {"time": 1, "value": 2}],
        "value": 2,
        "windows": [{"label": "15s", "secs": 15}, {"label": "1m", "secs": 60}],
    })
}

#[test]
fn defaults_match_documented_values() {
    let options = LivelineOptions::from_json(&json!({}));
    assert_eq!(options.theme, ThemeMode::Dark);
    assert_eq!(options.color, Color::from_hex("#3b82f6").expect("default color"));
    assert_eq!(options.window_secs, 30.0);
    assert_eq!(options.lerp_speed, 0.08);
    assert_eq!(options.tooltip_y, 14.0);
    assert_eq!(options.padding, Padding::default());
    assert_eq!(options.momentum, MomentumSetting::Auto);
    assert_eq!(options.badge_variant, BadgeVariant::Default);
    assert_eq!(options.time_zone, TimeAxisTimeZone::Local);
    assert!(options.grid && options.badge && options.fill && options.scrub && options.pulse);
    assert!(options.badge_tail && options.tooltip_outline);
    assert!(!options.exaggerate && !options.show_value && !options.value_momentum_color);
    assert!(options.degen.is_none());
    assert!(options.windows.is_empty());
}

#[test]
fn flags_only_flip_on_exact_booleans() {
    let options = LivelineOptions::from_json(&json!({
        "grid": 0,
        "fill": false,
        "exaggerate": "true",
        "showValue": true,
        "degen": true,
        "badgeVariant": "minimal",
        "theme": "light",
        "color": "#ff0000",
        "padding": {"left": 40, "top": "x"},
        "referenceLine": {"value": 12.5, "label": "entry"},
        "orderbook": {"bids": [[99, 2], ["bad"]], "asks": [[101, 3]]},
        "timeZone": "utc",
    }));
    assert!(options.grid);
    assert!(!options.fill);
    assert!(!options.exaggerate);
    assert!(options.show_value);
    assert!(options.degen.is_some());
    assert_eq!(options.badge_variant, BadgeVariant::Minimal);
    assert_eq!(options.theme, ThemeMode::Light);
    assert_eq!(options.color, Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(options.padding.left, 40.0);
    assert_eq!(options.padding.top, 12.0);
    let reference = options.reference_line.clone().expect("reference line");
    assert_eq!(reference.value, 12.5);
    assert_eq!(reference.label.as_deref(), Some("entry"));
    let book = options.orderbook.clone().expect("orderbook");
    assert_eq!(book.bids, vec![(99.0, 2.0)]);
    assert_eq!(book.asks, vec![(101.0, 3.0)]);
    assert_eq!(options.time_zone, TimeAxisTimeZone::Utc);
}

#[test]
fn instance_tracks_active_preset() {
    let changes: Arc<Mutex<Vec<f64>>> = Arc::default();
    let sink = Arc::clone(&changes);
    let options = LivelineOptions::from_json(&presets()).with_on_window_change(Arc::new(
        move |secs| {
            if let Ok(mut changes) = sink.lock() {
                changes.push(secs);
            }
        },
    ));
    let mut instance = mount(options);
    assert!(instance.engine().is_live());
    assert_eq!(instance.active_window(), Some(15.0));
    assert_eq!(instance.runtime_config().window_secs, 15.0);

    assert!(instance.select_window(60.0));
    assert_eq!(instance.active_window(), Some(60.0));
    assert_eq!(instance.runtime_config().window_secs, 60.0);
    assert!(!instance.select_window(300.0));
    assert_eq!(*changes.lock().expect("changes"), vec![60.0]);

    instance.set_options(&json!({"windows": [{"label": "5m", "secs": 300}]}));
    assert_eq!(instance.active_window(), Some(300.0));
    assert_eq!(instance.runtime_config().window_secs, 300.0);

    instance.set_options(&json!({"windows": []}));
    assert_eq!(instance.active_window(), None);
    assert_eq!(instance.runtime_config().window_secs, 30.0);
}

#[test]
fn set_options_merges_and_keeps_callbacks() {
    let options = LivelineOptions::from_json(&json!({"window": 45, "grid": false}))
        .with_format_value(Arc::new(|value| format!("${value:.1}")));
    let mut instance = mount(options);

    instance.set_options(&json!({"color": "#00ff00"}));
    let config = instance.runtime_config();
    assert_eq!(config.window_secs, 45.0);
    assert!(!config.show_grid);
    assert_eq!(config.palette.line, Color::rgb(0.0, 1.0, 0.0));
    assert_eq!((config.format_value)(2.0), "$2.0");
}

#[test]
fn engine_reads_new_data_on_the_next_tick() {
    let mut instance = mount(LivelineOptions::default());
    let empty = instance
        .on_frame(FrameClock::new(0.0, 10_000.0))
        .expect("tick runs");
    assert!(!empty.is_drawn());

    instance.set_data(vec![Sample::new(8.0, 1.0), Sample::new(9.0, 2.0)], 2.0);
    let drawn = instance
        .on_frame(FrameClock::new(16.67, 10_000.0))
        .expect("tick runs");
    assert!(drawn.is_drawn());
}

#[test]
fn destroyed_instance_ignores_updates() {
    let mut instance = mount(LivelineOptions::from_json(&presets()));
    instance.destroy();
    instance.destroy();
    assert!(instance.is_destroyed());
    assert!(!instance.select_window(60.0));
    instance.set_options(&json!({"window": 99}));
    assert_eq!(instance.options().window_secs, 30.0);
    assert_eq!(instance.on_frame(FrameClock::new(0.0, 1_000.0)), None);
}

#[test]
fn missing_container_mounts_inert_instance() {
    let mut instance: LivelineInstance<HeadlessSurface, FixedContainer> =
        LivelineInstance::new(None, None, LivelineOptions::default());
    assert!(!instance.engine().is_live());
    instance.request_redraw();
    assert_eq!(instance.on_frame(FrameClock::new(0.0, 0.0)), None);
}
