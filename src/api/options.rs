use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{Momentum, Padding, Sample};
use crate::render::Color;

use super::{
    BadgeVariant, DEFAULT_LINE_COLOR, DEFAULT_SEED, DegenOptions, HoverCallbackFn, LivelineConfig,
    OrderBook, Palette, ReferenceLine, ThemeMode, TimeAxisTimeZone, TimeFormatterFn,
    ValueFormatterFn, WindowChangeFn, WindowPreset, default_time_formatter,
    default_value_formatter,
};

const DEFAULT_WINDOW_SECS: f64 = 30.0;
const DEFAULT_LERP_SPEED: f64 = 0.08;
const DEFAULT_TOOLTIP_Y: f64 = 14.0;
const MAX_OFFSET_MINUTES: f64 = 1440.0;

/// Momentum display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MomentumSetting {
    /// No arrows, no momentum-colored badge.
    Hidden,
    /// Detected from the recent samples each tick.
    #[default]
    Auto,
    /// Always shown as the given direction.
    Forced(Momentum),
}

/// Normalized chart options.
///
/// Built from loosely typed JSON: every malformed or missing field falls
/// back to its default, so normalization never fails. Callbacks are set
/// through the `with_*` builders and survive later JSON merges.
#[derive(Clone)]
pub struct LivelineOptions {
    pub data: Vec<Sample>,
    pub value: f64,
    pub theme: ThemeMode,
    pub color: Color,
    pub window_secs: f64,
    pub grid: bool,
    pub badge: bool,
    pub fill: bool,
    pub scrub: bool,
    pub pulse: bool,
    pub momentum: MomentumSetting,
    pub exaggerate: bool,
    pub show_value: bool,
    pub value_momentum_color: bool,
    pub degen: Option<DegenOptions>,
    pub badge_tail: bool,
    pub badge_variant: BadgeVariant,
    pub windows: Vec<WindowPreset>,
    pub tooltip_y: f64,
    pub tooltip_outline: bool,
    pub lerp_speed: f64,
    pub padding: Padding,
    pub reference_line: Option<ReferenceLine>,
    pub orderbook: Option<OrderBook>,
    pub time_zone: TimeAxisTimeZone,
    pub seed: u64,
    pub format_value: Option<ValueFormatterFn>,
    pub format_time: Option<TimeFormatterFn>,
    pub on_hover: Option<HoverCallbackFn>,
    pub on_window_change: Option<WindowChangeFn>,
}

impl Default for LivelineOptions {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            value: 0.0,
            theme: ThemeMode::Dark,
            color: DEFAULT_LINE_COLOR,
            window_secs: DEFAULT_WINDOW_SECS,
            grid: true,
            badge: true,
            fill: true,
            scrub: true,
            pulse: true,
            momentum: MomentumSetting::Auto,
            exaggerate: false,
            show_value: false,
            value_momentum_color: false,
            degen: None,
            badge_tail: true,
            badge_variant: BadgeVariant::Default,
            windows: Vec::new(),
            tooltip_y: DEFAULT_TOOLTIP_Y,
            tooltip_outline: true,
            lerp_speed: DEFAULT_LERP_SPEED,
            padding: Padding::default(),
            reference_line: None,
            orderbook: None,
            time_zone: TimeAxisTimeZone::Local,
            seed: DEFAULT_SEED,
            format_value: None,
            format_time: None,
            on_hover: None,
            on_window_change: None,
        }
    }
}

impl LivelineOptions {
    #[must_use]
    pub fn from_json(raw: &Value) -> Self {
        let mut options = Self::default();
        options.apply_json(raw);
        options
    }

    /// Parses and normalizes `input`; unparsable JSON yields the defaults.
    #[must_use]
    pub fn from_json_str(input: &str) -> Self {
        match serde_json::from_str::<Value>(input) {
            Ok(raw) => Self::from_json(&raw),
            Err(err) => {
                debug!(error = %err, "options are not valid json; using defaults");
                Self::default()
            }
        }
    }

    /// Normalizes every field present in `partial` over the current options.
    ///
    /// Fields absent from `partial` keep their value; a present but
    /// malformed field resets to its default. Non-object input is ignored.
    pub fn apply_json(&mut self, partial: &Value) {
        let Some(fields) = partial.as_object() else {
            debug!("options are not an object; ignoring");
            return;
        };
        for (key, value) in fields {
            self.apply_field(key, value);
        }
    }

    fn apply_field(&mut self, key: &str, value: &Value) {
        match key {
            "data" => self.data = samples(value),
            "value" => self.value = number(value).unwrap_or(0.0),
            "theme" => {
                self.theme = match value.as_str() {
                    Some("light") => ThemeMode::Light,
                    _ => ThemeMode::Dark,
                }
            }
            "color" => self.color = color(value),
            "window" => {
                self.window_secs = number(value)
                    .filter(|secs| *secs > 0.0)
                    .unwrap_or(DEFAULT_WINDOW_SECS)
            }
            "grid" => self.grid = unless_false(value),
            "badge" => self.badge = unless_false(value),
            "fill" => self.fill = unless_false(value),
            "scrub" => self.scrub = unless_false(value),
            "pulse" => self.pulse = unless_false(value),
            "momentum" => self.momentum = momentum(value),
            "exaggerate" => self.exaggerate = only_true(value),
            "showValue" => self.show_value = only_true(value),
            "valueMomentumColor" => self.value_momentum_color = only_true(value),
            "degen" => self.degen = degen(value),
            "badgeTail" => self.badge_tail = unless_false(value),
            "badgeVariant" => {
                self.badge_variant = match value.as_str() {
                    Some("minimal") => BadgeVariant::Minimal,
                    _ => BadgeVariant::Default,
                }
            }
            "windows" => self.windows = windows(value),
            "tooltipY" => self.tooltip_y = number(value).unwrap_or(DEFAULT_TOOLTIP_Y),
            "tooltipOutline" => self.tooltip_outline = unless_false(value),
            "lerpSpeed" => {
                self.lerp_speed = number(value)
                    .map(|speed| speed.clamp(0.0, 1.0))
                    .unwrap_or(DEFAULT_LERP_SPEED)
            }
            "padding" => self.padding = padding(value),
            "referenceLine" => self.reference_line = reference_line(value),
            "orderbook" => self.orderbook = orderbook(value),
            "timeZone" => self.time_zone = time_zone(value),
            "seed" => self.seed = value.as_u64().unwrap_or(DEFAULT_SEED),
            other => debug!(key = other, "ignoring unknown option"),
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<Sample>, value: f64) -> Self {
        self.set_data(data, value);
        self
    }

    /// Replaces the series, dropping non-finite samples.
    pub fn set_data(&mut self, mut data: Vec<Sample>, value: f64) {
        let original_count = data.len();
        data.retain(|sample| sample.is_finite());
        if data.len() != original_count {
            debug!(
                original_count,
                kept = data.len(),
                "dropped non-finite samples"
            );
        }
        self.data = data;
        self.value = if value.is_finite() { value } else { 0.0 };
    }

    #[must_use]
    pub fn with_format_value(mut self, format_value: ValueFormatterFn) -> Self {
        self.format_value = Some(format_value);
        self
    }

    #[must_use]
    pub fn with_format_time(mut self, format_time: TimeFormatterFn) -> Self {
        self.format_time = Some(format_time);
        self
    }

    #[must_use]
    pub fn with_on_hover(mut self, on_hover: HoverCallbackFn) -> Self {
        self.on_hover = Some(on_hover);
        self
    }

    #[must_use]
    pub fn with_on_window_change(mut self, on_window_change: WindowChangeFn) -> Self {
        self.on_window_change = Some(on_window_change);
        self
    }

    /// Derives the per-tick config; `active_window` overrides `window_secs`.
    #[must_use]
    pub fn build_runtime_config(&self, active_window: Option<f64>) -> LivelineConfig {
        let momentum_override = match self.momentum {
            MomentumSetting::Forced(momentum) => Some(momentum),
            MomentumSetting::Hidden | MomentumSetting::Auto => None,
        };
        LivelineConfig {
            data: self.data.clone(),
            value: self.value,
            palette: Palette::resolve(self.color, self.theme),
            window_secs: active_window.unwrap_or(self.window_secs),
            lerp_speed: self.lerp_speed,
            padding: self.padding,
            show_grid: self.grid,
            show_badge: self.badge,
            show_momentum: self.momentum != MomentumSetting::Hidden,
            momentum_override,
            show_fill: self.fill,
            show_pulse: self.pulse,
            scrub: self.scrub,
            exaggerate: self.exaggerate,
            reference_line: self.reference_line.clone(),
            degen: self.degen,
            badge_tail: self.badge_tail,
            badge_variant: self.badge_variant,
            tooltip_y: self.tooltip_y,
            tooltip_outline: self.tooltip_outline,
            show_value: self.show_value,
            value_momentum_color: self.value_momentum_color,
            orderbook: self.orderbook.clone(),
            time_zone: self.time_zone,
            seed: self.seed,
            format_value: self
                .format_value
                .clone()
                .unwrap_or_else(default_value_formatter),
            format_time: self
                .format_time
                .clone()
                .unwrap_or_else(|| default_time_formatter(self.time_zone)),
            on_hover: self.on_hover.clone(),
        }
    }
}

impl fmt::Debug for LivelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivelineOptions")
            .field("samples", &self.data.len())
            .field("value", &self.value)
            .field("theme", &self.theme)
            .field("color", &self.color)
            .field("window_secs", &self.window_secs)
            .field("momentum", &self.momentum)
            .field("degen", &self.degen)
            .field("windows", &self.windows)
            .field("lerp_speed", &self.lerp_speed)
            .field("padding", &self.padding)
            .field("time_zone", &self.time_zone)
            .finish_non_exhaustive()
    }
}

/// Finite number from a JSON number or numeric string.
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

fn field_number(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields.get(key).and_then(number)
}

fn unless_false(value: &Value) -> bool {
    !matches!(value, Value::Bool(false))
}

fn only_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true))
}

fn samples(value: &Value) -> Vec<Sample> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    let data: Vec<Sample> = items
        .iter()
        .filter_map(|item| {
            let fields = item.as_object()?;
            let time = field_number(fields, "time")?;
            let value = field_number(fields, "value")?;
            Some(Sample::new(time, value))
        })
        .collect();
    if data.len() != items.len() {
        debug!(
            original_count = items.len(),
            kept = data.len(),
            "dropped malformed samples"
        );
    }
    data
}

fn color(value: &Value) -> Color {
    value
        .as_str()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| Color::parse(raw).ok())
        .unwrap_or(DEFAULT_LINE_COLOR)
}

fn momentum(value: &Value) -> MomentumSetting {
    match value {
        Value::Bool(false) => MomentumSetting::Hidden,
        Value::String(raw) => {
            Momentum::parse(raw).map_or(MomentumSetting::Auto, MomentumSetting::Forced)
        }
        _ => MomentumSetting::Auto,
    }
}

fn degen(value: &Value) -> Option<DegenOptions> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Object(fields) => Some(DegenOptions {
            scale: field_number(fields, "scale")
                .filter(|scale| *scale > 0.0)
                .unwrap_or(1.0),
            down_momentum: fields.get("downMomentum").is_some_and(only_true),
        }),
        _ => Some(DegenOptions::default()),
    }
}

fn windows(value: &Value) -> Vec<WindowPreset> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let fields = item.as_object()?;
            let label = match fields.get("label")? {
                Value::String(text) => text.trim().to_owned(),
                Value::Number(number) => number.to_string(),
                _ => return None,
            };
            let secs = field_number(fields, "secs").filter(|secs| *secs > 0.0)?;
            (!label.is_empty()).then_some(WindowPreset { label, secs })
        })
        .collect()
}

fn padding(value: &Value) -> Padding {
    let defaults = Padding::default();
    let Some(fields) = value.as_object() else {
        return defaults;
    };
    let side = |key: &str, fallback: f64| field_number(fields, key).unwrap_or(fallback);
    Padding {
        top: side("top", defaults.top),
        right: side("right", defaults.right),
        bottom: side("bottom", defaults.bottom),
        left: side("left", defaults.left),
    }
}

fn reference_line(value: &Value) -> Option<ReferenceLine> {
    let fields = value.as_object()?;
    let line_value = field_number(fields, "value")?;
    let label = fields
        .get("label")
        .and_then(Value::as_str)
        .map(str::to_owned);
    Some(ReferenceLine {
        value: line_value,
        label,
    })
}

fn orderbook(value: &Value) -> Option<OrderBook> {
    let fields = value.as_object()?;
    let levels = |key: &str| -> Vec<(f64, f64)> {
        fields
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|level| {
                        let pair = level.as_array()?;
                        let price = number(pair.first()?)?;
                        let size = number(pair.get(1)?)?;
                        Some((price, size))
                    })
                    .collect()
            })
            .unwrap_or_default()
    };
    Some(OrderBook {
        bids: levels("bids"),
        asks: levels("asks"),
    })
}

fn time_zone(value: &Value) -> TimeAxisTimeZone {
    match value {
        Value::String(raw) if raw.trim().eq_ignore_ascii_case("utc") => TimeAxisTimeZone::Utc,
        Value::Number(_) => number(value)
            .filter(|minutes| minutes.abs() <= MAX_OFFSET_MINUTES)
            .map_or(TimeAxisTimeZone::Local, |minutes| {
                TimeAxisTimeZone::FixedOffsetMinutes {
                    minutes: minutes.round() as i16,
                }
            }),
        _ => TimeAxisTimeZone::Local,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{LivelineOptions, MomentumSetting};
    use crate::api::{BadgeVariant, ThemeMode, TimeAxisTimeZone};
    use crate::core::{Momentum, Sample};

    #[test]
    fn malformed_fields_fall_back_to_defaults() {
        let options = LivelineOptions::from_json(&json!({
            "window": -5,
            "color": "",
            "theme": "sepia",
            "lerpSpeed": 4,
            "tooltipY": "abc",
            "badgeVariant": "loud",
        }));
        assert_eq!(options.window_secs, 30.0);
        assert_eq!(options.theme, ThemeMode::Dark);
        assert_eq!(options.lerp_speed, 1.0);
        assert_eq!(options.tooltip_y, 14.0);
        assert_eq!(options.badge_variant, BadgeVariant::Default);
    }

    #[test]
    fn drops_non_finite_samples() {
        let options = LivelineOptions::from_json(&json!({
            "data": [
                {"time": 1, "value": 2},
                {"time": "x", "value": 3},
                {"time": 2},
                {"time": "3", "value": "4.5"},
            ],
        }));
        assert_eq!(
            options.data,
            vec![Sample::new(1.0, 2.0), Sample::new(3.0, 4.5)]
        );
    }

    #[test]
    fn momentum_accepts_direction_or_false() {
        let hidden = LivelineOptions::from_json(&json!({"momentum": false}));
        assert_eq!(hidden.momentum, MomentumSetting::Hidden);
        let forced = LivelineOptions::from_json(&json!({"momentum": "down"}));
        assert_eq!(forced.momentum, MomentumSetting::Forced(Momentum::Down));
        let auto = LivelineOptions::from_json(&json!({"momentum": "sideways"}));
        assert_eq!(auto.momentum, MomentumSetting::Auto);
    }

    #[test]
    fn windows_need_label_and_positive_secs() {
        let options = LivelineOptions::from_json(&json!({
            "windows": [
                {"label": " 1m ", "secs": 60},
                {"label": "", "secs": 10},
                {"label": "bad", "secs": 0},
                {"label": 5, "secs": 5},
            ],
        }));
        let labels: Vec<&str> = options.windows.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, vec!["1m", "5"]);
    }

    #[test]
    fn partial_merge_keeps_other_fields() {
        let mut options = LivelineOptions::from_json(&json!({"window": 60, "grid": false}));
        options.apply_json(&json!({"window": 10}));
        assert_eq!(options.window_secs, 10.0);
        assert!(!options.grid);
    }

    #[test]
    fn degen_object_and_time_zone() {
        let options = LivelineOptions::from_json(&json!({
            "degen": {"scale": 2, "downMomentum": true},
            "timeZone": 120,
        }));
        let degen = options.degen.expect("degen enabled");
        assert_eq!(degen.scale, 2.0);
        assert!(degen.down_momentum);
        assert_eq!(
            options.time_zone,
            TimeAxisTimeZone::FixedOffsetMinutes { minutes: 120 }
        );
    }

    #[test]
    fn invalid_json_string_yields_defaults() {
        let options = LivelineOptions::from_json_str("{not json");
        assert_eq!(options.window_secs, 30.0);
        assert!(options.data.is_empty());
    }

    #[test]
    fn runtime_config_uses_active_window() {
        let options = LivelineOptions::from_json(&json!({"window": 60, "momentum": false}));
        let config = options.build_runtime_config(Some(15.0));
        assert_eq!(config.window_secs, 15.0);
        assert!(!config.show_momentum);
        assert_eq!(options.build_runtime_config(None).window_secs, 60.0);
    }
}
