use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Momentum, Padding, Sample};

use super::{
    HoverPoint, OrderBook, Palette, TimeAxisTimeZone, TimeFormatterFn, ValueFormatterFn,
    default_time_formatter, default_value_formatter,
};

/// Receives the hovered point each tick, or `None` once hovering ends.
pub type HoverCallbackFn = Arc<dyn Fn(Option<HoverPoint>) + Send + Sync + 'static>;
/// Receives the newly selected window length in seconds.
pub type WindowChangeFn = Arc<dyn Fn(f64) + Send + Sync + 'static>;

/// Default seed of the decorative random stream.
pub const DEFAULT_SEED: u64 = 0x11fe_11e5;

/// Horizontal marker line at a fixed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub value: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// Selectable window length shown by the host as a preset button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowPreset {
    pub label: String,
    pub secs: f64,
}

/// Particle and shake tuning for "degen" mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegenOptions {
    #[serde(default = "default_degen_scale")]
    pub scale: f64,
    /// Also burst on downward momentum.
    #[serde(default)]
    pub down_momentum: bool,
}

impl Default for DegenOptions {
    fn default() -> Self {
        Self {
            scale: default_degen_scale(),
            down_momentum: false,
        }
    }
}

fn default_degen_scale() -> f64 {
    1.0
}

/// Visual style of the current-value badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    /// Momentum-colored pill with white text.
    #[default]
    Default,
    /// Neutral pill with a drop shadow.
    Minimal,
}

/// Per-tick runtime configuration read by the engine loop.
#[derive(Clone)]
pub struct LivelineConfig {
    pub data: Vec<Sample>,
    pub value: f64,
    pub palette: Palette,
    pub window_secs: f64,
    pub lerp_speed: f64,
    pub padding: Padding,
    pub show_grid: bool,
    pub show_badge: bool,
    pub show_momentum: bool,
    pub momentum_override: Option<Momentum>,
    pub show_fill: bool,
    pub show_pulse: bool,
    pub scrub: bool,
    pub exaggerate: bool,
    pub reference_line: Option<ReferenceLine>,
    pub degen: Option<DegenOptions>,
    pub badge_tail: bool,
    pub badge_variant: BadgeVariant,
    pub tooltip_y: f64,
    pub tooltip_outline: bool,
    pub show_value: bool,
    pub value_momentum_color: bool,
    pub orderbook: Option<OrderBook>,
    pub time_zone: TimeAxisTimeZone,
    pub seed: u64,
    pub format_value: ValueFormatterFn,
    pub format_time: TimeFormatterFn,
    pub on_hover: Option<HoverCallbackFn>,
}

impl LivelineConfig {
    #[must_use]
    pub fn new(data: Vec<Sample>, value: f64) -> Self {
        Self {
            data,
            value,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_window(mut self, window_secs: f64) -> Self {
        self.window_secs = window_secs;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_reference_line(mut self, reference_line: ReferenceLine) -> Self {
        self.reference_line = Some(reference_line);
        self
    }

    #[must_use]
    pub fn with_degen(mut self, degen: DegenOptions) -> Self {
        self.degen = Some(degen);
        self
    }

    #[must_use]
    pub fn with_orderbook(mut self, orderbook: OrderBook) -> Self {
        self.orderbook = Some(orderbook);
        self
    }

    #[must_use]
    pub fn with_momentum_override(mut self, momentum: Momentum) -> Self {
        self.momentum_override = Some(momentum);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_on_hover(mut self, on_hover: HoverCallbackFn) -> Self {
        self.on_hover = Some(on_hover);
        self
    }
}

impl Default for LivelineConfig {
    fn default() -> Self {
        let time_zone = TimeAxisTimeZone::default();
        Self {
            data: Vec::new(),
            value: 0.0,
            palette: Palette::default(),
            window_secs: 30.0,
            lerp_speed: 0.08,
            padding: Padding::default(),
            show_grid: true,
            show_badge: true,
            show_momentum: true,
            momentum_override: None,
            show_fill: true,
            show_pulse: true,
            scrub: true,
            exaggerate: false,
            reference_line: None,
            degen: None,
            badge_tail: true,
            badge_variant: BadgeVariant::Default,
            tooltip_y: 14.0,
            tooltip_outline: true,
            show_value: false,
            value_momentum_color: false,
            orderbook: None,
            time_zone,
            seed: DEFAULT_SEED,
            format_value: default_value_formatter(),
            format_time: default_time_formatter(time_zone),
            on_hover: None,
        }
    }
}

impl fmt::Debug for LivelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivelineConfig")
            .field("samples", &self.data.len())
            .field("value", &self.value)
            .field("window_secs", &self.window_secs)
            .field("lerp_speed", &self.lerp_speed)
            .field("padding", &self.padding)
            .field("show_momentum", &self.show_momentum)
            .field("momentum_override", &self.momentum_override)
            .field("degen", &self.degen)
            .field("badge_variant", &self.badge_variant)
            .field("time_zone", &self.time_zone)
            .field("on_hover", &self.on_hover.is_some())
            .finish_non_exhaustive()
    }
}
