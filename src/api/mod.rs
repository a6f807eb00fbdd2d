mod axis_config;
mod axis_ticks;
mod badge;
mod engine;
mod engine_config;
mod engine_state;
mod fade_labels;
mod frame_builder;
mod hover;
mod instance;
mod momentum_arrows;
mod options;
mod orderbook;
mod particles;
mod render_style;
mod scheduler;
mod time_axis;
mod value_grid;

pub use axis_config::{
    TimeAxisTimeZone, TimeFormatterFn, ValueFormatterFn, default_format_value,
    default_time_formatter, default_value_formatter,
};
pub use axis_ticks::{
    GRID_MIN_GAP_PX, PlacedLabel, TIME_LABEL_COLLISION_BUFFER_PX, TIME_MIN_GAP_PX, divisible,
    first_time_tick, nice_time_interval, pick_interval, resolve_label_collisions,
    time_tick_interval,
};
pub use badge::{
    BADGE_PAD_X, BADGE_PAD_Y, BADGE_TAIL_LEN, BADGE_TAIL_SPREAD, BadgeFrame, BadgeOverlay,
    BadgeState, badge_svg_path, pill_svg_path,
};
pub use engine::{
    ConfigSource, Container, DrawnFrame, EngineHandle, FrameClock, LivelineEngine,
    MAX_PIXEL_RATIO, SkipReason, Surface, TickInput, TickOutcome, ValueReadout, create_engine,
    tick,
};
pub use engine_config::{
    BadgeVariant, DEFAULT_SEED, DegenOptions, HoverCallbackFn, LivelineConfig, ReferenceLine,
    WindowChangeFn, WindowPreset,
};
pub use engine_state::EngineState;
pub use fade_labels::{
    FadeLabel, FadeLabelSet, grid_label_key, grid_label_value, time_label_key, time_label_time,
};
pub use hover::{
    CROSSHAIR_FADE_MIN_PX, HoverPoint, HoverResolution, HoverState, SCRUB_LERP_SPEED, ScrubSample,
    crosshair_opacity,
};
pub use instance::LivelineInstance;
pub use momentum_arrows::{ARROW_CYCLE_MS, ArrowState};
pub use options::{LivelineOptions, MomentumSetting};
pub use orderbook::{
    BASE_RISE_SPEED, MAX_ORDERBOOK_LABELS, OrderBook, OrderLevel, OrderbookLabel, OrderbookState,
    format_size,
};
pub use particles::{
    BURST_COOLDOWN_MS, MAX_PARTICLES, MIN_BURST_SWING, Particle, ParticleState, ShakeState,
    SwingEvent,
};
pub use render_style::{
    DEFAULT_LINE_COLOR, MOMENTUM_DOWN_COLOR, MOMENTUM_UP_COLOR, Palette, ThemeMode,
};
pub use scheduler::{FrameScheduler, MAX_FRAME_DELTA_MS};
pub use time_axis::TimeAxisState;
pub use value_grid::ValueGridState;
