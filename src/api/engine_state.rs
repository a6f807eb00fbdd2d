use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::{Sample, ValueRange, WindowTransition};

use super::{
    ArrowState, BadgeState, HoverState, LivelineConfig, OrderbookState, ParticleState, ShakeState,
    TimeAxisState, ValueGridState,
};

/// Everything a live chart carries from one tick to the next.
///
/// Created once per engine; the tick mutates it in place and never
/// reallocates the particle or label pools.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub(super) display_value: f64,
    pub(super) display_range: ValueRange,
    pub(super) target_range: ValueRange,
    pub(super) range_ready: bool,
    pub(super) display_window: f64,
    pub(super) transition: WindowTransition,
    pub(super) hover: HoverState,
    pub(super) arrows: ArrowState,
    pub(super) grid: ValueGridState,
    pub(super) time_axis: TimeAxisState,
    pub(super) orderbook: OrderbookState,
    pub(super) particles: ParticleState,
    pub(super) shake: ShakeState,
    pub(super) badge: BadgeState,
    pub(super) rng: StdRng,
    pub(super) visible: Vec<Sample>,
}

impl EngineState {
    #[must_use]
    pub fn new(config: &LivelineConfig) -> Self {
        Self {
            display_value: config.value,
            display_range: ValueRange::new(0.0, 1.0),
            target_range: ValueRange::new(0.0, 1.0),
            range_ready: false,
            display_window: config.window_secs,
            transition: WindowTransition::new(config.window_secs),
            hover: HoverState::default(),
            arrows: ArrowState::default(),
            grid: ValueGridState::default(),
            time_axis: TimeAxisState::default(),
            orderbook: OrderbookState::default(),
            particles: ParticleState::default(),
            shake: ShakeState::default(),
            badge: BadgeState::default(),
            rng: StdRng::seed_from_u64(config.seed),
            visible: Vec::with_capacity(config.data.len()),
        }
    }

    /// Smoothed value drawn at the live dot.
    #[must_use]
    pub fn display_value(&self) -> f64 {
        self.display_value
    }

    #[must_use]
    pub fn display_range(&self) -> ValueRange {
        self.display_range
    }

    #[must_use]
    pub fn target_range(&self) -> ValueRange {
        self.target_range
    }

    /// Window length (seconds) drawn this frame, mid-transition included.
    #[must_use]
    pub fn display_window(&self) -> f64 {
        self.display_window
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_active()
    }

    #[must_use]
    pub fn scrub_amount(&self) -> f64 {
        self.hover.scrub_amount()
    }

    #[must_use]
    pub fn arrows(&self) -> ArrowState {
        self.arrows
    }

    #[must_use]
    pub fn grid(&self) -> &ValueGridState {
        &self.grid
    }

    #[must_use]
    pub fn time_axis(&self) -> &TimeAxisState {
        &self.time_axis
    }

    #[must_use]
    pub fn orderbook(&self) -> &OrderbookState {
        &self.orderbook
    }

    #[must_use]
    pub fn particles(&self) -> &ParticleState {
        &self.particles
    }

    #[must_use]
    pub fn shake(&self) -> ShakeState {
        self.shake
    }

    #[must_use]
    pub fn badge(&self) -> BadgeState {
        self.badge
    }
}
