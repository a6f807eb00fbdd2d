use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{ChartLayout, REFERENCE_FRAME_MS};
use crate::render::{RenderFrame, TextBaseline, TextHAlign, TextPrimitive};

use super::{MOMENTUM_DOWN_COLOR, MOMENTUM_UP_COLOR, Palette};

/// Floating label cap.
pub const MAX_ORDERBOOK_LABELS: usize = 50;
/// Rise speed (px/s) with no market activity.
pub const BASE_RISE_SPEED: f64 = 60.0;
const ACTIVITY_RISE_SPEED: f64 = 100.0;
const SPAWN_INTERVAL_MS: f64 = 40.0;
const LABEL_LIFETIME_SECS: f64 = 6.0;
/// A new label waits until the previous one has risen this far.
const MIN_SPAWN_GAP_PX: f64 = 22.0;
const CHURN_RISE: f64 = 0.3;
const CHURN_FALL: f64 = 0.05;
const SPEED_SMOOTHING: f64 = 0.95;
const FONT_PX: f64 = 13.0;
/// Labels are dropped once this far above the plot top.
const TOP_EXIT_PX: f64 = 14.0;
const TOP_FADE_RATIO: f64 = 0.45;

/// One price level: `(price, size)`.
pub type OrderLevel = (f64, f64);

/// Order-book snapshot shown as rising size labels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderBook {
    #[serde(default)]
    pub bids: Vec<OrderLevel>,
    #[serde(default)]
    pub asks: Vec<OrderLevel>,
}

impl OrderBook {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    fn totals(&self) -> (f64, f64) {
        let sum = |levels: &[OrderLevel]| levels.iter().map(|(_, size)| size).sum::<f64>();
        (sum(&self.bids), sum(&self.asks))
    }

    fn max_size(&self) -> f64 {
        self.bids
            .iter()
            .chain(&self.asks)
            .map(|(_, size)| *size)
            .fold(0.0, f64::max)
    }

    /// Size-weighted random level; bids are listed before asks.
    fn pick_level<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(f64, bool)> {
        let levels = || {
            self.bids
                .iter()
                .map(|(_, size)| (*size, true))
                .chain(self.asks.iter().map(|(_, size)| (*size, false)))
        };
        let total: f64 = levels().map(|(size, _)| size).sum();
        let mut remaining = rng.random::<f64>() * total;
        for (size, is_bid) in levels() {
            remaining -= size;
            if remaining <= 0.0 {
                return Some((size, is_bid));
            }
        }
        levels().next()
    }
}

/// `$` size text: whole dollars from 10, otherwise one or two decimals.
#[must_use]
pub fn format_size(size: f64) -> String {
    if size >= 10.0 {
        format!("${}", size.round())
    } else if size >= 1.0 {
        format!("${size:.1}")
    } else {
        format!("${size:.2}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookLabel {
    pub y: f64,
    pub text: String,
    pub is_bid: bool,
    pub life: f64,
    pub max_life: f64,
    /// Relative size in `[0.5, 1]`.
    pub intensity: f64,
}

/// Rising order-book labels and the churn-driven rise speed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderbookState {
    labels: Vec<OrderbookLabel>,
    spawn_timer_ms: f64,
    smooth_speed: f64,
    prev_totals: Option<(f64, f64)>,
    churn_rate: f64,
}

impl Default for OrderbookState {
    fn default() -> Self {
        Self {
            labels: Vec::with_capacity(MAX_ORDERBOOK_LABELS),
            spawn_timer_ms: 0.0,
            smooth_speed: BASE_RISE_SPEED,
            prev_totals: None,
            churn_rate: 0.0,
        }
    }
}

impl OrderbookState {
    #[must_use]
    pub fn labels(&self) -> &[OrderbookLabel] {
        &self.labels
    }

    #[must_use]
    pub fn churn_rate(&self) -> f64 {
        self.churn_rate
    }

    #[must_use]
    pub fn smooth_speed(&self) -> f64 {
        self.smooth_speed
    }

    /// Tracks churn, spawns labels from the book and moves existing ones up.
    ///
    /// An empty book (or one with zero sizes) freezes the overlay.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        book: &OrderBook,
        layout: &ChartLayout,
        swing: f64,
        dt_ms: f64,
        rng: &mut R,
    ) {
        if book.is_empty() {
            return;
        }
        let max_size = book.max_size();
        if max_size <= 0.0 {
            return;
        }

        let (bid_total, ask_total) = book.totals();
        if let Some((prev_bid, prev_ask)) = self.prev_totals {
            let prev_total = prev_bid + prev_ask;
            if prev_total > 0.0 {
                let churn = (((bid_total - prev_bid).abs() + (ask_total - prev_ask).abs())
                    / prev_total)
                    .min(1.0);
                let rate = if churn > self.churn_rate {
                    CHURN_RISE
                } else {
                    CHURN_FALL
                };
                self.churn_rate += (churn - self.churn_rate) * rate;
            }
        }
        self.prev_totals = Some((bid_total, ask_total));

        let activity = (swing * 5.0).min(1.0).max(self.churn_rate);
        let target_speed = BASE_RISE_SPEED + activity * ACTIVITY_RISE_SPEED;
        self.smooth_speed += (target_speed - self.smooth_speed)
            * (1.0 - SPEED_SMOOTHING.powf(dt_ms / REFERENCE_FRAME_MS));

        let top_y = layout.plot_top();
        let bottom_y = layout.plot_bottom() - 6.0;

        self.spawn_timer_ms += dt_ms;
        while self.spawn_timer_ms >= SPAWN_INTERVAL_MS && self.labels.len() < MAX_ORDERBOOK_LABELS
        {
            self.spawn_timer_ms -= SPAWN_INTERVAL_MS;
            if self
                .labels
                .iter()
                .any(|label| (label.y - bottom_y).abs() < MIN_SPAWN_GAP_PX)
            {
                break;
            }
            let Some((size, is_bid)) = book.pick_level(rng) else {
                break;
            };
            self.labels.push(OrderbookLabel {
                y: bottom_y,
                text: format!("+ {}", format_size(size)),
                is_bid,
                life: LABEL_LIFETIME_SECS,
                max_life: LABEL_LIFETIME_SECS,
                intensity: 0.5 + 0.5 * (size / max_size),
            });
        }

        let dt_secs = dt_ms / 1000.0;
        let travel = bottom_y - top_y;
        let speed = self.smooth_speed;
        let mut index = 0;
        while index < self.labels.len() {
            let label = &mut self.labels[index];
            label.life -= dt_secs;
            if label.life > 0.0 {
                let progress = if travel > 0.0 {
                    (label.y - top_y) / travel
                } else {
                    1.0
                };
                label.y -= speed * (0.7 + 0.3 * progress) * dt_secs;
            }
            if label.life <= 0.0 || label.y < top_y - TOP_EXIT_PX {
                self.labels.swap_remove(index);
                continue;
            }
            index += 1;
        }
        trace!(
            labels = self.labels.len(),
            churn = self.churn_rate,
            speed = self.smooth_speed,
            "advance orderbook overlay"
        );
    }

    /// Pushes outlined labels that fade in at the bottom and out near the top.
    pub fn draw(&self, frame: &mut RenderFrame, layout: &ChartLayout, palette: &Palette) {
        let label_x = layout.plot_left() + 8.0;
        let top_y = layout.plot_top();
        let background = palette.background.with_alpha(1.0);
        for label in &self.labels {
            let fade_in = ((1.0 - label.life / label.max_life) * 10.0).min(1.0);
            let y_ratio = (label.y - top_y) / layout.chart_height;
            let fade_out = if y_ratio < TOP_FADE_RATIO {
                (y_ratio / TOP_FADE_RATIO).max(0.0)
            } else {
                1.0
            };
            let strength = label.intensity * fade_in * fade_out;
            let base = if label.is_bid {
                MOMENTUM_UP_COLOR
            } else {
                MOMENTUM_DOWN_COLOR
            };
            frame.text(
                TextPrimitive::new(
                    label.text.clone(),
                    label_x,
                    label.y,
                    FONT_PX,
                    base.mix(background, 1.0 - strength),
                    TextHAlign::Left,
                )
                .with_weight(600)
                .with_baseline(TextBaseline::Middle)
                .with_outline(background, 4.0),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::{BASE_RISE_SPEED, MAX_ORDERBOOK_LABELS, OrderBook, OrderbookState, format_size};
    use crate::core::{ChartLayout, Padding, Size, ValueRange};

    fn layout() -> ChartLayout {
        ChartLayout::new(
            Size::new(400.0, 300.0),
            Padding::default(),
            (0.0, 30.0),
            ValueRange::new(0.0, 1.0),
        )
    }

    fn book(bid: f64, ask: f64) -> OrderBook {
        OrderBook {
            bids: vec![(99.0, bid)],
            asks: vec![(101.0, ask)],
        }
    }

    #[test]
    fn size_text_precision() {
        assert_eq!(format_size(12.4), "$12");
        assert_eq!(format_size(3.14), "$3.1");
        assert_eq!(format_size(0.456), "$0.46");
    }

    #[test]
    fn churn_decays_and_speed_settles_at_base() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = OrderbookState::default();
        let layout = layout();
        state.advance(&book(10.0, 10.0), &layout, 0.0, 16.67, &mut rng);
        state.advance(&book(20.0, 10.0), &layout, 0.0, 16.67, &mut rng);
        let peak = state.churn_rate();
        assert!(peak > 0.0);

        for _ in 0..600 {
            state.advance(&book(20.0, 10.0), &layout, 0.0, 16.67, &mut rng);
        }
        assert!(state.churn_rate() < peak * 0.01);
        assert!((state.smooth_speed() - BASE_RISE_SPEED).abs() < 0.5);
    }

    #[test]
    fn labels_spawn_rise_and_stay_capped() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = OrderbookState::default();
        let layout = layout();
        for _ in 0..300 {
            state.advance(&book(5.0, 2.0), &layout, 0.0, 16.67, &mut rng);
        }
        assert!(!state.labels().is_empty());
        assert!(state.labels().len() <= MAX_ORDERBOOK_LABELS);
        assert!(
            state
                .labels()
                .iter()
                .all(|label| label.y <= layout.plot_bottom() - 6.0)
        );
    }

    #[test]
    fn empty_book_is_ignored() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = OrderbookState::default();
        state.advance(&OrderBook::default(), &layout(), 0.5, 16.67, &mut rng);
        assert!(state.labels().is_empty());
        assert_eq!(state.smooth_speed(), BASE_RISE_SPEED);
    }
}
