use ordered_float::OrderedFloat;

use super::TimeAxisTimeZone;

/// Minimum pixel gap between coarse value gridlines.
pub const GRID_MIN_GAP_PX: f64 = 36.0;
/// Minimum pixel gap between time-axis ticks.
pub const TIME_MIN_GAP_PX: f64 = 60.0;
/// Extra clearance kept between neighbouring time labels.
pub const TIME_LABEL_COLLISION_BUFFER_PX: f64 = 8.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

const DIVISOR_CYCLES: [[f64; 3]; 3] = [[2.0, 2.5, 2.0], [2.0, 2.0, 2.5], [2.5, 2.0, 2.0]];

/// Picks the coarse value-grid interval for `value_span` units drawn at
/// `px_per_unit`.
///
/// Starting from the smallest power of ten covering the span, each divisor
/// cycle shrinks the interval while the next step still keeps `min_gap_px`;
/// the smallest survivor wins. `previous` is kept while its spacing stays in
/// `[0.5, 4] x min_gap_px` so a slowly drifting range does not flicker.
/// Returns `0` for an empty or non-finite span.
#[must_use]
pub fn pick_interval(value_span: f64, px_per_unit: f64, min_gap_px: f64, previous: f64) -> f64 {
    if !(value_span.is_finite() && value_span > 0.0 && px_per_unit.is_finite() && px_per_unit > 0.0)
    {
        return 0.0;
    }

    if previous > 0.0 {
        let px = previous * px_per_unit;
        if px >= min_gap_px * 0.5 && px <= min_gap_px * 4.0 {
            return previous;
        }
    }

    let mut best = f64::INFINITY;
    for divisors in DIVISOR_CYCLES {
        let mut span = 10f64.powf(value_span.log10().ceil());
        let mut step = 0usize;
        while span / divisors[step % 3] * px_per_unit >= min_gap_px {
            span /= divisors[step % 3];
            step += 1;
        }
        best = best.min(span);
    }

    if best.is_finite() { best } else { value_span / 5.0 }
}

/// Whether `value` lies on a multiple of `interval` (1% tolerance).
#[must_use]
pub fn divisible(value: f64, interval: f64) -> bool {
    let ratio = value / interval;
    (ratio - ratio.round()).abs() < 0.01
}

/// Base time-axis tick interval (seconds) for a window length.
#[must_use]
pub fn nice_time_interval(window_secs: f64) -> f64 {
    const LADDER: [(f64, f64); 12] = [
        (15.0, 2.0),
        (30.0, 5.0),
        (60.0, 10.0),
        (120.0, 15.0),
        (300.0, 30.0),
        (600.0, 60.0),
        (1_800.0, 300.0),
        (3_600.0, 600.0),
        (14_400.0, 1_800.0),
        (43_200.0, 3_600.0),
        (86_400.0, 7_200.0),
        (604_800.0, 86_400.0),
    ];
    LADDER
        .iter()
        .find(|(limit, _)| window_secs <= *limit)
        .map_or(604_800.0, |(_, interval)| *interval)
}

/// Ladder interval doubled until ticks sit at least [`TIME_MIN_GAP_PX`]
/// apart, never beyond the window itself.
#[must_use]
pub fn time_tick_interval(window_secs: f64, chart_width: f64) -> f64 {
    let px_per_sec = chart_width / window_secs;
    let mut interval = nice_time_interval(window_secs);
    while interval * px_per_sec < TIME_MIN_GAP_PX && interval < window_secs {
        interval *= 2.0;
    }
    interval
}

/// First tick at or before `left_edge - interval`.
///
/// Day-sized intervals start at local midnight in `zone`; shorter ones sit on
/// multiples of the interval.
#[must_use]
pub fn first_time_tick(left_edge: f64, interval: f64, zone: TimeAxisTimeZone) -> f64 {
    let start = left_edge - interval;
    if interval >= SECONDS_PER_DAY {
        if let Some(midnight) = zone.start_of_day(start) {
            return midnight;
        }
    }
    (start / interval).ceil() * interval
}

/// A label candidate placed on a horizontal axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel<T> {
    pub x: f64,
    pub width: f64,
    pub alpha: f64,
    pub item: T,
}

/// Drops overlapping labels left to right, keeping the more opaque one of
/// each colliding pair.
#[must_use]
pub fn resolve_label_collisions<T>(
    mut labels: Vec<PlacedLabel<T>>,
    buffer_px: f64,
) -> Vec<PlacedLabel<T>> {
    labels.sort_by_key(|label| OrderedFloat(label.x));

    let mut kept: Vec<PlacedLabel<T>> = Vec::with_capacity(labels.len());
    for label in labels {
        if let Some(previous) = kept.last_mut() {
            let previous_right = previous.x + previous.width / 2.0;
            if label.x - label.width / 2.0 < previous_right + buffer_px {
                if label.alpha > previous.alpha {
                    *previous = label;
                }
                continue;
            }
        }
        kept.push(label);
    }
    kept
}
