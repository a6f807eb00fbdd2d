use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{LivelineError, LivelineResult};

/// Nominal frame duration the smoothing speeds are tuned against.
pub const REFERENCE_FRAME_MS: f64 = 16.67;

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> LivelineResult<f64> {
    value.to_f64().ok_or_else(|| {
        LivelineError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Frame-rate independent exponential approach of `current` toward `target`.
///
/// `speed` is the fraction of the gap closed per reference frame
/// ([`REFERENCE_FRAME_MS`]); `dt_ms` rescales it to the real elapsed time.
/// `speed = 0` never moves, `speed = 1` snaps, and the result always lies
/// between `current` and `target`.
#[must_use]
pub fn lerp(current: f64, target: f64, speed: f64, dt_ms: f64) -> f64 {
    let factor = 1.0 - (1.0 - speed).powf(dt_ms / REFERENCE_FRAME_MS);
    current + (target - current) * factor
}

/// [`lerp`] followed by a snap onto `target` once within `epsilon`.
#[must_use]
pub fn lerp_snap(current: f64, target: f64, speed: f64, dt_ms: f64, epsilon: f64) -> f64 {
    let next = lerp(current, target, speed, dt_ms);
    if (next - target).abs() < epsilon {
        target
    } else {
        next
    }
}

/// Clamps a unit-interval intensity to exact 0/1 near its ends.
#[must_use]
pub fn settle_unit(value: f64, low: f64, high: f64) -> f64 {
    if value < low {
        0.0
    } else if value > high {
        1.0
    } else {
        value
    }
}
