use serde::{Deserialize, Serialize};

use crate::core::Sample;

pub const DEFAULT_MOMENTUM_LOOKBACK: usize = 20;
const MOMENTUM_TAIL: usize = 5;
const MOMENTUM_THRESHOLD_RATIO: f64 = 0.12;

/// Coarse trend of the most recent samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Up,
    Down,
    #[default]
    Flat,
}

impl Momentum {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }
}

/// Classifies the trend over the last `lookback` samples.
///
/// The value change across the last five samples is compared with 12% of the
/// lookback extent. Fewer than five samples or a zero extent yield `Flat`.
#[must_use]
pub fn detect_momentum(points: &[Sample], lookback: usize) -> Momentum {
    if points.len() < MOMENTUM_TAIL {
        return Momentum::Flat;
    }

    let recent = &points[points.len().saturating_sub(lookback)..];
    let (min, max) = recent
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), sample| {
            (lo.min(sample.value), hi.max(sample.value))
        });
    let range = max - min;
    if range == 0.0 {
        return Momentum::Flat;
    }

    let tail = &recent[recent.len().saturating_sub(MOMENTUM_TAIL)..];
    let delta = tail[tail.len() - 1].value - tail[0].value;
    let threshold = range * MOMENTUM_THRESHOLD_RATIO;
    if delta > threshold {
        Momentum::Up
    } else if delta < -threshold {
        Momentum::Down
    } else {
        Momentum::Flat
    }
}

/// Recent value swing relative to the displayed range, in `[0, 1]`.
#[must_use]
pub fn swing_magnitude(visible: &[Sample], value_range: f64) -> f64 {
    if visible.is_empty() || value_range <= 0.0 {
        return 0.0;
    }
    let lookback = MOMENTUM_TAIL.min(visible.len() - 1);
    if lookback == 0 {
        return 0.0;
    }
    let last = visible[visible.len() - 1].value;
    let earlier = visible[visible.len() - 1 - lookback].value;
    ((last - earlier).abs() / value_range).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MOMENTUM_LOOKBACK, Momentum, detect_momentum, swing_magnitude};
    use crate::core::Sample;

    fn series(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(i as f64, *v))
            .collect()
    }

    #[test]
    fn short_series_is_flat() {
        let points = series(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            detect_momentum(&points, DEFAULT_MOMENTUM_LOOKBACK),
            Momentum::Flat
        );
    }

    #[test]
    fn rising_tail_is_up() {
        let points = series(&[10.0, 10.0, 10.0, 10.0, 12.0, 20.0]);
        assert_eq!(
            detect_momentum(&points, DEFAULT_MOMENTUM_LOOKBACK),
            Momentum::Up
        );
    }

    #[test]
    fn falling_tail_is_down() {
        let points = series(&[20.0, 20.0, 19.0, 15.0, 12.0, 10.0]);
        assert_eq!(
            detect_momentum(&points, DEFAULT_MOMENTUM_LOOKBACK),
            Momentum::Down
        );
    }

    #[test]
    fn constant_series_is_flat() {
        let points = series(&[3.0; 8]);
        assert_eq!(
            detect_momentum(&points, DEFAULT_MOMENTUM_LOOKBACK),
            Momentum::Flat
        );
    }

    #[test]
    fn swing_is_relative_to_range() {
        let points = series(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((swing_magnitude(&points, 10.0) - 0.5).abs() <= 1e-12);
        assert_eq!(swing_magnitude(&points, 2.0), 1.0);
        assert_eq!(swing_magnitude(&points[..1], 2.0), 0.0);
    }

    #[test]
    fn parse_accepts_known_names() {
        assert_eq!(Momentum::parse("down"), Some(Momentum::Down));
        assert_eq!(Momentum::parse("sideways"), None);
    }
}
