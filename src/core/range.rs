use crate::core::{Sample, ValueRange};

const MARGIN_RATIO: f64 = 0.12;
const MARGIN_RATIO_EXAGGERATED: f64 = 0.01;
const FLOOR_RATIO: f64 = 0.1;
const FLOOR_RATIO_EXAGGERATED: f64 = 0.02;
const FLOOR_ABSOLUTE: f64 = 0.4;
const FLOOR_ABSOLUTE_EXAGGERATED: f64 = 0.04;

/// Computes the target value range for the visible samples.
///
/// The extent covers every visible sample, the live value and the optional
/// reference value. A degenerate extent is recentered and widened to a floor;
/// otherwise a proportional margin is added on both ends (tighter when
/// `exaggerate` is set).
#[must_use]
pub fn compute_range(
    visible: &[Sample],
    current_value: f64,
    reference_value: Option<f64>,
    exaggerate: bool,
) -> ValueRange {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let extra = std::iter::once(current_value).chain(reference_value);
    for value in visible.iter().map(|sample| sample.value).chain(extra) {
        min = min.min(value);
        max = max.max(value);
    }

    let raw_span = max - min;
    let (margin_ratio, floor_ratio, floor_absolute) = if exaggerate {
        (
            MARGIN_RATIO_EXAGGERATED,
            FLOOR_RATIO_EXAGGERATED,
            FLOOR_ABSOLUTE_EXAGGERATED,
        )
    } else {
        (MARGIN_RATIO, FLOOR_RATIO, FLOOR_ABSOLUTE)
    };

    let mut floor = raw_span * floor_ratio;
    if floor == 0.0 || floor.is_nan() {
        floor = floor_absolute;
    }

    if raw_span < floor {
        let mid = (min + max) / 2.0;
        ValueRange::new(mid - floor / 2.0, mid + floor / 2.0)
    } else {
        let margin = raw_span * margin_ratio;
        ValueRange::new(min - margin, max + margin)
    }
}

#[cfg(test)]
mod tests {
    use super::compute_range;
    use crate::core::Sample;

    fn series(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(i as f64, *v))
            .collect()
    }

    #[test]
    fn constant_series_gets_floor_span() {
        let range = compute_range(&series(&[5.0, 5.0, 5.0]), 5.0, None, false);
        assert!((range.span() - 0.4).abs() <= 1e-12);
        assert!((range.min - 4.8).abs() <= 1e-12);
    }

    #[test]
    fn exaggerated_constant_series_uses_tighter_floor() {
        let range = compute_range(&series(&[5.0, 5.0]), 5.0, None, true);
        assert!((range.span() - 0.04).abs() <= 1e-12);
    }

    #[test]
    fn margin_is_twelve_percent_of_span() {
        let range = compute_range(&series(&[0.0, 10.0]), 5.0, None, false);
        assert!((range.min + 1.2).abs() <= 1e-12);
        assert!((range.max - 11.2).abs() <= 1e-12);
    }

    #[test]
    fn live_and_reference_values_extend_range() {
        let range = compute_range(&series(&[0.0, 10.0]), 20.0, Some(-10.0), true);
        assert!(range.min < -10.0);
        assert!(range.max > 20.0);
    }
}
