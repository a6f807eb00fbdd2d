use crate::core::Sample;

/// Linearly interpolates the series value at `time`.
///
/// Uses a binary search for the bracketing pair. Times at or before the first
/// sample return the first value, times at or after the last sample return
/// the last value. Returns `None` for an empty series.
#[must_use]
pub fn interpolate_at_time(points: &[Sample], time: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if time <= first.time {
        return Some(first.value);
    }
    if time >= last.time {
        return Some(last.value);
    }

    let mut lo = 0;
    let mut hi = points.len() - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if points[mid].time <= time {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let left = points[lo];
    let right = points[hi];
    let t = (time - left.time) / (right.time - left.time);
    Some(left.value + (right.value - left.value) * t)
}

#[cfg(test)]
mod tests {
    use super::interpolate_at_time;
    use crate::core::Sample;

    #[test]
    fn midpoint_between_samples() {
        let points = [Sample::new(10.0, 4.0), Sample::new(20.0, 8.0)];
        assert_eq!(interpolate_at_time(&points, 15.0), Some(6.0));
    }

    #[test]
    fn empty_series_has_no_value() {
        assert_eq!(interpolate_at_time(&[], 1.0), None);
    }

    #[test]
    fn exact_sample_time_returns_sample_value() {
        let points = [
            Sample::new(0.0, 1.0),
            Sample::new(1.0, 3.0),
            Sample::new(2.0, -2.0),
            Sample::new(3.0, 7.0),
        ];
        assert_eq!(interpolate_at_time(&points, 2.0), Some(-2.0));
    }
}
