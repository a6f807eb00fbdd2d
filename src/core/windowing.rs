use crate::core::Sample;

/// Extra history (seconds) kept left of the window so the curve enters the
/// plot from outside instead of starting at the edge.
pub const VISIBLE_LEFT_SLACK_SECS: f64 = 2.0;

/// Collects samples inside `[left - slack, right]` into `out`, reusing its
/// allocation.
pub fn collect_visible_samples(points: &[Sample], left: f64, right: f64, out: &mut Vec<Sample>) {
    out.clear();
    out.extend(
        points
            .iter()
            .copied()
            .filter(|sample| sample.time >= left - VISIBLE_LEFT_SLACK_SECS && sample.time <= right),
    );
}

/// Returns samples inside `[left - slack, right]`.
#[must_use]
pub fn visible_samples(points: &[Sample], left: f64, right: f64) -> Vec<Sample> {
    let mut out = Vec::new();
    collect_visible_samples(points, left, right, &mut out);
    out
}
