use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Pixel-space point `(x, y)`.
pub type PixelPoint = (f64, f64);

/// One piece of a fitted curve, starting where the previous piece ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SplineSegment {
    Line {
        to: PixelPoint,
    },
    Cubic {
        from: PixelPoint,
        control1: PixelPoint,
        control2: PixelPoint,
        to: PixelPoint,
    },
}

impl SplineSegment {
    #[must_use]
    pub fn end(self) -> PixelPoint {
        match self {
            Self::Line { to } | Self::Cubic { to, .. } => to,
        }
    }

    /// Evaluates a cubic piece at `t` in `[0, 1]`; line pieces return their end.
    #[must_use]
    pub fn point_at(self, t: f64) -> PixelPoint {
        match self {
            Self::Line { to } => to,
            Self::Cubic {
                from,
                control1,
                control2,
                to,
            } => {
                let u = 1.0 - t;
                let b0 = u * u * u;
                let b1 = 3.0 * u * u * t;
                let b2 = 3.0 * u * t * t;
                let b3 = t * t * t;
                (
                    b0 * from.0 + b1 * control1.0 + b2 * control2.0 + b3 * to.0,
                    b0 * from.1 + b1 * control1.1 + b2 * control2.1 + b3 * to.1,
                )
            }
        }
    }
}

/// Monotone cubic Hermite tangents (Fritsch–Carlson) for `points`.
///
/// Interior tangents average the adjacent secants and are zeroed at local
/// extrema; every interval is then rescaled so `alpha² + beta² <= 9`.
#[must_use]
pub fn monotone_tangents(points: &[PixelPoint]) -> Vec<f64> {
    let n = points.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let secants: SmallVec<[f64; 64]> = points
        .windows(2)
        .map(|pair| {
            let h = pair[1].0 - pair[0].0;
            if h == 0.0 {
                0.0
            } else {
                (pair[1].1 - pair[0].1) / h
            }
        })
        .collect();

    let mut tangents = vec![0.0; n];
    tangents[0] = secants[0];
    tangents[n - 1] = secants[n - 2];
    for i in 1..n - 1 {
        tangents[i] = if secants[i - 1] * secants[i] <= 0.0 {
            0.0
        } else {
            (secants[i - 1] + secants[i]) / 2.0
        };
    }

    for i in 0..n - 1 {
        let delta = secants[i];
        if delta == 0.0 {
            tangents[i] = 0.0;
            tangents[i + 1] = 0.0;
            continue;
        }
        let alpha = tangents[i] / delta;
        let beta = tangents[i + 1] / delta;
        let norm = alpha * alpha + beta * beta;
        if norm > 9.0 {
            let scale = 3.0 / norm.sqrt();
            tangents[i] = scale * alpha * delta;
            tangents[i + 1] = scale * beta * delta;
        }
    }

    tangents
}

/// Fits a monotone spline through `points` as Bézier pieces.
///
/// The path starts at `points[0]`; two points fall back to a straight line.
#[must_use]
pub fn fit_monotone_spline(points: &[PixelPoint]) -> Vec<SplineSegment> {
    match points.len() {
        0 | 1 => Vec::new(),
        2 => vec![SplineSegment::Line { to: points[1] }],
        _ => {
            let tangents = monotone_tangents(points);
            points
                .windows(2)
                .zip(tangents.windows(2))
                .map(|(pair, slopes)| {
                    let (x0, y0) = pair[0];
                    let (x1, y1) = pair[1];
                    let h = x1 - x0;
                    SplineSegment::Cubic {
                        from: (x0, y0),
                        control1: (x0 + h / 3.0, y0 + slopes[0] * h / 3.0),
                        control2: (x1 - h / 3.0, y1 - slopes[1] * h / 3.0),
                        to: (x1, y1),
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SplineSegment, fit_monotone_spline, monotone_tangents};

    #[test]
    fn two_points_are_a_straight_segment() {
        let segments = fit_monotone_spline(&[(0.0, 0.0), (10.0, 5.0)]);
        assert_eq!(segments, vec![SplineSegment::Line { to: (10.0, 5.0) }]);
    }

    #[test]
    fn local_extremum_gets_flat_tangent() {
        let tangents = monotone_tangents(&[(0.0, 0.0), (1.0, 10.0), (2.0, 0.0)]);
        assert_eq!(tangents[1], 0.0);
    }

    #[test]
    fn flat_interval_zeroes_both_tangents() {
        let tangents = monotone_tangents(&[(0.0, 0.0), (1.0, 5.0), (2.0, 5.0), (3.0, 9.0)]);
        assert_eq!(tangents[1], 0.0);
        assert_eq!(tangents[2], 0.0);
    }

    #[test]
    fn steep_step_is_rescaled() {
        let points = [(0.0, 0.0), (1.0, 0.1), (2.0, 10.0), (3.0, 10.1)];
        let tangents = monotone_tangents(&points);
        let delta = 9.9;
        let alpha = tangents[1] / delta;
        let beta = tangents[2] / delta;
        assert!(alpha * alpha + beta * beta <= 9.0 + 1e-9);
    }

    #[test]
    fn segments_are_continuous() {
        let points = [(0.0, 3.0), (5.0, 1.0), (9.0, 4.0), (12.0, 4.5)];
        let segments = fit_monotone_spline(&points);
        assert_eq!(segments.len(), 3);
        for (segment, expected_end) in segments.iter().zip(points.iter().skip(1)) {
            assert_eq!(segment.end(), *expected_end);
        }
    }
}
