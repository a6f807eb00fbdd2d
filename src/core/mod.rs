pub mod interpolate;
pub mod layout;
pub mod momentum;
pub mod primitives;
pub mod range;
pub mod spline;
pub mod types;
pub mod window_transition;
pub mod windowing;

pub use interpolate::interpolate_at_time;
pub use layout::{ChartLayout, WINDOW_BUFFER, window_buffer, window_edges};
pub use momentum::{DEFAULT_MOMENTUM_LOOKBACK, Momentum, detect_momentum, swing_magnitude};
pub use primitives::{REFERENCE_FRAME_MS, lerp, lerp_snap};
pub use range::compute_range;
pub use spline::{PixelPoint, SplineSegment, fit_monotone_spline, monotone_tangents};
pub use types::{Padding, Sample, Size, ValueRange, Viewport};
pub use window_transition::{WINDOW_TRANSITION_MS, WindowStep, WindowTransition};
pub use windowing::{collect_visible_samples, visible_samples};
