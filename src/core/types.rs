use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64};
use crate::error::LivelineResult;

/// Surface size in physical (device) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Physical surface size for a content box in device-independent pixels.
    #[must_use]
    pub fn for_css_size(size: Size, pixel_ratio: f64) -> Self {
        Self {
            width: (size.width * pixel_ratio).round().max(0.0) as u32,
            height: (size.height * pixel_ratio).round().max(0.0) as u32,
        }
    }
}

/// Content-box size in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Inner plot padding in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 12.0,
            right: 80.0,
            bottom: 28.0,
            left: 12.0,
        }
    }
}

/// One point of the live series: unix time in seconds and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

impl Sample {
    #[must_use]
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.time.is_finite() && self.value.is_finite()
    }

    pub fn from_decimal_time(time: DateTime<Utc>, value: Decimal) -> LivelineResult<Self> {
        Ok(Self {
            time: datetime_to_unix_seconds(time),
            value: decimal_to_f64(value, "value")?,
        })
    }
}

/// Closed value interval used for the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }
}
