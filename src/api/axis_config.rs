use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Formats a value for the grid, badge, tooltip and readout.
pub type ValueFormatterFn = Arc<dyn Fn(f64) -> String + Send + Sync + 'static>;
/// Formats a unix time (seconds) for the time axis and tooltip.
pub type TimeFormatterFn = Arc<dyn Fn(f64) -> String + Send + Sync + 'static>;

/// Timezone used for day-aligned time-axis ticks and the default time format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeAxisTimeZone {
    #[default]
    Local,
    Utc,
    FixedOffsetMinutes {
        minutes: i16,
    },
}

impl TimeAxisTimeZone {
    fn fixed_offset(minutes: i16) -> FixedOffset {
        FixedOffset::east_opt(i32::from(minutes) * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Unix seconds of the midnight starting the day that contains `time`.
    #[must_use]
    pub fn start_of_day(self, time: f64) -> Option<f64> {
        match self {
            Self::Local => midnight_in(&Local, time),
            Self::Utc => midnight_in(&Utc, time),
            Self::FixedOffsetMinutes { minutes } => midnight_in(&Self::fixed_offset(minutes), time),
        }
    }

    /// Formats `time` as `HH:MM:SS` in this zone.
    #[must_use]
    pub fn format_clock(self, time: f64) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp_millis((time * 1000.0).floor() as i64)
        else {
            return String::new();
        };
        match self {
            Self::Local => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
            Self::Utc => utc.format("%H:%M:%S").to_string(),
            Self::FixedOffsetMinutes { minutes } => utc
                .with_timezone(&Self::fixed_offset(minutes))
                .format("%H:%M:%S")
                .to_string(),
        }
    }
}

fn midnight_in<Tz: TimeZone>(zone: &Tz, time: f64) -> Option<f64> {
    let moment = zone.timestamp_millis_opt((time * 1000.0).floor() as i64).single()?;
    let naive_midnight = moment.date_naive().and_hms_opt(0, 0, 0)?;
    let midnight = zone.from_local_datetime(&naive_midnight).earliest()?;
    Some(midnight.timestamp_millis() as f64 / 1000.0)
}

/// `toFixed(2)`-style value text; non-finite values render as an em dash.
#[must_use]
pub fn default_format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "\u{2014}".to_owned()
    }
}

#[must_use]
pub fn default_value_formatter() -> ValueFormatterFn {
    Arc::new(default_format_value)
}

#[must_use]
pub fn default_time_formatter(zone: TimeAxisTimeZone) -> TimeFormatterFn {
    Arc::new(move |time| zone.format_clock(time))
}
