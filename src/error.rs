//! Engine error type.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Errors raised while configuring the engine or restoring history.
///
/// Physics evaluation never fails; every variant here is either a
/// configuration-time rejection or a rejected history import.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Tick duration is zero or does not evenly divide a 24 hour day.
    #[error("tick of {minutes} min must be > 0 and evenly divide 1440 min")]
    InvalidTickSize { minutes: u32 },

    /// Start time does not sit on the tick grid, so midnight would never be hit exactly.
    #[error("start {start} is not aligned to the {tick_minutes} min tick grid")]
    MisalignedStart {
        start: NaiveDateTime,
        tick_minutes: u32,
    },

    /// Horizon lies before the first simulated day.
    #[error("horizon {horizon} is before start date {start}")]
    InvalidHorizon { start: NaiveDate, horizon: NaiveDate },

    /// Sunset does not come after sunrise.
    #[error("sunset {sunset_hour:.2}h must be after sunrise {sunrise_hour:.2}h within [0, 24)")]
    InvalidDaylightWindow { sunrise_hour: f32, sunset_hour: f32 },

    /// Sunrise/sunset jitter is negative or wide enough to push daylight past midnight.
    #[error("daylight jitter {hours}h must be in [0.0, {max}]h")]
    InvalidJitter { hours: f32, max: f32 },

    /// Injected first-day profile is for a different date than the start.
    #[error("profile for {found} cannot open a run starting on {expected}")]
    ProfileDateMismatch { expected: NaiveDate, found: NaiveDate },

    /// Attenuation factor outside `[0, 1]`.
    #[error("attenuation factor {0} must be in [0.0, 1.0]")]
    InvalidAttenuation(f32),

    /// Run-to-completion requested without a configured horizon.
    #[error("cannot run to completion without a horizon (set `days` or `end_date`)")]
    UnboundedRun,

    /// Persisted history uses a schema version this build does not read.
    #[error("history schema v{found} is not supported (expected v{expected})")]
    SchemaMismatch { expected: u32, found: u32 },

    /// Persisted history rows are not in strictly increasing date order.
    #[error("history record for {date} is not after the previous record")]
    OutOfOrderHistory { date: NaiveDate },
}
