//! Core simulation types: configuration and per-tick results.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::clock::{DaylightPhase, MINUTES_PER_DAY, validate_alignment, validate_tick};
use super::history::DailyRecord;
use super::state::BufferPolicy;
use crate::error::SimError;
use crate::model::{HealthParams, HealthReport, TelemetryReading, TrackerParams};

/// Default half-width of the sunrise/sunset jitter (hours).
pub const DEFAULT_DAYLIGHT_JITTER_H: f32 = 0.25;

/// Largest accepted jitter; keeps every seasonal daylight window inside the day.
pub const MAX_DAYLIGHT_JITTER_H: f32 = 2.0;

/// Centralized simulation configuration.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wax_tracker_sim::sim::types::SimConfig;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let cfg = SimConfig::new(start, 30, 42).unwrap().with_days(2);
/// assert_eq!(cfg.ticks_per_day(), 48);
/// assert_eq!(cfg.dt_hours(), 0.5);
/// assert_eq!(cfg.horizon, NaiveDate::from_ymd_opt(2025, 1, 2));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SimConfig {
    /// First simulated instant (on the tick grid).
    pub start: NaiveDateTime,
    /// Tick duration in minutes; evenly divides a day.
    pub tick_minutes: u32,
    /// Last simulated date, inclusive. `None` runs forever.
    pub horizon: Option<NaiveDate>,
    /// Master random seed for reproducibility.
    pub seed: u64,
    pub buffer_policy: BufferPolicy,
    /// Half-width of the uniform sunrise/sunset jitter (hours).
    pub daylight_jitter_h: f32,
    pub tracker: TrackerParams,
    pub health: HealthParams,
}

impl SimConfig {
    /// Creates a configuration with default physics and no horizon.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidTickSize`] or [`SimError::MisalignedStart`]
    /// if the tick cannot land on midnight from `start`.
    pub fn new(start: NaiveDateTime, tick_minutes: u32, seed: u64) -> Result<Self, SimError> {
        let cfg = Self {
            start,
            tick_minutes,
            horizon: None,
            seed,
            buffer_policy: BufferPolicy::Daily,
            daylight_jitter_h: DEFAULT_DAYLIGHT_JITTER_H,
            tracker: TrackerParams::default(),
            health: HealthParams::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Limits the run to `days` calendar days starting at the start date.
    ///
    /// # Panics
    ///
    /// Panics if `days` is zero.
    pub fn with_days(mut self, days: u32) -> Self {
        assert!(days > 0, "days must be > 0");
        self.horizon = Some(self.start.date() + Days::new(u64::from(days - 1)));
        self
    }

    /// Sets an explicit last simulated date (inclusive).
    pub fn with_horizon(mut self, horizon: NaiveDate) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Re-checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), SimError> {
        validate_tick(self.tick_minutes)?;
        validate_alignment(self.start, self.tick_minutes)?;
        if !(0.0..=MAX_DAYLIGHT_JITTER_H).contains(&self.daylight_jitter_h) {
            return Err(SimError::InvalidJitter {
                hours: self.daylight_jitter_h,
                max: MAX_DAYLIGHT_JITTER_H,
            });
        }
        if let Some(h) = self.horizon {
            if h < self.start.date() {
                return Err(SimError::InvalidHorizon {
                    start: self.start.date(),
                    horizon: h,
                });
            }
        }
        Ok(())
    }

    pub fn ticks_per_day(&self) -> u32 {
        MINUTES_PER_DAY / self.tick_minutes
    }

    /// Duration of one tick in hours.
    pub fn dt_hours(&self) -> f32 {
        self.tick_minutes as f32 / 60.0
    }

    /// Number of simulated days, if bounded.
    pub fn horizon_days(&self) -> Option<u32> {
        self.horizon.map(|h| {
            let span = h.signed_duration_since(self.start.date()).num_days();
            u32::try_from(span + 1).unwrap_or(u32::MAX)
        })
    }
}

/// Complete record of one simulation tick.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub reading: TelemetryReading,
    pub health: HealthReport,
    pub phase: DaylightPhase,
    /// Energy produced during this tick (Wh).
    pub energy_delta_wh: f32,
    /// Energy produced so far today, including this tick (Wh).
    pub energy_today_wh: f32,
    /// Day archived by this tick, if it crossed midnight.
    pub rollover: Option<DailyRecord>,
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.reading;
        write!(
            f,
            "{} ({:<5}) | sun={:>6.1}° panel={:>6.1}° err={:>5.1}° | \
             irr={:>6.1} W/m² amb={:>5.1} °C wax={:>5.1} °C | \
             P={:>6.1} W E={:>7.1} Wh | {}",
            r.timestamp.format("%Y-%m-%d %H:%M"),
            self.phase,
            r.sun_angle_deg,
            r.panel_angle_deg,
            r.angular_error_deg,
            r.irradiance_wm2,
            r.ambient_temp_c,
            r.wax_temp_c,
            r.power_w,
            self.energy_today_wh,
            self.health.status,
        )
    }
}
