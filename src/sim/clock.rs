//! Simulated wall clock with fixed ticks, midnight rollover, and an optional horizon.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::Serialize;

use crate::error::SimError;

/// Minutes in one simulated day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Checks that a tick size is non-zero and evenly divides a day.
///
/// # Errors
///
/// Returns [`SimError::InvalidTickSize`] otherwise; such a tick would
/// never land exactly on midnight.
pub fn validate_tick(minutes: u32) -> Result<(), SimError> {
    if minutes == 0 || MINUTES_PER_DAY % minutes != 0 {
        return Err(SimError::InvalidTickSize { minutes });
    }
    Ok(())
}

/// Checks that `start` sits on the tick grid counted from midnight.
///
/// # Errors
///
/// Returns [`SimError::MisalignedStart`] if it does not.
pub fn validate_alignment(start: NaiveDateTime, tick_minutes: u32) -> Result<(), SimError> {
    let minute_of_day = start.hour() * 60 + start.minute();
    let whole_minute = start.second() == 0 && start.nanosecond() == 0;
    if !whole_minute || minute_of_day % tick_minutes != 0 {
        return Err(SimError::MisalignedStart {
            start,
            tick_minutes,
        });
    }
    Ok(())
}

/// Daylight phase of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DaylightPhase {
    Daytime,
    Nighttime,
}

impl DaylightPhase {
    pub fn from_daylight(is_daylight: bool) -> Self {
        if is_daylight {
            DaylightPhase::Daytime
        } else {
            DaylightPhase::Nighttime
        }
    }
}

impl fmt::Display for DaylightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaylightPhase::Daytime => f.write_str("day"),
            DaylightPhase::Nighttime => f.write_str("night"),
        }
    }
}

/// Fired when a tick lands exactly on midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverEvent {
    /// Day that just ended.
    pub closed_date: NaiveDate,
    /// Day that just began.
    pub opened_date: NaiveDate,
    /// `closed_date` was the last day of the horizon.
    pub horizon_reached: bool,
}

/// One clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Timestamp the tick covers (time before advancing).
    pub at: NaiveDateTime,
    pub rollover: Option<RolloverEvent>,
}

/// A simulation clock that advances by a fixed tick until an optional horizon.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wax_tracker_sim::sim::clock::SimulationClock;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let mut clock = SimulationClock::new(start, 360, Some(start.date())).unwrap();
///
/// let mut ticks = 0;
/// while let Some(tick) = clock.tick() {
///     ticks += 1;
///     if let Some(event) = tick.rollover {
///         assert!(event.horizon_reached);
///     }
/// }
/// assert_eq!(ticks, 4);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Time of the next tick.
    current: NaiveDateTime,
    tick_minutes: u32,
    step: TimeDelta,
    /// Last simulated date (inclusive).
    horizon: Option<NaiveDate>,
    finished: bool,
    phase: Option<DaylightPhase>,
}

impl SimulationClock {
    /// Creates a clock starting at `start`.
    ///
    /// # Errors
    ///
    /// * [`SimError::InvalidTickSize`] for ticks that do not divide a day
    /// * [`SimError::MisalignedStart`] if `start` is off the tick grid
    /// * [`SimError::InvalidHorizon`] if the horizon precedes the start date
    pub fn new(
        start: NaiveDateTime,
        tick_minutes: u32,
        horizon: Option<NaiveDate>,
    ) -> Result<Self, SimError> {
        validate_tick(tick_minutes)?;
        validate_alignment(start, tick_minutes)?;
        if let Some(h) = horizon {
            if h < start.date() {
                return Err(SimError::InvalidHorizon {
                    start: start.date(),
                    horizon: h,
                });
            }
        }

        Ok(Self {
            current: start,
            tick_minutes,
            step: TimeDelta::minutes(i64::from(tick_minutes)),
            horizon,
            finished: false,
            phase: None,
        })
    }

    pub fn current_time(&self) -> NaiveDateTime {
        self.current
    }

    pub fn tick_minutes(&self) -> u32 {
        self.tick_minutes
    }

    pub fn horizon(&self) -> Option<NaiveDate> {
        self.horizon
    }

    /// `true` once the horizon day has been closed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The timestamp before advancing, plus a rollover event
    ///   if the advance landed on midnight
    /// * `None` - If the horizon has already been reached
    pub fn tick(&mut self) -> Option<Tick> {
        if self.finished {
            return None;
        }

        let at = self.current;
        self.current = at + self.step;

        let rollover = (self.current.time() == NaiveTime::MIN).then(|| {
            let closed_date = at.date();
            let horizon_reached = self.horizon.is_some_and(|h| closed_date >= h);
            RolloverEvent {
                closed_date,
                opened_date: self.current.date(),
                horizon_reached,
            }
        });

        if rollover.is_some_and(|e| e.horizon_reached) {
            self.finished = true;
        }

        Some(Tick { at, rollover })
    }

    /// Current daylight phase, if any reading has been observed yet.
    pub fn phase(&self) -> Option<DaylightPhase> {
        self.phase
    }

    /// Records the daylight flag of the latest reading.
    ///
    /// Returns the new phase when it differs from the previous one. The
    /// first observation only initializes the phase.
    pub fn observe_daylight(&mut self, is_daylight: bool) -> Option<DaylightPhase> {
        let next = DaylightPhase::from_daylight(is_daylight);
        match self.phase.replace(next) {
            Some(prev) if prev != next => Some(next),
            _ => None,
        }
    }
}
