//! Mutable simulation state and the live power buffer.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::accumulator::EnergyAccumulator;
use super::clock::{DaylightPhase, SimulationClock};
use crate::model::DayProfile;

/// Retention rule for the live `(time, power)` series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BufferPolicy {
    /// Holds the current day only; cleared at each rollover.
    Daily,
    /// Holds the most recent `capacity` points across days.
    Rolling { capacity: usize },
}

/// One point of the live power series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerPoint {
    pub time: NaiveDateTime,
    pub power_w: f32,
}

/// Live time series of panel power, retained according to a [`BufferPolicy`].
#[derive(Debug, Clone)]
pub struct LiveBuffer {
    policy: BufferPolicy,
    points: VecDeque<PowerPoint>,
}

impl LiveBuffer {
    pub fn new(policy: BufferPolicy) -> Self {
        let points = match policy {
            BufferPolicy::Rolling { capacity } => VecDeque::with_capacity(capacity),
            BufferPolicy::Daily => VecDeque::new(),
        };
        Self { policy, points }
    }

    pub fn policy(&self) -> BufferPolicy {
        self.policy
    }

    pub fn push(&mut self, point: PowerPoint) {
        if let BufferPolicy::Rolling { capacity } = self.policy {
            if capacity == 0 {
                return;
            }
            while self.points.len() >= capacity {
                self.points.pop_front();
            }
        }
        self.points.push_back(point);
    }

    /// Applies the day-boundary rule of the policy.
    pub fn on_rollover(&mut self) {
        if self.policy == BufferPolicy::Daily {
            self.points.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&PowerPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PowerPoint> {
        self.points.iter()
    }
}

/// Everything that changes from tick to tick.
///
/// Owned by the engine; only the engine mutates it.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub(crate) clock: SimulationClock,
    pub(crate) active_profile: DayProfile,
    pub(crate) accumulator: EnergyAccumulator,
    pub(crate) live_buffer: LiveBuffer,
    pub(crate) day_count: u32,
}

impl SimulationState {
    pub(crate) fn new(clock: SimulationClock, profile: DayProfile, policy: BufferPolicy) -> Self {
        let accumulator = EnergyAccumulator::new(clock.tick_minutes());
        Self {
            clock,
            active_profile: profile,
            accumulator,
            live_buffer: LiveBuffer::new(policy),
            day_count: 0,
        }
    }

    /// Time of the next tick.
    pub fn current_time(&self) -> NaiveDateTime {
        self.clock.current_time()
    }

    pub fn active_profile(&self) -> &DayProfile {
        &self.active_profile
    }

    pub fn energy_today_wh(&self) -> f32 {
        self.accumulator.energy_today_wh()
    }

    pub fn live_buffer(&self) -> &LiveBuffer {
        &self.live_buffer
    }

    /// Number of days archived so far.
    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    pub fn phase(&self) -> Option<DaylightPhase> {
        self.clock.phase()
    }
}
