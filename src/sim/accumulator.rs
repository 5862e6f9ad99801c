//! Energy integration over one simulated day.

use chrono::NaiveDate;

use super::history::DailyRecord;
use crate::model::Condition;

/// Energy produced by `power_w` held for one tick (Wh).
pub fn energy_delta_wh(power_w: f32, tick_minutes: u32) -> f32 {
    power_w.max(0.0) * tick_minutes as f32 / 60.0
}

/// Integrates power into energy-today and tracks the day's running ambient maximum.
#[derive(Debug, Clone)]
pub struct EnergyAccumulator {
    tick_minutes: u32,
    energy_today_wh: f32,
    max_ambient_c: Option<f32>,
}

impl EnergyAccumulator {
    pub fn new(tick_minutes: u32) -> Self {
        Self {
            tick_minutes,
            energy_today_wh: 0.0,
            max_ambient_c: None,
        }
    }

    /// Adds one tick of `power_w` and returns the energy delta (Wh).
    pub fn integrate(&mut self, power_w: f32) -> f32 {
        let delta = energy_delta_wh(power_w, self.tick_minutes);
        self.energy_today_wh += delta;
        delta
    }

    pub fn observe_ambient(&mut self, ambient_temp_c: f32) {
        self.max_ambient_c = Some(match self.max_ambient_c {
            Some(max) => max.max(ambient_temp_c),
            None => ambient_temp_c,
        });
    }

    pub fn energy_today_wh(&self) -> f32 {
        self.energy_today_wh
    }

    pub fn max_ambient_c(&self) -> Option<f32> {
        self.max_ambient_c
    }

    /// Closes the day into a [`DailyRecord`] and resets both accumulators.
    ///
    /// `nominal_peak_c` is used only when no ambient temperature was observed.
    pub fn finalize(
        &mut self,
        date: NaiveDate,
        condition: Condition,
        nominal_peak_c: f32,
    ) -> DailyRecord {
        let record = DailyRecord {
            date,
            condition,
            peak_temp_c: self.max_ambient_c.unwrap_or(nominal_peak_c),
            yield_wh: self.energy_today_wh,
        };
        self.energy_today_wh = 0.0;
        self.max_ambient_c = None;
        record
    }
}
