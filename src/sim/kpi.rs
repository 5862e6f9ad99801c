//! Post-hoc yield and tracking KPIs from a completed run.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::history::HistoryStore;
use super::types::StepResult;
use crate::model::HealthStatus;

/// Aggregate key performance indicators derived from a simulation run.
///
/// Energy figures come from the archived history; tracking figures come from
/// the per-tick results, so a partially completed day contributes to the
/// latter only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldReport {
    /// Archived days.
    pub days: usize,
    /// Total archived energy (kWh).
    pub total_energy_kwh: f64,
    /// Mean archived daily yield (Wh).
    pub mean_daily_yield_wh: f32,
    /// Date and yield (Wh) of the most productive day.
    pub best_day: Option<(NaiveDate, f32)>,
    /// Date and yield (Wh) of the least productive day.
    pub worst_day: Option<(NaiveDate, f32)>,
    /// Peak instantaneous panel power (W).
    pub peak_power_w: f32,
    /// Mean `|sun - panel|` over daylight ticks (degrees).
    pub mean_daylight_error_deg: f32,
    /// Daylight ticks (count).
    pub daylight_ticks: usize,
    /// Ticks classified as `Vibration`.
    pub vibration_ticks: usize,
    /// Ticks classified as `JamDetected`.
    pub jam_ticks: usize,
}

impl YieldReport {
    /// Computes all KPIs from the archived history and the tick results.
    pub fn from_run(history: &HistoryStore, results: &[StepResult]) -> Self {
        let records = history.records();
        let days = records.len();
        let total_wh = history.total_energy_wh();
        let mean_daily_yield_wh = if days > 0 {
            (total_wh / days as f64) as f32
        } else {
            0.0
        };

        let best_day = records
            .iter()
            .max_by(|a, b| a.yield_wh.total_cmp(&b.yield_wh))
            .map(|r| (r.date, r.yield_wh));
        let worst_day = records
            .iter()
            .min_by(|a, b| a.yield_wh.total_cmp(&b.yield_wh))
            .map(|r| (r.date, r.yield_wh));

        let mut peak_power_w = 0.0_f32;
        let mut error_sum = 0.0_f32;
        let mut daylight_ticks = 0_usize;
        let mut vibration_ticks = 0_usize;
        let mut jam_ticks = 0_usize;

        for r in results {
            peak_power_w = peak_power_w.max(r.reading.power_w);
            if r.reading.is_daylight {
                error_sum += r.reading.angular_error_deg;
                daylight_ticks += 1;
            }
            match r.health.status {
                HealthStatus::Vibration => vibration_ticks += 1,
                HealthStatus::JamDetected => jam_ticks += 1,
                HealthStatus::Optimal | HealthStatus::RainMode | HealthStatus::Sleep => {}
            }
        }

        let mean_daylight_error_deg = if daylight_ticks > 0 {
            error_sum / daylight_ticks as f32
        } else {
            0.0
        };

        Self {
            days,
            total_energy_kwh: total_wh / 1000.0,
            mean_daily_yield_wh,
            best_day,
            worst_day,
            peak_power_w,
            mean_daylight_error_deg,
            daylight_ticks,
            vibration_ticks,
            jam_ticks,
        }
    }
}

impl fmt::Display for YieldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Yield Report ---")?;
        writeln!(f, "Days archived:         {}", self.days)?;
        writeln!(f, "Total energy:          {:.3} kWh", self.total_energy_kwh)?;
        writeln!(f, "Mean daily yield:      {:.1} Wh", self.mean_daily_yield_wh)?;
        if let Some((date, wh)) = self.best_day {
            writeln!(f, "Best day:              {date} ({wh:.1} Wh)")?;
        }
        if let Some((date, wh)) = self.worst_day {
            writeln!(f, "Worst day:             {date} ({wh:.1} Wh)")?;
        }
        writeln!(f, "Peak power:            {:.1} W", self.peak_power_w)?;
        writeln!(
            f,
            "Mean tracking error:   {:.2}° over {} daylight ticks",
            self.mean_daylight_error_deg, self.daylight_ticks
        )?;
        write!(
            f,
            "Health alerts:         {} vibration, {} jam",
            self.vibration_ticks, self.jam_ticks
        )
    }
}
