//! Append-only daily history and the aggregates derived from it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::model::Condition;

/// Schema version of [`DailyRecord`] rows. Bump on any field change.
pub const HISTORY_SCHEMA_VERSION: u32 = 1;

/// Finalized summary of one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub condition: Condition,
    /// Highest simulated ambient temperature of the day (°C).
    pub peak_temp_c: f32,
    /// Energy produced over the day (Wh).
    pub yield_wh: f32,
}

impl fmt::Display for DailyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:<8} | peak {:>5.1} °C | yield {:>8.1} Wh",
            self.date, self.condition, self.peak_temp_c, self.yield_wh
        )
    }
}

/// Versioned, serializable form of a [`HistoryStore`] for external persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub schema_version: u32,
    pub records: Vec<DailyRecord>,
}

/// Mean daily figures for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMean {
    pub year: i32,
    pub month: u32,
    pub days: usize,
    pub mean_yield_wh: f32,
    pub mean_peak_temp_c: f32,
}

/// Energy totals for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTotal {
    pub year: i32,
    pub days: usize,
    pub total_yield_wh: f64,
    pub mean_yield_wh: f32,
}

/// Ordered, append-only log of [`DailyRecord`]s.
///
/// Records are only ever exposed by shared reference, so nothing is mutated
/// after it is appended.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryStore {
    records: Vec<DailyRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a persisted snapshot.
    ///
    /// # Errors
    ///
    /// * [`SimError::SchemaMismatch`] if the snapshot was written by another schema
    /// * [`SimError::OutOfOrderHistory`] if dates are not strictly increasing
    pub fn restore(snapshot: HistorySnapshot) -> Result<Self, SimError> {
        if snapshot.schema_version != HISTORY_SCHEMA_VERSION {
            return Err(SimError::SchemaMismatch {
                expected: HISTORY_SCHEMA_VERSION,
                found: snapshot.schema_version,
            });
        }
        for pair in snapshot.records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SimError::OutOfOrderHistory { date: pair[1].date });
            }
        }
        Ok(Self {
            records: snapshot.records,
        })
    }

    /// Versioned copy of the records.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            schema_version: HISTORY_SCHEMA_VERSION,
            records: self.records.clone(),
        }
    }

    /// Appends a record. Records arrive in chronological order.
    pub fn push(&mut self, record: DailyRecord) {
        debug_assert!(
            self.records.last().is_none_or(|last| last.date < record.date),
            "history records must be appended in date order"
        );
        self.records.push(record);
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&DailyRecord> {
        self.records.last()
    }

    /// Lifetime energy across all records (Wh).
    pub fn total_energy_wh(&self) -> f64 {
        self.records.iter().map(|r| f64::from(r.yield_wh)).sum()
    }

    /// Records whose date falls within `[from, to]`.
    pub fn range(&self, from: NaiveDate, to: NaiveDate) -> &[DailyRecord] {
        let start = self.records.partition_point(|r| r.date < from);
        let end = self.records.partition_point(|r| r.date <= to);
        &self.records[start..end.max(start)]
    }

    /// Month-by-month means, in chronological order.
    pub fn monthly_means(&self) -> Vec<MonthlyMean> {
        let mut buckets: BTreeMap<(i32, u32), (usize, f64, f64)> = BTreeMap::new();
        for r in &self.records {
            let entry = buckets
                .entry((r.date.year(), r.date.month()))
                .or_insert((0, 0.0, 0.0));
            entry.0 += 1;
            entry.1 += f64::from(r.yield_wh);
            entry.2 += f64::from(r.peak_temp_c);
        }

        buckets
            .into_iter()
            .map(|((year, month), (days, yield_sum, temp_sum))| MonthlyMean {
                year,
                month,
                days,
                mean_yield_wh: (yield_sum / days as f64) as f32,
                mean_peak_temp_c: (temp_sum / days as f64) as f32,
            })
            .collect()
    }

    /// Year-by-year totals, in chronological order.
    pub fn yearly_totals(&self) -> Vec<YearlyTotal> {
        let mut buckets: BTreeMap<i32, (usize, f64)> = BTreeMap::new();
        for r in &self.records {
            let entry = buckets.entry(r.date.year()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += f64::from(r.yield_wh);
        }

        buckets
            .into_iter()
            .map(|(year, (days, total))| YearlyTotal {
                year,
                days,
                total_yield_wh: total,
                mean_yield_wh: (total / days as f64) as f32,
            })
            .collect()
    }

    /// Number of days per weather condition.
    pub fn condition_counts(&self) -> BTreeMap<Condition, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.records {
            *counts.entry(r.condition).or_insert(0) += 1;
        }
        counts
    }
}
