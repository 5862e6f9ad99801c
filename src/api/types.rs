//! API response and query types.
//!
//! Telemetry field names follow the telemetry CSV columns for consistency
//! across export formats.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::model::HealthStatus;
use crate::sim::kpi::YieldReport;
use crate::sim::types::{SimConfig, StepResult};

/// Combined state response: config, yield report, and latest tick.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub config: SimConfig,
    pub report: YieldReport,
    /// Most recent tick, absent for an empty run.
    pub latest_step: Option<TelemetryRecord>,
}

/// Single per-tick record.
///
/// Flattens `StepResult` into the public API contract:
/// - `health.sensor_angle_deg` → `sensor_angle_deg`
/// - `health.status` → `health`
#[derive(Debug, Serialize)]
pub struct TelemetryRecord {
    /// Tick index within the run.
    pub tick: usize,
    pub timestamp: NaiveDateTime,
    pub is_daylight: bool,
    pub sun_angle_deg: f32,
    pub irradiance_wm2: f32,
    pub ambient_temp_c: f32,
    pub wax_temp_c: f32,
    pub panel_angle_deg: f32,
    pub angular_error_deg: f32,
    pub power_w: f32,
    pub energy_today_wh: f32,
    pub sensor_angle_deg: f32,
    pub health: HealthStatus,
}

impl TelemetryRecord {
    pub fn new(tick: usize, s: &StepResult) -> Self {
        let r = &s.reading;
        Self {
            tick,
            timestamp: r.timestamp,
            is_daylight: r.is_daylight,
            sun_angle_deg: r.sun_angle_deg,
            irradiance_wm2: r.irradiance_wm2,
            ambient_temp_c: r.ambient_temp_c,
            wax_temp_c: r.wax_temp_c,
            panel_angle_deg: r.panel_angle_deg,
            angular_error_deg: r.angular_error_deg,
            power_w: r.power_w,
            energy_today_wh: s.energy_today_wh,
            sensor_angle_deg: s.health.sensor_angle_deg,
            health: s.health.status,
        }
    }
}

/// Optional tick index range for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Start tick (inclusive).
    pub from: Option<usize>,
    /// End tick (inclusive).
    pub to: Option<usize>,
}

/// Optional date range for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    /// First date (inclusive, `YYYY-MM-DD`).
    pub from: Option<NaiveDate>,
    /// Last date (inclusive, `YYYY-MM-DD`).
    pub to: Option<NaiveDate>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HealthReport, TelemetryReading};
    use crate::sim::clock::DaylightPhase;

    #[test]
    fn telemetry_record_flattens_health() {
        let step = StepResult {
            reading: TelemetryReading {
                timestamp: NaiveDate::from_ymd_opt(2025, 5, 1)
                    .and_then(|d| d.and_hms_opt(9, 0, 0))
                    .unwrap(),
                is_daylight: true,
                sun_angle_deg: -40.0,
                irradiance_wm2: 600.0,
                ambient_temp_c: 30.0,
                wax_temp_c: 54.0,
                panel_angle_deg: -25.0,
                angular_error_deg: 15.0,
                power_w: 144.9,
            },
            health: HealthReport {
                sensor_angle_deg: -21.5,
                deviation_deg: 3.5,
                status: HealthStatus::Vibration,
            },
            phase: DaylightPhase::Daytime,
            energy_delta_wh: 72.45,
            energy_today_wh: 300.0,
            rollover: None,
        };

        let record = TelemetryRecord::new(18, &step);
        assert_eq!(record.tick, 18);
        assert_eq!(record.power_w, 144.9);
        assert_eq!(record.energy_today_wh, 300.0);
        assert_eq!(record.sensor_angle_deg, -21.5);
        assert_eq!(record.health, HealthStatus::Vibration);
    }
}
