//! Diagnostic health overlay comparing a simulated position sensor against the model.
//!
//! The overlay is read-only: it never feeds back into the panel angle used
//! for power.

use std::fmt;

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::telemetry::TelemetryReading;
use super::types::gaussian_noise;

/// Mechanical health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Optimal,
    Vibration,
    JamDetected,
    /// Inside an injected rain window; the panel is expected to retract, so
    /// deviation alarms are suppressed.
    RainMode,
    /// Outside daylight; the tracker is parked and not assessed.
    Sleep,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Optimal => "Optimal",
            HealthStatus::Vibration => "Vibration",
            HealthStatus::JamDetected => "JamDetected",
            HealthStatus::RainMode => "RainMode",
            HealthStatus::Sleep => "Sleep",
        };
        f.write_str(label)
    }
}

/// Injected mechanical jam: from `start` on, the sensor reports a fixed angle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JamInjection {
    /// First instant the linkage is stuck.
    pub start: NaiveDateTime,
    /// Angle the panel is stuck at (degrees).
    pub stuck_angle_deg: f32,
}

/// Injected rain burst covering `[start, end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RainInjection {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl RainInjection {
    pub fn covers(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

/// Sensor noise, classification thresholds and optional fault injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthParams {
    /// Standard deviation of the angle sensor noise (degrees).
    pub sensor_noise_std_deg: f32,
    /// Deviations below this are `Optimal` (degrees).
    pub optimal_max_deviation_deg: f32,
    /// Deviations below this (and not optimal) are `Vibration` (degrees).
    pub vibration_max_deviation_deg: f32,
    pub jam: Option<JamInjection>,
    pub rain: Option<RainInjection>,
}

impl Default for HealthParams {
    fn default() -> Self {
        Self {
            sensor_noise_std_deg: 0.5,
            optimal_max_deviation_deg: 2.0,
            vibration_max_deviation_deg: 5.0,
            jam: None,
            rain: None,
        }
    }
}

/// Result of one health assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// Angle reported by the simulated position sensor.
    pub sensor_angle_deg: f32,
    /// `|sensor - model|`.
    pub deviation_deg: f32,
    pub status: HealthStatus,
}

/// Classifies readings by sensor-versus-model deviation.
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    params: HealthParams,
}

impl HealthMonitor {
    pub fn new(params: HealthParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &HealthParams {
        &self.params
    }

    /// Simulates a sensor sample for `reading` and classifies the deviation.
    ///
    /// Draws from `rng` only in daylight.
    pub fn assess<R: Rng + ?Sized>(&self, reading: &TelemetryReading, rng: &mut R) -> HealthReport {
        if !reading.is_daylight {
            return HealthReport {
                sensor_angle_deg: reading.panel_angle_deg,
                deviation_deg: 0.0,
                status: HealthStatus::Sleep,
            };
        }

        let sensor_angle_deg = match &self.params.jam {
            Some(jam) if reading.timestamp >= jam.start => jam.stuck_angle_deg,
            _ => {
                reading.panel_angle_deg + gaussian_noise(rng, self.params.sensor_noise_std_deg)
            }
        };
        let deviation_deg = (sensor_angle_deg - reading.panel_angle_deg).abs();
        let status = match &self.params.rain {
            Some(rain) if rain.covers(reading.timestamp) => HealthStatus::RainMode,
            _ => self.classify(deviation_deg),
        };

        HealthReport {
            sensor_angle_deg,
            deviation_deg,
            status,
        }
    }

    /// Maps a daylight deviation onto a status.
    pub fn classify(&self, deviation_deg: f32) -> HealthStatus {
        if deviation_deg < self.params.optimal_max_deviation_deg {
            HealthStatus::Optimal
        } else if deviation_deg < self.params.vibration_max_deviation_deg {
            HealthStatus::Vibration
        } else {
            HealthStatus::JamDetected
        }
    }
}
