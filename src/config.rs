//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SimError;
use crate::model::{HealthParams, JamInjection, TrackerParams};
use crate::sim::clock::{validate_alignment, validate_tick};
use crate::sim::state::BufferPolicy;
use crate::sim::types::{DEFAULT_DAYLIGHT_JITTER_H, MAX_DAYLIGHT_JITTER_H, SimConfig};

/// Length of the baseline run in days.
const BASELINE_DAYS: u32 = 365;

/// Top-level scenario configuration parsed from TOML.
///
/// Every field has a default. The horizon is the one field the baseline sets
/// on top of them, so a file naming neither `days` nor `end_date` describes an
/// open-ended run. Date-times are written as quoted ISO strings
/// (`start = "2025-01-01T00:00:00"`). Load from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Panel, actuator and thermal constants.
    #[serde(default)]
    pub tracker: TrackerParams,
    /// Diagnostic overlay thresholds and fault injection.
    #[serde(default)]
    pub health: HealthParams,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// First simulated instant; must sit on the tick grid.
    pub start: NaiveDateTime,
    /// Tick duration in minutes; must evenly divide 1440.
    pub tick_minutes: u32,
    /// Number of days to simulate. Exclusive with `end_date`; leaving both
    /// unset gives an open-ended run.
    pub days: Option<u32>,
    /// Last simulated date, inclusive. Exclusive with `days`.
    pub end_date: Option<NaiveDate>,
    /// Master random seed.
    pub seed: u64,
    /// Live buffer policy: `"daily"` or `"rolling"`.
    pub live_buffer: String,
    /// Capacity of the rolling live buffer (points).
    pub live_buffer_points: usize,
    /// Half-width of the sunrise/sunset jitter (hours).
    pub daylight_jitter_h: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: midnight(2025, 1, 1),
            tick_minutes: 30,
            days: None,
            end_date: None,
            seed: 42,
            live_buffer: "daily".to_string(),
            live_buffer_points: 96,
            daylight_jitter_h: DEFAULT_DAYLIGHT_JITTER_H,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.tick_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<SimError> for ConfigError {
    fn from(e: SimError) -> Self {
        let field = match e {
            SimError::InvalidTickSize { .. } => "simulation.tick_minutes",
            SimError::MisalignedStart { .. } => "simulation.start",
            SimError::InvalidHorizon { .. } => "simulation.end_date",
            SimError::InvalidJitter { .. } => "simulation.daylight_jitter_h",
            _ => "simulation",
        };
        Self::new(field, e.to_string())
    }
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl ScenarioConfig {
    /// Returns the baseline scenario: one year from 2025-01-01 at 30-minute ticks.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig {
                days: Some(BASELINE_DAYS),
                ..SimulationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the summer-week preset: a pre-monsoon heat week at 15-minute ticks.
    pub fn summer_week() -> Self {
        Self {
            simulation: SimulationConfig {
                start: midnight(2025, 4, 7),
                tick_minutes: 15,
                days: Some(7),
                ..SimulationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the monsoon-month preset: July with a rolling one-week live buffer.
    pub fn monsoon_month() -> Self {
        Self {
            simulation: SimulationConfig {
                start: midnight(2025, 7, 1),
                days: Some(31),
                live_buffer: "rolling".to_string(),
                live_buffer_points: 7 * 48,
                ..SimulationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the jammed-day preset: the linkage sticks at noon on a summer day.
    pub fn jammed_day() -> Self {
        Self {
            simulation: SimulationConfig {
                start: midnight(2025, 4, 10),
                tick_minutes: 10,
                days: Some(1),
                ..SimulationConfig::default()
            },
            tracker: TrackerParams::default(),
            health: HealthParams {
                jam: Some(JamInjection {
                    start: midnight(2025, 4, 10) + chrono::TimeDelta::hours(12),
                    stuck_angle_deg: 30.0,
                }),
                ..HealthParams::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "summer_week", "monsoon_month", "jammed_day"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "summer_week" => Ok(Self::summer_week()),
            "monsoon_month" => Ok(Self::monsoon_month()),
            "jammed_day" => Ok(Self::jammed_day()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        match validate_tick(s.tick_minutes) {
            Ok(()) => {
                if let Err(e) = validate_alignment(s.start, s.tick_minutes) {
                    errors.push(e.into());
                }
            }
            Err(e) => errors.push(e.into()),
        }
        if s.days == Some(0) {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        if s.days.is_some() && s.end_date.is_some() {
            errors.push(ConfigError::new(
                "simulation.end_date",
                "cannot be combined with simulation.days",
            ));
        }
        if let Some(end) = s.end_date {
            if end < s.start.date() {
                errors.push(ConfigError::new(
                    "simulation.end_date",
                    format!("must not be before start date {}", s.start.date()),
                ));
            }
        }
        match s.live_buffer.as_str() {
            "daily" => {}
            "rolling" => {
                if s.live_buffer_points == 0 {
                    errors.push(ConfigError::new(
                        "simulation.live_buffer_points",
                        "must be > 0 for a rolling buffer",
                    ));
                }
            }
            other => errors.push(ConfigError::new(
                "simulation.live_buffer",
                format!("must be \"daily\" or \"rolling\", got \"{other}\""),
            )),
        }
        if !(0.0..=MAX_DAYLIGHT_JITTER_H).contains(&s.daylight_jitter_h) {
            errors.push(ConfigError::new(
                "simulation.daylight_jitter_h",
                format!("must be in [0.0, {MAX_DAYLIGHT_JITTER_H}]"),
            ));
        }

        let t = &self.tracker;
        if t.panel_capacity_w <= 0.0 {
            errors.push(ConfigError::new("tracker.panel_capacity_w", "must be > 0"));
        }
        if !(t.max_rotation_deg > 0.0 && t.max_rotation_deg <= 90.0) {
            errors.push(ConfigError::new(
                "tracker.max_rotation_deg",
                "must be in (0.0, 90.0]",
            ));
        }
        if t.deadband_c < 0.0 {
            errors.push(ConfigError::new("tracker.deadband_c", "must be >= 0"));
        }
        if t.actuation_range_c < 0.0 {
            errors.push(ConfigError::new("tracker.actuation_range_c", "must be >= 0"));
        }
        if t.wax_thermal_gain_c < 0.0 {
            errors.push(ConfigError::new("tracker.wax_thermal_gain_c", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&t.diffuse_floor) {
            errors.push(ConfigError::new(
                "tracker.diffuse_floor",
                "must be in [0.0, 1.0]",
            ));
        }

        let h = &self.health;
        if h.sensor_noise_std_deg < 0.0 {
            errors.push(ConfigError::new("health.sensor_noise_std_deg", "must be >= 0"));
        }
        if h.optimal_max_deviation_deg <= 0.0 {
            errors.push(ConfigError::new(
                "health.optimal_max_deviation_deg",
                "must be > 0",
            ));
        }
        if h.vibration_max_deviation_deg <= h.optimal_max_deviation_deg {
            errors.push(ConfigError::new(
                "health.vibration_max_deviation_deg",
                "must be > health.optimal_max_deviation_deg",
            ));
        }
        if let Some(rain) = &h.rain {
            if rain.end <= rain.start {
                errors.push(ConfigError::new(
                    "health.rain.end",
                    "must be after health.rain.start",
                ));
            }
        }

        errors
    }

    /// Builds the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, if any.
    pub fn to_sim_config(&self) -> Result<SimConfig, ConfigError> {
        if let Some(e) = self.validate().into_iter().next() {
            return Err(e);
        }
        let s = &self.simulation;

        let mut cfg = SimConfig::new(s.start, s.tick_minutes, s.seed)?;
        if let Some(days) = s.days {
            cfg = cfg.with_days(days);
        } else if let Some(end) = s.end_date {
            cfg = cfg.with_horizon(end);
        }
        cfg.buffer_policy = match s.live_buffer.as_str() {
            "rolling" => BufferPolicy::Rolling {
                capacity: s.live_buffer_points,
            },
            _ => BufferPolicy::Daily,
        };
        cfg.daylight_jitter_h = s.daylight_jitter_h;
        cfg.tracker = self.tracker.clone();
        cfg.health = self.health.clone();
        cfg.validate()?;
        Ok(cfg)
    }
}
