//! Instantaneous physical readings for a timestamp under a day profile.

use std::f32::consts::PI;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::actuator::WaxActuator;
use super::panel::Panel;
use super::profile::DayProfile;
use super::types::{REFERENCE_IRRADIANCE_WM2, hour_of_day};

/// Sun elevation reported outside the daylight window (below the horizon).
pub const NIGHT_SUN_ANGLE_DEG: f32 = -90.0;

/// Physical constants of the tracker and its surroundings.
///
/// Every constant of the thermal and actuator model is exposed here; the
/// defaults are the canonical parameterization (differential basis, 40 °C
/// greenhouse gain, 10 °C deadband, 60 °C ramp) under which a full-sun noon
/// puts the panel at the zenith.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerParams {
    /// Rated panel output at 1000 W/m² (W).
    pub panel_capacity_w: f32,
    /// Rotation limit either side of zenith (degrees).
    pub max_rotation_deg: f32,
    /// Wax-over-ambient differential before the linkage moves (°C).
    pub deadband_c: f32,
    /// Differential above the deadband that drives full extension (°C).
    pub actuation_range_c: f32,
    /// Extra heating of the wax chamber at full intensity (°C).
    pub wax_thermal_gain_c: f32,
    /// Ambient and wax temperature outside daylight (°C).
    pub night_temp_c: f32,
    /// Lower bound on intensity inside the daylight window (0 disables it).
    ///
    /// Models diffuse light so irradiance never reaches exact zero mid-day.
    /// It is a tuning knob, not physics; with a non-zero floor a fully
    /// attenuated day still yields a little energy.
    pub diffuse_floor: f32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            panel_capacity_w: 250.0,
            max_rotation_deg: 45.0,
            deadband_c: 10.0,
            actuation_range_c: 60.0,
            wax_thermal_gain_c: 40.0,
            night_temp_c: 18.0,
            diffuse_floor: 0.0,
        }
    }
}

/// Physical state of the tracker at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReading {
    pub timestamp: NaiveDateTime,
    pub is_daylight: bool,
    /// Sun angle across the sky, -90° at sunrise to +90° at sunset.
    pub sun_angle_deg: f32,
    pub irradiance_wm2: f32,
    pub ambient_temp_c: f32,
    pub wax_temp_c: f32,
    pub panel_angle_deg: f32,
    /// `|sun_angle - panel_angle|`.
    pub angular_error_deg: f32,
    pub power_w: f32,
}

/// Stateless mapping from `(timestamp, profile)` to a [`TelemetryReading`].
#[derive(Debug, Clone)]
pub struct TelemetryModel {
    params: TrackerParams,
    actuator: WaxActuator,
    panel: Panel,
}

impl TelemetryModel {
    pub fn new(params: TrackerParams) -> Self {
        let actuator = WaxActuator::new(
            params.max_rotation_deg,
            params.deadband_c,
            params.actuation_range_c,
        );
        let panel = Panel::new(params.panel_capacity_w);
        Self {
            params,
            actuator,
            panel,
        }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn actuator(&self) -> &WaxActuator {
        &self.actuator
    }

    /// Computes the reading at `timestamp`. Total over its domain.
    pub fn compute(&self, timestamp: NaiveDateTime, profile: &DayProfile) -> TelemetryReading {
        let hour = hour_of_day(timestamp);
        let sunrise = profile.sunrise_hour();
        let sunset = profile.sunset_hour();

        if hour < sunrise || hour > sunset {
            return self.night(timestamp);
        }

        let progress = ((hour - sunrise) / profile.daylight_hours()).clamp(0.0, 1.0);
        let sun_angle_deg = progress * 180.0 - 90.0;
        let base_intensity = (progress * PI).sin().max(0.0);
        let intensity = (base_intensity * profile.sun_attenuation_factor())
            .max(self.params.diffuse_floor)
            .min(1.0);

        let irradiance_wm2 = intensity * REFERENCE_IRRADIANCE_WM2;
        let night = self.params.night_temp_c;
        let ambient_temp_c = night + intensity * (profile.peak_temperature_c() - night);
        let wax_temp_c = ambient_temp_c + intensity * self.params.wax_thermal_gain_c;

        let panel_angle_deg = self.actuator.panel_angle_deg(wax_temp_c, ambient_temp_c);
        let angular_error_deg = (sun_angle_deg - panel_angle_deg).abs();
        let power_w = self.panel.power_w(irradiance_wm2, angular_error_deg);

        TelemetryReading {
            timestamp,
            is_daylight: true,
            sun_angle_deg,
            irradiance_wm2,
            ambient_temp_c,
            wax_temp_c,
            panel_angle_deg,
            angular_error_deg,
            power_w,
        }
    }

    fn night(&self, timestamp: NaiveDateTime) -> TelemetryReading {
        let panel_angle_deg = self.actuator.parked_angle_deg();
        TelemetryReading {
            timestamp,
            is_daylight: false,
            sun_angle_deg: NIGHT_SUN_ANGLE_DEG,
            irradiance_wm2: 0.0,
            ambient_temp_c: self.params.night_temp_c,
            wax_temp_c: self.params.night_temp_c,
            panel_angle_deg,
            angular_error_deg: (NIGHT_SUN_ANGLE_DEG - panel_angle_deg).abs(),
            power_w: 0.0,
        }
    }
}
