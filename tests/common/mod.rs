//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand::rngs::StdRng;

use wax_tracker_sim::model::{Condition, DayProfile};
use wax_tracker_sim::sim::engine::Engine;
use wax_tracker_sim::sim::types::SimConfig;

/// Midnight on the given date.
pub fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

/// Default-physics configuration starting at midnight on 2025-01-01 with no horizon.
pub fn open_config(tick_minutes: u32, seed: u64) -> SimConfig {
    SimConfig::new(midnight(2025, 1, 1), tick_minutes, seed).expect("valid config")
}

/// Default-physics configuration running `days` days from `start`.
pub fn bounded_config(start: NaiveDateTime, tick_minutes: u32, days: u32, seed: u64) -> SimConfig {
    SimConfig::new(start, tick_minutes, seed)
        .expect("valid config")
        .with_days(days)
}

/// Fixed 06:00-18:00 profile peaking at 35 °C.
pub fn fixed_profile(date: NaiveDate, attenuation: f32) -> DayProfile {
    DayProfile::new(date, 6.0, 18.0, 35.0, attenuation, Condition::Sunny)
        .expect("valid profile")
}

/// Engine whose first day uses [`fixed_profile`].
pub fn fixed_engine(config: SimConfig, attenuation: f32) -> Engine<StdRng> {
    let profile = fixed_profile(config.start.date(), attenuation);
    let rng = StdRng::seed_from_u64(config.seed);
    Engine::with_profile(config, rng, profile).expect("valid engine")
}
