//! Integration tests for the tick engine: rollover, energy, and determinism.

mod common;

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, TimeDelta};

use wax_tracker_sim::SimError;
use wax_tracker_sim::config::ScenarioConfig;
use wax_tracker_sim::model::{HealthStatus, RainInjection, TelemetryReading};
use wax_tracker_sim::sim::clock::DaylightPhase;
use wax_tracker_sim::sim::engine::Engine;
use wax_tracker_sim::sim::state::BufferPolicy;

#[test]
fn ninety_six_half_hour_ticks_archive_two_days() {
    let mut engine = Engine::seeded(common::open_config(30, 42)).unwrap();
    assert_eq!(engine.state().day_count(), 0);

    let results = engine.run_ticks(96);

    assert_eq!(results.len(), 96);
    assert_eq!(engine.state().day_count(), 2);
    assert_eq!(engine.history().len(), 2);
    assert_eq!(engine.state().current_time(), common::midnight(2025, 1, 3));

    let rollovers: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.rollover.is_some())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(rollovers, vec![47, 95]);
}

#[test]
fn history_grows_by_one_per_rollover_and_never_mutates() {
    let mut engine = Engine::seeded(common::open_config(60, 3)).unwrap();
    let mut archived = Vec::new();

    for _ in 0..(24 * 10) {
        let before = engine.history().len();
        let step = engine.advance_tick().unwrap();
        match step.rollover {
            Some(record) => {
                assert_eq!(engine.history().len(), before + 1);
                archived.push(record);
            }
            None => assert_eq!(engine.history().len(), before),
        }
        assert_eq!(engine.history().records(), archived.as_slice());
    }
    assert_eq!(archived.len(), 10);
}

#[test]
fn same_seed_same_run() {
    let run = |seed| {
        let config = common::bounded_config(common::midnight(2025, 3, 1), 30, 20, seed);
        let mut engine = Engine::seeded(config).unwrap();
        let readings: Vec<TelemetryReading> = engine
            .run()
            .unwrap()
            .into_iter()
            .map(|r| r.reading)
            .collect();
        (readings, engine.into_history())
    };

    let (readings_a, history_a) = run(7);
    let (readings_b, history_b) = run(7);
    assert_eq!(readings_a, readings_b);
    assert_eq!(history_a, history_b);

    let (_, history_c) = run(8);
    assert_ne!(history_a, history_c);
}

#[test]
fn daily_yield_equals_sum_of_tick_deltas() {
    let config = common::bounded_config(common::midnight(2025, 5, 1), 15, 5, 11);
    let mut engine = Engine::seeded(config).unwrap();
    let results = engine.run().unwrap();

    let mut per_day: BTreeMap<NaiveDate, f32> = BTreeMap::new();
    for r in &results {
        *per_day.entry(r.reading.timestamp.date()).or_insert(0.0) += r.energy_delta_wh;
    }

    let history = engine.history();
    assert_eq!(history.len(), per_day.len());
    for record in history.records() {
        let summed = per_day[&record.date];
        assert!(
            (record.yield_wh - summed).abs() < 1e-2,
            "{}: yield {} != summed {}",
            record.date,
            record.yield_wh,
            summed
        );
        assert!(record.yield_wh >= 0.0);
    }
}

#[test]
fn energy_today_resets_after_archiving() {
    let mut engine = Engine::seeded(common::open_config(30, 5)).unwrap();
    let results = engine.run_ticks(49);

    let closing = &results[47];
    let record = closing.rollover.as_ref().unwrap();
    assert_eq!(closing.energy_today_wh, record.yield_wh);
    assert_eq!(engine.state().energy_today_wh(), results[48].energy_today_wh);
    assert_eq!(results[48].energy_today_wh, 0.0, "00:00 tick is night");
}

#[test]
fn physical_bounds_hold_for_a_month() {
    let config = common::bounded_config(common::midnight(2025, 6, 1), 30, 30, 99);
    let max = config.tracker.max_rotation_deg;
    let capacity = config.tracker.panel_capacity_w;
    let mut engine = Engine::seeded(config).unwrap();

    for r in engine.run().unwrap() {
        let t = &r.reading;
        assert_eq!(r.phase, DaylightPhase::from_daylight(t.is_daylight));
        if t.is_daylight {
            assert!((0.0..=1000.0).contains(&t.irradiance_wm2));
            assert!((-90.0..=90.0).contains(&t.sun_angle_deg));
            assert!((-max..=max).contains(&t.panel_angle_deg));
            assert!((0.0..=capacity).contains(&t.power_w));
            assert_ne!(r.health.status, HealthStatus::Sleep);
        } else {
            assert_eq!(t.power_w, 0.0);
            assert_eq!(t.irradiance_wm2, 0.0);
            assert_eq!(t.panel_angle_deg, -max);
            assert_eq!(r.health.status, HealthStatus::Sleep);
        }
    }
}

#[test]
fn clear_noon_points_panel_at_zenith() {
    let config = common::bounded_config(common::midnight(2025, 6, 1), 30, 1, 1);
    let mut engine = common::fixed_engine(config, 1.0);
    let results = engine.run().unwrap();

    let noon = results
        .iter()
        .find(|r| r.reading.timestamp.time() == NaiveTime::from_hms_opt(12, 0, 0).unwrap())
        .unwrap();
    let t = &noon.reading;
    assert!(t.is_daylight);
    assert!(t.sun_angle_deg.abs() < 1e-4);
    assert!((t.irradiance_wm2 - 1000.0).abs() < 1e-2);
    assert!(t.panel_angle_deg.abs() < 1e-3);
    assert!((t.power_w - 250.0).abs() < 0.1);
}

#[test]
fn fully_attenuated_day_yields_nothing() {
    let config = common::bounded_config(common::midnight(2025, 8, 15), 10, 1, 4);
    let mut engine = common::fixed_engine(config, 0.0);
    engine.run().unwrap();

    let records = engine.history().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].yield_wh, 0.0);
}

#[test]
fn recorded_peak_is_running_max_of_ambient() {
    let config = common::bounded_config(common::midnight(2025, 10, 1), 20, 3, 21);
    let mut engine = Engine::seeded(config).unwrap();
    let results = engine.run().unwrap();

    for record in engine.history().records() {
        let max_ambient = results
            .iter()
            .filter(|r| r.reading.timestamp.date() == record.date)
            .map(|r| r.reading.ambient_temp_c)
            .fold(f32::MIN, f32::max);
        assert_eq!(record.peak_temp_c, max_ambient);
    }
}

#[test]
fn horizon_is_terminal() {
    let config = common::bounded_config(common::midnight(2025, 2, 27), 60, 2, 0);
    let mut engine = Engine::seeded(config).unwrap();

    let results = engine.run().unwrap();
    assert_eq!(results.len(), 48);
    assert!(engine.is_complete());
    assert_eq!(engine.history().len(), 2);
    assert_eq!(
        engine.history().last().map(|r| r.date),
        NaiveDate::from_ymd_opt(2025, 2, 28)
    );

    for _ in 0..5 {
        assert!(engine.advance_tick().is_none());
    }
    assert!(engine.run_ticks(10).is_empty());
    assert_eq!(engine.history().len(), 2);
    assert_eq!(engine.state().day_count(), 2);
}

#[test]
fn run_without_horizon_is_rejected() {
    let mut engine = Engine::seeded(common::open_config(30, 0)).unwrap();
    assert_eq!(engine.run().err(), Some(SimError::UnboundedRun));
}

#[test]
fn mid_day_start_archives_partial_first_day() {
    let start = common::midnight(2025, 4, 1) + TimeDelta::hours(12);
    let config = common::bounded_config(start, 60, 2, 17);
    let mut engine = Engine::seeded(config).unwrap();

    let results = engine.run().unwrap();
    assert_eq!(results.len(), 12 + 24);
    assert_eq!(results[11].rollover.as_ref().map(|r| r.date), Some(start.date()));
    assert_eq!(engine.history().len(), 2);
}

#[test]
fn misaligned_start_is_rejected() {
    let start = common::midnight(2025, 1, 1) + TimeDelta::minutes(20);
    let mut config = common::open_config(30, 0);
    config.start = start;
    assert!(matches!(
        Engine::seeded(config),
        Err(SimError::MisalignedStart { .. })
    ));
}

#[test]
fn daily_buffer_holds_the_current_day_only() {
    let mut engine = Engine::seeded(common::open_config(30, 8)).unwrap();
    assert_eq!(engine.state().live_buffer().policy(), BufferPolicy::Daily);

    engine.run_ticks(30);
    assert_eq!(engine.state().live_buffer().len(), 30);

    engine.run_ticks(18);
    assert!(engine.state().live_buffer().is_empty());

    engine.run_ticks(1);
    let latest = engine.state().live_buffer().latest().unwrap();
    assert_eq!(latest.time, common::midnight(2025, 1, 2));
}

#[test]
fn rolling_buffer_spans_days() {
    let mut config = common::open_config(30, 8);
    config.buffer_policy = BufferPolicy::Rolling { capacity: 72 };
    let mut engine = Engine::seeded(config).unwrap();

    engine.run_ticks(100);
    let buffer = engine.state().live_buffer();
    assert_eq!(buffer.len(), 72);
    let first = buffer.iter().next().unwrap();
    assert_eq!(first.time, common::midnight(2025, 1, 1) + TimeDelta::minutes(30 * 28));
}

#[test]
fn jam_shows_only_in_the_health_overlay() {
    let jammed = ScenarioConfig::jammed_day().to_sim_config().unwrap();
    let mut healthy = jammed.clone();
    healthy.health.jam = None;

    let jam_start = jammed.health.jam.as_ref().unwrap().start;
    let jammed_results = Engine::seeded(jammed).unwrap().run().unwrap();
    let healthy_results = Engine::seeded(healthy).unwrap().run().unwrap();
    assert_eq!(jammed_results.len(), healthy_results.len());

    let mut jam_ticks = 0;
    for (j, h) in jammed_results.iter().zip(&healthy_results) {
        assert_eq!(j.reading, h.reading);
        assert_eq!(j.energy_today_wh, h.energy_today_wh);

        let t = &j.reading;
        if t.timestamp < jam_start {
            assert_ne!(j.health.status, HealthStatus::JamDetected);
        } else if t.is_daylight {
            assert_eq!(j.health.status, HealthStatus::JamDetected);
            assert_eq!(j.health.sensor_angle_deg, 30.0);
            jam_ticks += 1;
        }
    }
    assert!(jam_ticks > 0);
}

#[test]
fn oversized_jitter_is_rejected_before_the_first_tick() {
    let mut config = common::bounded_config(common::midnight(2025, 1, 1), 30, 365, 0);
    config.daylight_jitter_h = 6.0;
    assert!(matches!(
        Engine::seeded(config),
        Err(SimError::InvalidJitter { .. })
    ));
}

#[test]
fn injected_profile_must_match_start_date() {
    let config = common::bounded_config(common::midnight(2025, 6, 1), 30, 1, 1);
    let profile = common::fixed_profile(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(), 1.0);
    let rng = rand::SeedableRng::seed_from_u64(1);
    let result: Result<Engine, _> = Engine::with_profile(config, rng, profile);
    assert_eq!(
        result.err(),
        Some(SimError::ProfileDateMismatch {
            expected: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            found: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        })
    );
}

#[test]
fn rain_window_only_relabels_health() {
    let day = common::midnight(2025, 4, 10);
    let dry = common::bounded_config(day, 30, 1, 13);
    let mut wet = dry.clone();
    wet.health.rain = Some(RainInjection {
        start: day + TimeDelta::hours(14),
        end: day + TimeDelta::hours(15),
    });
    let window = wet.health.rain.clone().unwrap();

    let dry_results = Engine::seeded(dry).unwrap().run().unwrap();
    let wet_results = Engine::seeded(wet).unwrap().run().unwrap();

    let mut rain_ticks = 0;
    for (d, w) in dry_results.iter().zip(&wet_results) {
        assert_eq!(d.reading, w.reading);
        assert_eq!(d.energy_today_wh, w.energy_today_wh);
        assert_eq!(d.health.sensor_angle_deg, w.health.sensor_angle_deg);
        if w.reading.is_daylight && window.covers(w.reading.timestamp) {
            assert_eq!(w.health.status, HealthStatus::RainMode);
            rain_ticks += 1;
        } else {
            assert_eq!(d.health.status, w.health.status);
        }
    }
    assert_eq!(rain_ticks, 2);
}
