//! Simulation engine that advances the clock and wires the models together.

use chrono::NaiveDate;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use super::clock::{DaylightPhase, RolloverEvent, SimulationClock};
use super::history::{DailyRecord, HistoryStore};
use super::state::{PowerPoint, SimulationState};
use super::types::{SimConfig, StepResult};
use crate::error::SimError;
use crate::model::{DayProfile, DayProfileGenerator, HealthMonitor, HealthStatus, TelemetryModel};

/// Upper bound on the result buffer reserved up front by [`Engine::run`].
const MAX_PREALLOCATED_TICKS: usize = 1 << 16;

/// Simulation engine owning the state, history, models and random source.
///
/// Generic over `R: Rng` so tests and callers can inject any seedable
/// generator; [`Engine::seeded`] builds a `StdRng` from the configured seed.
pub struct Engine<R: Rng = StdRng> {
    config: SimConfig,
    model: TelemetryModel,
    generator: DayProfileGenerator,
    monitor: HealthMonitor,
    state: SimulationState,
    history: HistoryStore,
    rng: R,
    complete: bool,
    /// Last date a jam warning was logged for.
    jam_logged_on: Option<NaiveDate>,
}

impl Engine<StdRng> {
    /// Creates an engine whose random source is seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns the configuration error found by [`SimConfig::validate`].
    pub fn seeded(config: SimConfig) -> Result<Self, SimError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Engine<R> {
    /// Creates an engine drawing every profile from `rng`.
    ///
    /// # Errors
    ///
    /// Returns the configuration error found by [`SimConfig::validate`].
    pub fn with_rng(config: SimConfig, mut rng: R) -> Result<Self, SimError> {
        config.validate()?;
        let generator =
            DayProfileGenerator::new(config.tracker.night_temp_c, config.daylight_jitter_h);
        let first = generator.generate(config.start.date(), &mut rng);
        Self::build(config, rng, generator, first)
    }

    /// Creates an engine whose first day uses `profile` instead of a drawn one.
    ///
    /// Later days are still drawn from `rng`.
    ///
    /// # Errors
    ///
    /// Returns the configuration error found by [`SimConfig::validate`], or
    /// [`SimError::ProfileDateMismatch`] if `profile` is not for the start date.
    pub fn with_profile(config: SimConfig, rng: R, profile: DayProfile) -> Result<Self, SimError> {
        if profile.date() != config.start.date() {
            return Err(SimError::ProfileDateMismatch {
                expected: config.start.date(),
                found: profile.date(),
            });
        }
        let generator =
            DayProfileGenerator::new(config.tracker.night_temp_c, config.daylight_jitter_h);
        Self::build(config, rng, generator, profile)
    }

    fn build(
        config: SimConfig,
        rng: R,
        generator: DayProfileGenerator,
        profile: DayProfile,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let clock = SimulationClock::new(config.start, config.tick_minutes, config.horizon)?;
        debug!(
            date = %profile.date(),
            condition = %profile.condition(),
            attenuation = profile.sun_attenuation_factor(),
            "initial profile"
        );

        Ok(Self {
            model: TelemetryModel::new(config.tracker.clone()),
            monitor: HealthMonitor::new(config.health.clone()),
            state: SimulationState::new(clock, profile, config.buffer_policy),
            history: HistoryStore::new(),
            generator,
            rng,
            config,
            complete: false,
            jam_logged_on: None,
        })
    }

    /// Executes one tick and returns its result.
    ///
    /// # Returns
    ///
    /// * `Some(result)` - Reading, health, energy and any archived day
    /// * `None` - Once the horizon has been reached; further calls are no-ops
    pub fn advance_tick(&mut self) -> Option<StepResult> {
        let tick = self.state.clock.tick()?;

        // 1. Physics and diagnostics
        let reading = self.model.compute(tick.at, &self.state.active_profile);
        let health = self.monitor.assess(&reading, &mut self.rng);
        if health.status == HealthStatus::JamDetected && self.jam_logged_on != Some(tick.at.date())
        {
            warn!(
                at = %tick.at,
                deviation_deg = health.deviation_deg,
                "mechanical jam detected"
            );
            self.jam_logged_on = Some(tick.at.date());
        }

        // 2. Daylight phase
        if let Some(phase) = self.state.clock.observe_daylight(reading.is_daylight) {
            debug!(at = %tick.at, %phase, "daylight phase changed");
        }
        let phase = DaylightPhase::from_daylight(reading.is_daylight);

        // 3. Energy and live series
        let energy_delta_wh = self.state.accumulator.integrate(reading.power_w);
        self.state.accumulator.observe_ambient(reading.ambient_temp_c);
        let energy_today_wh = self.state.accumulator.energy_today_wh();
        self.state.live_buffer.push(PowerPoint {
            time: tick.at,
            power_w: reading.power_w,
        });

        // 4. Day boundary
        let rollover = tick.rollover.map(|event| self.roll_over(event));

        Some(StepResult {
            reading,
            health,
            phase,
            energy_delta_wh,
            energy_today_wh,
            rollover,
        })
    }

    /// Archives the closing day and installs the next profile.
    fn roll_over(&mut self, event: RolloverEvent) -> DailyRecord {
        let profile = &self.state.active_profile;
        let record = self.state.accumulator.finalize(
            event.closed_date,
            profile.condition(),
            profile.peak_temperature_c(),
        );
        info!(
            date = %record.date,
            condition = %record.condition,
            peak_temp_c = record.peak_temp_c,
            yield_wh = record.yield_wh,
            "day archived"
        );

        self.history.push(record.clone());
        self.state.day_count += 1;
        self.state.live_buffer.on_rollover();

        if event.horizon_reached {
            self.complete = true;
            info!(
                days = self.state.day_count,
                total_wh = self.history.total_energy_wh(),
                "simulation complete"
            );
        } else {
            let next = self.generator.generate(event.opened_date, &mut self.rng);
            debug!(
                date = %next.date(),
                condition = %next.condition(),
                attenuation = next.sun_attenuation_factor(),
                peak_temp_c = next.peak_temperature_c(),
                "profile generated"
            );
            self.state.active_profile = next;
        }

        record
    }

    /// Executes up to `n` ticks, stopping early at the horizon.
    pub fn run_ticks(&mut self, n: usize) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(n.min(MAX_PREALLOCATED_TICKS));
        for _ in 0..n {
            match self.advance_tick() {
                Some(result) => results.push(result),
                None => break,
            }
        }
        results
    }

    /// Executes every remaining tick up to the horizon.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnboundedRun`] if no horizon is configured.
    pub fn run(&mut self) -> Result<Vec<StepResult>, SimError> {
        let days = self.config.horizon_days().ok_or(SimError::UnboundedRun)?;
        let mut results =
            Vec::with_capacity(preallocated_ticks(days, self.config.ticks_per_day()));
        while let Some(result) = self.advance_tick() {
            results.push(result);
        }
        Ok(results)
    }

    /// `true` once the horizon day has been archived.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Consumes the engine, keeping only the archived history.
    pub fn into_history(self) -> HistoryStore {
        self.history
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn model(&self) -> &TelemetryModel {
        &self.model
    }
}

fn preallocated_ticks(days: u32, ticks_per_day: u32) -> usize {
    (days as usize)
        .saturating_mul(ticks_per_day as usize)
        .min(MAX_PREALLOCATED_TICKS)
}
