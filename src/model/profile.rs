//! Per-day weather and daylight profile generation.
//!
//! A profile is drawn once per simulated calendar day. The season fixes the
//! bounds (base peak temperature, nominal sunrise and sunset, how likely each
//! weather condition is); the random source picks values inside them.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Minimum margin between a day's peak temperature and the night baseline (°C).
const MIN_DAY_WARMING_C: f32 = 1.0;

/// Closed set of weather conditions a day can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    Clear,
    Sunny,
    Heatwave,
    Cloudy,
    Overcast,
    Rainy,
}

impl Condition {
    /// Every condition, in table order.
    pub const ALL: [Condition; 6] = [
        Condition::Clear,
        Condition::Sunny,
        Condition::Heatwave,
        Condition::Cloudy,
        Condition::Overcast,
        Condition::Rainy,
    ];

    /// Inclusive range the sun attenuation factor is drawn from.
    pub fn attenuation_range(self) -> (f32, f32) {
        match self {
            Condition::Clear => (0.95, 1.0),
            Condition::Sunny => (0.80, 0.95),
            Condition::Heatwave => (0.90, 1.0),
            Condition::Cloudy => (0.40, 0.70),
            Condition::Overcast => (0.20, 0.40),
            Condition::Rainy => (0.05, 0.20),
        }
    }

    /// Offset added to the seasonal base peak temperature (°C).
    pub fn temp_offset_c(self) -> f32 {
        match self {
            Condition::Clear => 1.0,
            Condition::Sunny => 0.0,
            Condition::Heatwave => 5.0,
            Condition::Cloudy => -3.0,
            Condition::Overcast => -5.0,
            Condition::Rainy => -8.0,
        }
    }

    /// Stable label used in exports.
    pub fn label(self) -> &'static str {
        match self {
            Condition::Clear => "Clear",
            Condition::Sunny => "Sunny",
            Condition::Heatwave => "Heatwave",
            Condition::Cloudy => "Cloudy",
            Condition::Overcast => "Overcast",
            Condition::Rainy => "Rainy",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weather and daylight parameters for one simulated day.
///
/// Immutable once built; the engine replaces it wholesale at rollover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayProfile {
    date: NaiveDate,
    sunrise_hour: f32,
    sunset_hour: f32,
    peak_temperature_c: f32,
    sun_attenuation_factor: f32,
    condition: Condition,
}

impl DayProfile {
    /// Builds a profile after checking the daylight window and attenuation range.
    ///
    /// # Errors
    ///
    /// * [`SimError::InvalidDaylightWindow`] unless `0 <= sunrise < sunset < 24`
    /// * [`SimError::InvalidAttenuation`] unless the factor lies in `[0, 1]`
    pub fn new(
        date: NaiveDate,
        sunrise_hour: f32,
        sunset_hour: f32,
        peak_temperature_c: f32,
        sun_attenuation_factor: f32,
        condition: Condition,
    ) -> Result<Self, SimError> {
        let window_ok = sunrise_hour >= 0.0 && sunset_hour > sunrise_hour && sunset_hour < 24.0;
        if !window_ok {
            return Err(SimError::InvalidDaylightWindow {
                sunrise_hour,
                sunset_hour,
            });
        }
        if !(0.0..=1.0).contains(&sun_attenuation_factor) {
            return Err(SimError::InvalidAttenuation(sun_attenuation_factor));
        }

        Ok(Self {
            date,
            sunrise_hour,
            sunset_hour,
            peak_temperature_c,
            sun_attenuation_factor,
            condition,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sunrise_hour(&self) -> f32 {
        self.sunrise_hour
    }

    pub fn sunset_hour(&self) -> f32 {
        self.sunset_hour
    }

    pub fn peak_temperature_c(&self) -> f32 {
        self.peak_temperature_c
    }

    pub fn sun_attenuation_factor(&self) -> f32 {
        self.sun_attenuation_factor
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Length of the daylight window in hours (always > 0).
    pub fn daylight_hours(&self) -> f32 {
        self.sunset_hour - self.sunrise_hour
    }
}

/// Climatic season, derived from the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    /// March to June.
    Summer,
    /// July to September.
    Monsoon,
    /// October and November.
    PostMonsoon,
    /// December to February.
    Winter,
}

/// Seasonal bounds the generator draws within.
#[derive(Debug, Clone, Copy)]
pub struct SeasonalClimate {
    /// Inclusive range of the base peak temperature (°C).
    pub peak_temp_range_c: (f32, f32),
    /// Nominal sunrise (fractional hour).
    pub sunrise_hour: f32,
    /// Nominal sunset (fractional hour).
    pub sunset_hour: f32,
    /// Relative likelihood of each condition.
    pub condition_weights: [(Condition, u32); 6],
}

impl Season {
    /// Maps a calendar month (1-12) to its season.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=6 => Season::Summer,
            7..=9 => Season::Monsoon,
            10 | 11 => Season::PostMonsoon,
            _ => Season::Winter,
        }
    }

    pub fn climate(self) -> SeasonalClimate {
        use Condition::*;

        match self {
            Season::Summer => SeasonalClimate {
                peak_temp_range_c: (34.0, 42.0),
                sunrise_hour: 5.75,
                sunset_hour: 18.75,
                condition_weights: [
                    (Clear, 25),
                    (Sunny, 40),
                    (Heatwave, 20),
                    (Cloudy, 10),
                    (Overcast, 4),
                    (Rainy, 1),
                ],
            },
            Season::Monsoon => SeasonalClimate {
                peak_temp_range_c: (29.0, 34.0),
                sunrise_hour: 6.0,
                sunset_hour: 18.5,
                condition_weights: [
                    (Clear, 5),
                    (Sunny, 15),
                    (Heatwave, 0),
                    (Cloudy, 25),
                    (Overcast, 25),
                    (Rainy, 30),
                ],
            },
            Season::PostMonsoon => SeasonalClimate {
                peak_temp_range_c: (27.0, 32.0),
                sunrise_hour: 6.25,
                sunset_hour: 17.75,
                condition_weights: [
                    (Clear, 20),
                    (Sunny, 40),
                    (Heatwave, 0),
                    (Cloudy, 25),
                    (Overcast, 10),
                    (Rainy, 5),
                ],
            },
            Season::Winter => SeasonalClimate {
                peak_temp_range_c: (20.0, 26.0),
                sunrise_hour: 6.75,
                sunset_hour: 17.5,
                condition_weights: [
                    (Clear, 30),
                    (Sunny, 35),
                    (Heatwave, 0),
                    (Cloudy, 20),
                    (Overcast, 12),
                    (Rainy, 3),
                ],
            },
        }
    }
}

/// Draws one randomized-but-bounded [`DayProfile`] per calendar day.
///
/// Holds only constants; all randomness comes from the caller's RNG so runs
/// are reproducible under a seeded generator.
#[derive(Debug, Clone)]
pub struct DayProfileGenerator {
    night_temp_c: f32,
    daylight_jitter_h: f32,
}

impl DayProfileGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    ///
    /// * `night_temp_c` - Night baseline; peak temperatures never fall below it
    /// * `daylight_jitter_h` - Half-width of the uniform jitter applied to sunrise and sunset
    pub fn new(night_temp_c: f32, daylight_jitter_h: f32) -> Self {
        Self {
            night_temp_c,
            daylight_jitter_h: daylight_jitter_h.max(0.0),
        }
    }

    /// Generates the profile for `date`.
    ///
    /// # Panics
    ///
    /// Panics if the drawn values violate the [`DayProfile`] invariants, which
    /// would mean the seasonal table or jitter bounds are broken.
    pub fn generate<R: Rng + ?Sized>(&self, date: NaiveDate, rng: &mut R) -> DayProfile {
        let climate = Season::from_month(date.month()).climate();
        let condition = draw_condition(&climate.condition_weights, rng);

        let (att_lo, att_hi) = condition.attenuation_range();
        let attenuation = rng.random_range(att_lo..=att_hi);

        let (t_lo, t_hi) = climate.peak_temp_range_c;
        let peak = (rng.random_range(t_lo..=t_hi) + condition.temp_offset_c())
            .max(self.night_temp_c + MIN_DAY_WARMING_C);

        let sunrise = climate.sunrise_hour + self.jitter(rng);
        let sunset = climate.sunset_hour + self.jitter(rng);

        DayProfile::new(date, sunrise, sunset, peak, attenuation, condition)
            .unwrap_or_else(|e| panic!("generated profile for {date} is invalid: {e}"))
    }

    fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.daylight_jitter_h > 0.0 {
            rng.random_range(-self.daylight_jitter_h..=self.daylight_jitter_h)
        } else {
            0.0
        }
    }
}

/// Weighted pick over integer weights; falls back to `Sunny` if all weights are zero.
fn draw_condition<R: Rng + ?Sized>(weights: &[(Condition, u32)], rng: &mut R) -> Condition {
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return Condition::Sunny;
    }

    let mut roll = rng.random_range(0..total);
    for &(condition, weight) in weights {
        if roll < weight {
            return condition;
        }
        roll -= weight;
    }
    Condition::Sunny
}
