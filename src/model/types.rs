//! Shared helpers for the physical models.

use chrono::{NaiveDateTime, Timelike};
use rand::Rng;

/// Reference clear-sky irradiance at full intensity (W/m²).
pub const REFERENCE_IRRADIANCE_WM2: f32 = 1000.0;

/// Fractional hour of day for a timestamp: `hour + minute / 60`.
///
/// Seconds are ignored; ticks always land on whole minutes.
pub fn hour_of_day(timestamp: NaiveDateTime) -> f32 {
    timestamp.hour() as f32 + timestamp.minute() as f32 / 60.0
}

/// Utility function to generate Gaussian noise using Box-Muller transform.
///
/// # Arguments
///
/// * `rng` - Random number generator
/// * `std_dev` - Standard deviation of the noise
///
/// # Returns
///
/// Random value from a Gaussian distribution with mean 0 and specified standard deviation
pub fn gaussian_noise<R: Rng + ?Sized>(rng: &mut R, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}
