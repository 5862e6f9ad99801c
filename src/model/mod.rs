//! Physical models: daily weather profiles, the wax actuator, panel output, and diagnostics.

/// Wax actuator deadband and ramp.
pub mod actuator;
pub mod health;
/// Panel output with cosine loss.
pub mod panel;
/// Seasonal day profile generation.
pub mod profile;
pub mod telemetry;
pub mod types;

pub use actuator::WaxActuator;
pub use health::{
    HealthMonitor, HealthParams, HealthReport, HealthStatus, JamInjection, RainInjection,
};
pub use panel::Panel;
pub use profile::{Condition, DayProfile, DayProfileGenerator, Season};
pub use telemetry::{TelemetryModel, TelemetryReading, TrackerParams};
