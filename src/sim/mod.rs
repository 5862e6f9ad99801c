/// Daily energy integration.
pub mod accumulator;
/// Simulation clock for tick and rollover management.
pub mod clock;
pub mod engine;
/// Append-only daily history.
pub mod history;
pub mod kpi;
pub mod state;
pub mod types;
