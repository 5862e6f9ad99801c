//! Wax-actuated solar tracker simulator.
//!
//! Reproduces, tick by tick, a passive tracker whose panel is rotated by a
//! heat-expanding wax linkage, under synthetic tropical weather, and
//! accumulates daily and yearly energy statistics.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod io;
/// Weather profiles, tracker physics, and the health overlay.
pub mod model;
/// Simulation clock, engine, history, and KPI modules.
pub mod sim;

pub use error::SimError;
