/// CSV writers for history and telemetry.
pub mod export;
