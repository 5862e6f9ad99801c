//! Read-only REST API over a completed simulation run.
//!
//! Provides GET endpoints:
//! - `/state`: simulation config, yield report, and latest tick
//! - `/history`: archived daily records with optional date filtering
//! - `/history/monthly`: month-by-month means
//! - `/telemetry`: per-tick readings with optional index filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::sim::history::HistoryStore;
use crate::sim::kpi::YieldReport;
use crate::sim::types::{SimConfig, StepResult};

pub use types::{ErrorResponse, RangeQuery, StateResponse, TelemetryQuery, TelemetryRecord};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the simulation run completes and wrapped in
/// `Arc`; all data is read-only so no locks are needed.
pub struct AppState {
    /// Simulation configuration used for this run.
    pub config: SimConfig,
    /// Aggregate yield report.
    pub report: YieldReport,
    /// Archived daily records.
    pub history: HistoryStore,
    /// Per-tick simulation results.
    pub results: Vec<StepResult>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/history", get(handlers::get_history))
        .route("/history/monthly", get(handlers::get_monthly))
        .route("/telemetry", get(handlers::get_telemetry))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
