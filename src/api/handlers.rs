//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, RangeQuery, StateResponse, TelemetryQuery, TelemetryRecord};
use crate::sim::history::{DailyRecord, MonthlyMean};

fn bad_request(error: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// Returns simulation config, yield report, and latest tick.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let latest_step = state
        .results
        .len()
        .checked_sub(1)
        .map(|i| TelemetryRecord::new(i, &state.results[i]));

    Json(StateResponse {
        config: state.config.clone(),
        report: state.report.clone(),
        latest_step,
    })
}

/// Returns archived daily records, optionally filtered by date.
///
/// `GET /history` → 200 + `Vec<DailyRecord>` JSON
/// `GET /history?from=2025-01-01&to=2025-01-31` → inclusive range
/// `GET /history?from=2025-02-01&to=2025-01-01` → 400 + `ErrorResponse`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    let records = state.history.records();
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Ok(Json(Vec::<DailyRecord>::new()));
    };
    let from = query.from.unwrap_or(first.date);
    let to = query.to.unwrap_or(last.date);

    if from > to {
        return Err(bad_request(format!(
            "`from` ({from}) must be <= `to` ({to})"
        )));
    }

    Ok(Json(state.history.range(from, to).to_vec()))
}

/// Returns month-by-month mean yield and peak temperature.
///
/// `GET /history/monthly` → 200 + `Vec<MonthlyMean>` JSON
pub async fn get_monthly(State(state): State<Arc<AppState>>) -> Json<Vec<MonthlyMean>> {
    Json(state.history.monthly_means())
}

/// Returns per-tick records, optionally filtered by tick index.
///
/// `GET /telemetry` → 200 + `Vec<TelemetryRecord>` JSON
/// `GET /telemetry?from=N&to=M` → filtered range (inclusive)
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err(bad_request(format!(
            "`from` ({from}) must be <= `to` ({to})"
        )));
    }

    let records: Vec<TelemetryRecord> = state
        .results
        .iter()
        .enumerate()
        .skip(from)
        .take_while(|(i, _)| *i <= to)
        .map(|(i, s)| TelemetryRecord::new(i, s))
        .collect();

    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::sim::engine::Engine;
    use crate::sim::kpi::YieldReport;
    use crate::sim::types::SimConfig;

    fn make_test_state() -> Arc<AppState> {
        let start = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let config = SimConfig::new(start, 60, 42).unwrap().with_days(3);
        let mut engine = Engine::seeded(config.clone()).unwrap();
        let results = engine.run().unwrap();
        let history = engine.into_history();
        let report = YieldReport::from_run(&history, &results);
        Arc::new(AppState {
            config,
            report,
            history,
            results,
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn state_returns_200() {
        let (status, json) = get_json("/state").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.get("config").is_some());
        assert_eq!(json["report"]["days"], 3);
        assert_eq!(json["latest_step"]["tick"], 71);
    }

    #[tokio::test]
    async fn history_returns_all_days() {
        let (status, json) = get_json("/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(3));
        assert_eq!(json[0]["date"], "2025-01-01");
    }

    #[tokio::test]
    async fn history_date_range() {
        let (status, json) = get_json("/history?from=2025-01-02&to=2025-01-02").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["date"], "2025-01-02");
    }

    #[tokio::test]
    async fn history_invalid_range_returns_400() {
        let (status, json) = get_json("/history?from=2025-01-03&to=2025-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn monthly_means_single_month() {
        let (status, json) = get_json("/history/monthly").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["month"], 1);
        assert_eq!(json[0]["days"], 3);
    }

    #[tokio::test]
    async fn telemetry_range_query() {
        let (status, json) = get_json("/telemetry?from=5&to=10").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["tick"], 5);
        assert_eq!(rows[5]["tick"], 10);
    }

    #[tokio::test]
    async fn telemetry_invalid_range_returns_400() {
        let (status, json) = get_json("/telemetry?from=10&to=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }
}
