use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::ingest::fetcher::Fetcher;
use crate::ingest::types::InputPayload;
use crate::pipeline::RiskReport;

use super::types::*;
use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: msg.into(),
        }),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rules: state.analyzer.rule_count(),
        fetcher_enabled: state.fetcher.is_some(),
        timestamp: chrono::Utc::now(),
    })
}

// ============================================================
// Analysis
// ============================================================

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InputPayload>, JsonRejection>,
) -> ApiResult<RiskReport> {
    let Json(payload) = payload.map_err(|e| api_error(e.status(), e.body_text()))?;
    Ok(Json(state.analyzer.assess(&payload)))
}

pub async fn wallet_risk(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(params): Query<ChainParams>,
) -> ApiResult<RiskReport> {
    let fetcher = state.fetcher.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Transaction fetching is not configured",
        )
    })?;

    let chain = params.chain_or_default();
    Fetcher::validate_target(&address, chain)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let payload = fetcher
        .fetch_transactions(&address, chain)
        .await
        .map_err(|e| {
            tracing::warn!(%address, error = %e, "Transaction fetch failed");
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    Ok(Json(state.analyzer.assess(&payload)))
}
