pub mod handlers;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ingest::fetcher::Fetcher;
use crate::pipeline::RiskAnalyzer;

pub struct AppState {
    pub analyzer: Arc<RiskAnalyzer>,
    pub fetcher: Option<Fetcher>,
}

pub fn router(analyzer: Arc<RiskAnalyzer>, fetcher: Option<Fetcher>) -> Router {
    let state = Arc::new(AppState { analyzer, fetcher });

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/analyze", post(handlers::analyze))
        .route(
            "/api/v1/wallet/{address}/risk",
            get(handlers::wallet_risk),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(
    analyzer: Arc<RiskAnalyzer>,
    fetcher: Option<Fetcher>,
    host: &str,
    port: u16,
) -> eyre::Result<()> {
    let app = router(analyzer, fetcher);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, stopping API server"),
        Err(e) => {
            // Without a handler the server runs until the process is killed.
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FetcherConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::types::{ErrorResponse, HealthResponse};
    use crate::pipeline::RiskReport;

    fn app() -> Router {
        router(Arc::new(RiskAnalyzer::new(&Config::default())), None)
    }

    fn app_with_fetcher() -> Router {
        // Unroutable explorer: lookups that reach the network would fail with 502.
        let fetcher = Fetcher::new(FetcherConfig {
            api_url: "http://127.0.0.1:9/api".to_string(),
            api_key: Some("test_key".to_string()),
            timeout_secs: 1,
            ..FetcherConfig::default()
        })
        .unwrap();
        router(Arc::new(RiskAnalyzer::new(&Config::default())), Some(fetcher))
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = body_json(response).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.rules, 3);
        assert!(!health.fetcher_enabled);
    }

    #[tokio::test]
    async fn test_analyze_payload() {
        let txs: Vec<_> = (0..6)
            .map(|i| {
                serde_json::json!({
                    "hash": format!("0x{}", i),
                    "from": "0xa",
                    "to": "0xb",
                    "value": "0",
                    "gas_used": 21000,
                    "timestamp": i * 3600,
                    "method": "mint"
                })
            })
            .collect();
        let body = serde_json::json!({
            "entity_type": "contract",
            "entity_id": "0xa",
            "chain": "polygon",
            "transactions": txs
        });

        let response = app()
            .oneshot(
                Request::post("/api/v1/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report: RiskReport = body_json(response).await;
        assert_eq!(report.entity_id, "0xa");
        // wash trading (60) + repeated calls (10)
        assert_eq!(report.risk_score, 70);
        let ids: Vec<_> = report.findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["WASH_TRADING_SUSPECT", "REPEATED_CONTRACT_CALLS"]);
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_entity_type() {
        let body = r#"{"entity_type": "exchange", "entity_id": "0xa", "chain": "polygon", "transactions": []}"#;
        let response = app()
            .oneshot(
                Request::post("/api/v1/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        let err: ErrorResponse = body_json(response).await;
        assert!(!err.error.is_empty());
    }

    #[tokio::test]
    async fn test_wallet_risk_without_fetcher() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/wallet/0x1234567890abcdef1234567890abcdef12345678/risk")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_wallet_risk_rejects_invalid_address() {
        let response = app_with_fetcher()
            .oneshot(Request::get("/api/v1/wallet/0x123/risk").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = body_json(response).await;
        assert!(err.error.contains("Invalid address"));
    }

    #[tokio::test]
    async fn test_wallet_risk_rejects_unsupported_chain() {
        let response = app_with_fetcher()
            .oneshot(
                Request::get(
                    "/api/v1/wallet/0x1234567890abcdef1234567890abcdef12345678/risk?chain=ethereum",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = body_json(response).await;
        assert!(err.error.contains("Unsupported chain"));
    }

    #[tokio::test]
    async fn test_wallet_risk_upstream_failure_is_bad_gateway() {
        let response = app_with_fetcher()
            .oneshot(
                Request::get("/api/v1/wallet/0x1234567890abcdef1234567890abcdef12345678/risk")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
