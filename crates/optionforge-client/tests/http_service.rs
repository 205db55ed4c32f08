//! REST 백테스트 서비스 커넥터 통합 테스트.

use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::json;

use optionforge_client::{BacktestService, HttpBacktestService, ServiceError};
use optionforge_core::{BacktestRequest, JobId, JobStatus, Leg, ServiceConfig, Side, Strategy};

fn debit_spread() -> Strategy {
    Strategy::new("Bull Call Spread")
        .with_id("7")
        .with_leg(Leg::call(Side::Buy, 1, 150.0).unwrap())
        .with_leg(Leg::call(Side::Sell, 1, 155.0).unwrap())
}

fn request(strategy: Strategy) -> BacktestRequest {
    BacktestRequest::new(
        strategy,
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
    )
    .unwrap()
}

fn service(server: &mockito::Server) -> HttpBacktestService {
    HttpBacktestService::new(ServiceConfig::new(server.url()).with_auth_token("secret-token"))
        .unwrap()
}

#[tokio::test]
async fn test_submit_posts_to_strategy_route() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/strategies/7/backtests")
        .match_header("authorization", "Bearer secret-token")
        .match_body(Matcher::PartialJson(json!({
            "start_date": "2024-01-02",
            "end_date": "2024-06-28",
            "legs": [
                {"type": "call", "action": "buy", "quantity": 1, "strike": 150.0},
                {"type": "call", "action": "sell", "quantity": 1, "strike": 155.0}
            ]
        })))
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"backtest_id": 42, "task_id": "c1d2", "status_url": "/api/backtests/42/status", "message": "Backtest submitted"}"#,
        )
        .create_async()
        .await;

    let ticket = service(&server)
        .submit_backtest(&request(debit_spread()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(ticket.job_id, JobId::new("42"));
    assert_eq!(ticket.status, JobStatus::Pending);
}

#[tokio::test]
async fn test_submit_without_strategy_id_uses_generic_route() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/backtests")
        .with_status(202)
        .with_body(r#"{"backtest_id": "bt-9"}"#)
        .create_async()
        .await;

    let strategy = Strategy::new("Long Put").with_leg(Leg::put(Side::Buy, 2, 100.0).unwrap());
    let ticket = service(&server)
        .submit_backtest(&request(strategy))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(ticket.job_id.as_str(), "bt-9");
}

#[tokio::test]
async fn test_submit_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/strategies/7/backtests")
        .with_status(401)
        .with_body(r#"{"message": "Token has expired"}"#)
        .create_async()
        .await;

    let err = service(&server)
        .submit_backtest(&request(debit_spread()))
        .await
        .unwrap_err();

    assert_eq!(err, ServiceError::Unauthorized("Token has expired".to_string()));
    assert!(err.is_auth_error());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_status_parsing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/backtests/42/status")
        .match_header("authorization", "Bearer secret-token")
        .with_status(200)
        .with_body(r#"{"status": "PROGRESS", "db_status": "RUNNING", "info": {"current": 40, "total": 100}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/backtests/43/status")
        .with_status(200)
        .with_body(r#"{"status": "FAILURE", "info": "Underlying data missing"}"#)
        .create_async()
        .await;

    let service = service(&server);

    let running = service.get_status(&JobId::new("42")).await.unwrap();
    assert_eq!(running.status, JobStatus::Running);
    assert!(running.detail.unwrap().contains("\"current\":40"));

    let failed = service.get_status(&JobId::new("43")).await.unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.detail.as_deref(), Some("Underlying data missing"));
}

#[tokio::test]
async fn test_status_server_error_is_retryable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/backtests/42/status")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let err = service(&server)
        .get_status(&JobId::new("42"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ServiceError::Api {
            status: 503,
            message: "upstream unavailable".to_string()
        }
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_result_parsing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/backtests/42/results")
        .with_status(200)
        .with_body(
            json!({
                "summary_metrics": {
                    "total_pnl": 412.5,
                    "win_rate": 0.64,
                    "profit_factor": "inf"
                },
                "daily_pnl": [
                    {"date": "2024-01-02", "pnl": 0.0},
                    {"date": "2024-01-03", "pnl": 120.0},
                    {"date": "2024-01-04", "pnl": 412.5}
                ],
                "underlying_price": [
                    {"date": "2024-01-02", "price": 151.2}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = service(&server)
        .get_result(&JobId::new("42"))
        .await
        .unwrap();

    assert_eq!(result.daily_pnl.len(), 3);
    assert_eq!(result.final_pnl(), Some(412.5));
    assert_eq!(result.metric("win_rate").and_then(|m| m.as_f64()), Some(0.64));
    assert_eq!(
        result.metric("profit_factor").map(|m| m.to_string()).as_deref(),
        Some("inf")
    );
    assert_eq!(result.underlying_price.len(), 1);
}

#[tokio::test]
async fn test_result_not_ready() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/backtests/42/results")
        .with_status(404)
        .with_body(r#"{"message": "Results not found"}"#)
        .create_async()
        .await;

    let err = service(&server)
        .get_result(&JobId::new("42"))
        .await
        .unwrap_err();

    assert!(err.is_not_ready());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/backtests/42/status")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = service(&server)
        .get_status(&JobId::new("42"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Parse(_)));
}
