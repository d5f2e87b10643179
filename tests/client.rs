use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde_json::{Value, json};
use smart_money_sdk::{
    Cell, Client, ClientConfig, SchemaKind,
    cache::{Fingerprint, QueryCache, Refresh},
    client::{endpoint_path, path},
    error::{ApiError, ConfigError},
    types::{Pagination, Query, SmartMoneyParameters},
};
use tokio_test::{assert_err, assert_ok};

/// Serves `router` on an ephemeral local port and returns a client for it.
async fn mock_upstream(router: Router) -> Client {
    mock_upstream_with_timeout(router, Duration::from_secs(5)).await
}

async fn mock_upstream_with_timeout(router: Router, timeout: Duration) -> Client {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = ClientConfig::new("test-key")
        .unwrap()
        .with_base_url(&format!("http://{addr}/api/beta"))
        .unwrap()
        .with_candles_path("/tgm/candles")
        .with_timeout(timeout);
    Client::new(config).unwrap()
}

fn query() -> Query<SmartMoneyParameters> {
    Query::new(SmartMoneyParameters::default(), Pagination::first(10))
}

#[tokio::test]
async fn test_data_envelope() {
    let router = Router::new().route(
        "/api/beta/smart-money/inflows",
        post(|| async { Json(json!({"data": [{"a": 1}, {"a": 2}]})) }),
    );
    let client = mock_upstream(router).await;

    let records = assert_ok!(client.smart_money_inflows(&query()).await);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["a"], json!(1));
}

#[tokio::test]
async fn test_bare_array() {
    let router = Router::new().route(
        "/api/beta/token-screener",
        post(|| async { Json(json!([{"tokenSymbol": "AAA"}, 3, {"tokenSymbol": "BBB"}])) }),
    );
    let client = mock_upstream(router).await;

    let records = assert_ok!(client.token_screener(&query()).await);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["tokenSymbol"], json!("BBB"));
}

#[tokio::test]
async fn test_unknown_envelope_is_empty() {
    let router = Router::new()
        .route(
            "/api/beta/smart-money/holdings",
            post(|| async { Json(json!({"status": "ok"})) }),
        )
        .route("/api/beta/smart-money/netflow", post(|| async { "<html>maintenance</html>" }));
    let client = mock_upstream(router).await;

    assert!(assert_ok!(client.smart_money_holdings(&query()).await).is_empty());
    assert!(assert_ok!(client.smart_money_netflow(&query()).await).is_empty());
}

#[tokio::test]
async fn test_error_status() {
    let router = Router::new().route(
        "/api/beta/smart-money/dex-trades",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let client = mock_upstream(router).await;

    let err = assert_err!(client.smart_money_dex_trades(&query()).await);
    assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    match err {
        ApiError::Status { body, .. } => assert_eq!(body, "upstream exploded"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout() {
    let router = Router::new().route(
        "/api/beta/smart-money/dcas",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!([]))
        }),
    );
    let client = mock_upstream_with_timeout(router, Duration::from_millis(100)).await;

    let err = assert_err!(client.smart_money_dca_events(&query()).await);
    assert!(matches!(err, ApiError::Timeout), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_request_headers_and_payload() {
    let router = Router::new().route(
        "/api/beta/tgm/flows",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let key = headers
                .get("apikey")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({"data": [{"apikey": key, "body": body}]}))
        }),
    );
    let client = mock_upstream(router).await;

    let records = assert_ok!(client.token_flows(&query()).await);
    assert_eq!(records[0]["apikey"], json!("test-key"));
    assert_eq!(
        records[0]["body"]["pagination"],
        json!({"page": 1, "recordsPerPage": 10})
    );
    assert_eq!(records[0]["body"]["parameters"]["chains"], json!(["ethereum", "solana"]));
}

#[tokio::test]
async fn test_fetch_normalizes() {
    let router = Router::new().route(
        path_of(path::SMART_MONEY_HOLDINGS).as_str(),
        post(|| async {
            Json(json!({"data": [{
                "symbol": "AAA",
                "balanceUsd": "1,000",
                "balancePctChange24h": 12.5,
                "sectors": ["DeFi", "AI"],
                "tokenAgeDays": 5
            }]}))
        }),
    );
    let client = mock_upstream(router).await;

    let table = assert_ok!(client.fetch(SchemaKind::Holdings, &query()).await);
    assert_eq!(table.len(), 1);
    assert_eq!(table.get(0, "symbol"), Some(&Cell::Text("AAA".into())));
    assert_eq!(table.get(0, "balanceUsd"), Some(&Cell::Missing));
    assert_eq!(table.get(0, "balancePctChange24H").and_then(Cell::as_f64), Some(12.5));
    assert_eq!(table.get(0, "sectors"), Some(&Cell::Text("DeFi, AI".into())));
    assert_eq!(table.get(0, "tokenAgeDaysNum").and_then(Cell::as_f64), Some(5.0));
}

#[tokio::test]
async fn test_records_by_kind() {
    let mut router = Router::new();
    for kind in SchemaKind::ALL {
        let endpoint = endpoint_path(kind).unwrap_or("/tgm/candles");
        router = router.route(
            &path_of(endpoint),
            post(move || async move { Json(json!([{"endpoint": endpoint}])) }),
        );
    }
    let client = mock_upstream(router).await;

    for kind in SchemaKind::ALL {
        let records = assert_ok!(client.records(kind, &query()).await);
        let expected = endpoint_path(kind).unwrap_or("/tgm/candles");
        assert_eq!(records[0]["endpoint"], json!(expected), "{kind}");
    }
}

#[tokio::test]
async fn test_candles_path() {
    let router = Router::new()
        .route("/api/beta/tgm/candles", post(|| async { Json(json!([{"close": 1.5}])) }))
        .route("/api/beta/custom/ohlc", post(|| async { Json(json!([{"close": 2.5}])) }));
    let client = mock_upstream(router).await;

    let table = assert_ok!(client.fetch(SchemaKind::TokenCandles, &query()).await);
    assert_eq!(table.get(0, "close").and_then(Cell::as_f64), Some(1.5));

    let records = assert_ok!(client.token_candles(&query(), Some("custom/ohlc")).await);
    assert_eq!(records[0]["close"], json!(2.5));
}

#[tokio::test]
async fn test_candles_path_not_configured() {
    let config = ClientConfig::new("test-key").unwrap();
    let client = Client::new(config).unwrap();

    let err = assert_err!(client.token_candles(&query(), None).await);
    assert!(matches!(err, ApiError::Config(ConfigError::MissingCandlesPath)));
}

#[tokio::test]
async fn test_cached_fetch() {
    let router = Router::new().route(
        "/api/beta/smart-money/inflows",
        post(|| async { Json(json!([{"symbol": "AAA", "volume24hUSD": 10}])) }),
    );
    let client = mock_upstream(router).await;
    let mut cache = QueryCache::new();
    let query = query();
    let fingerprint = Fingerprint::new(SchemaKind::Inflows, &query);

    let table = assert_ok!(
        cache
            .get_or_fetch(fingerprint.clone(), Refresh::IfMissing, || {
                client.fetch(SchemaKind::Inflows, &query)
            })
            .await
    );
    assert_eq!(table.len(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&fingerprint).is_some());
}

fn path_of(endpoint: &str) -> String {
    format!("/api/beta{endpoint}")
}
