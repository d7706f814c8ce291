// Client Yahoo contre un serveur HTTP simulé (wiremock)

use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricedump::api::{PriceProvider, ProviderError, YahooProvider};
use pricedump::models::DateWindow;

fn window() -> DateWindow {
    DateWindow::new(
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
    )
    .unwrap()
}

fn chart_body() -> serde_json::Value {
    // Deux séances EUR/USD, timezone Londres (gmtoffset 0)
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "EURUSD=X", "exchangeTimezoneName": "Europe/London", "gmtoffset": 0 },
                "timestamp": [1609718400, 1609804800],
                "indicators": {
                    "quote": [{
                        "open": [1.2249, 1.2253],
                        "high": [1.2309, 1.2297],
                        "low": [1.2245, 1.2254],
                        "close": [1.2250, 1.2254],
                        "volume": [0, 0]
                    }],
                    "adjclose": [{ "adjclose": [1.2250, 1.2254] }]
                }
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn test_fetch_sends_window_and_parses_bars() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/EURUSD=X"))
        .and(query_param("period1", "1609459200"))
        .and(query_param("period2", "1705190400"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = YahooProvider::with_base_url(&server.uri()).unwrap();
    let series = provider.fetch("EURUSD=X", window()).await.unwrap();

    assert_eq!(series.symbol, "EURUSD=X");
    assert_eq!(series.shape(), (2, 6));
    assert_eq!(series.bars[0].date, NaiveDate::from_ymd_opt(2021, 1, 4).unwrap());
    assert_eq!(series.bars[1].close, 1.2254);
}

#[tokio::test]
async fn test_fetch_404_is_symbol_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found" } }
        })))
        .mount(&server)
        .await;

    let provider = YahooProvider::with_base_url(&server.uri()).unwrap();
    let err = provider.fetch("NOPE", window()).await.unwrap_err();
    assert!(matches!(err, ProviderError::SymbolNotFound { symbol } if symbol == "NOPE"));
}

#[tokio::test]
async fn test_fetch_server_error_is_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = YahooProvider::with_base_url(&server.uri()).unwrap();
    let err = provider.fetch("CL=F", window()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_fetch_malformed_body_is_format_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let provider = YahooProvider::with_base_url(&server.uri()).unwrap();
    let err = provider.fetch("CL=F", window()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Format(_)));
}

#[tokio::test]
async fn test_fetch_empty_result_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "chart": {
                "result": [{ "meta": { "symbol": "RUBUSD=X" }, "indicators": { "quote": [{}] } }],
                "error": null
            }
        })))
        .mount(&server)
        .await;

    let provider = YahooProvider::with_base_url(&server.uri()).unwrap();
    let err = provider.fetch("RUBUSD=X", window()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Empty { .. }));
}
