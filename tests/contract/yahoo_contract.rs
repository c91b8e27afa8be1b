//! Contract tests for the Yahoo adapter against canned HTTP payloads.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use support::{range, symbol, CannedHttpClient};
use tickerdash_core::{
    Field, HistoryRequest, HttpError, HttpResponse, MarketDataClient, MarketDataProvider,
    MetricKind, MetricValue, ProviderId, SourceErrorKind, YahooProvider,
};

const CHART_XYZ: &str = r#"{
  "chart": {
    "result": [{
      "meta": {"currency": "USD", "symbol": "XYZ", "gmtoffset": -18000, "timezone": "EST"},
      "timestamp": [1704205800, 1704292200, 1704378600, 1704465000],
      "indicators": {
        "quote": [{
          "open":   [187.15, 184.22, 182.15, 181.99],
          "high":   [188.44, 185.88, 183.09, 182.76],
          "low":    [183.89, 183.43, 180.88, 180.17],
          "close":  [185.64, 184.25, 181.91, 181.18],
          "volume": [82488700, 58414500, 71983600, 62303300]
        }],
        "adjclose": [{"adjclose": [185.4, 184.0, 181.7, 180.9]}]
      }
    }],
    "error": null
  }
}"#;

const CHART_NOT_FOUND: &str = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

const SUMMARY_XYZ: &str = r#"{
  "quoteSummary": {
    "result": [{
      "summaryDetail": {
        "open": {"raw": 187.15, "fmt": "187.15"},
        "previousClose": {"raw": 192.53, "fmt": "192.53"},
        "dayHigh": {"raw": 188.44, "fmt": "188.44"},
        "dayLow": {"raw": 183.89, "fmt": "183.89"},
        "volume": {"raw": 82488700, "fmt": "82.49M"},
        "marketCap": {"raw": 2.87e12, "fmt": "2.87T"},
        "trailingPE": {"raw": 30.2, "fmt": "30.20"},
        "dividendYield": {"raw": 0.0051, "fmt": "0.51%"}
      },
      "price": {"regularMarketOpen": {"raw": 187.15}}
    }],
    "error": null
  }
}"#;

const SUMMARY_SPARSE: &str = r#"{
  "quoteSummary": {
    "result": [{
      "summaryDetail": {"open": {}, "trailingPE": {}, "dividendYield": {}},
      "price": {"regularMarketOpen": {"raw": 41.0}, "regularMarketVolume": {"raw": 1200}}
    }],
    "error": null
  }
}"#;

const SUMMARY_NOT_FOUND: &str = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for symbol: ACME"}}}"#;

fn provider(http: CannedHttpClient) -> (YahooProvider, Arc<CannedHttpClient>) {
    let http = Arc::new(http);
    (YahooProvider::new(http.clone()), http)
}

#[tokio::test]
async fn history_parses_daily_bars_in_exchange_time() {
    let (yahoo, http) = provider(CannedHttpClient::new().route("v8/finance/chart/XYZ", HttpResponse::ok_json(CHART_XYZ)));
    let req = HistoryRequest::new(symbol("XYZ"), range("2024-01-01", "2024-01-31")).expect("request");

    let series = yahoo.history(req).await.expect("history");

    assert_eq!(yahoo.id(), ProviderId::Yahoo);
    assert_eq!(series.len(), 4);
    assert_eq!(series.dates()[0].format_iso(), "2024-01-02");
    assert_eq!(series.dates()[3].format_iso(), "2024-01-05");
    assert_eq!(series.column(Field::Close).map(|c| c[0]), Some(185.64));
    assert_eq!(series.column(Field::Volume).map(|c| c[3]), Some(62_303_300.0));

    let url = &http.urls_containing("v8/finance/chart")[0];
    assert!(url.contains("interval=1d"));
    assert!(url.contains("period1=1704067200"));
    assert!(url.contains("period2=1706745600"));
}

#[tokio::test]
async fn unknown_symbol_history_is_not_found() {
    let (yahoo, _http) = provider(
        CannedHttpClient::new().route("v8/finance/chart", HttpResponse::new(404, CHART_NOT_FOUND)),
    );
    let req = HistoryRequest::new(symbol("ACME"), range("2024-01-01", "2024-01-31")).expect("request");

    let err = yahoo.history(req).await.expect_err("must fail");
    assert_eq!(err.kind(), SourceErrorKind::NotFound);
    assert_eq!(err.code(), "source.not_found");
}

#[tokio::test]
async fn snapshot_maps_summary_detail_fields() {
    let (yahoo, http) = provider(
        CannedHttpClient::new()
            .with_crumb()
            .route("quoteSummary/XYZ", HttpResponse::ok_json(SUMMARY_XYZ)),
    );

    let snapshot = yahoo.snapshot(&symbol("XYZ")).await.expect("snapshot");

    assert_eq!(snapshot.get(MetricKind::Open), MetricValue::Available(187.15));
    assert_eq!(snapshot.get(MetricKind::Close), MetricValue::Available(192.53));
    assert_eq!(snapshot.get(MetricKind::High), MetricValue::Available(188.44));
    assert_eq!(snapshot.get(MetricKind::Low), MetricValue::Available(183.89));
    assert_eq!(snapshot.get(MetricKind::Volume), MetricValue::Available(82_488_700.0));
    assert_eq!(snapshot.get(MetricKind::MarketCap), MetricValue::Available(2.87e12));
    assert_eq!(snapshot.get(MetricKind::PeRatio), MetricValue::Available(30.2));
    assert_eq!(snapshot.get(MetricKind::DividendYield), MetricValue::Available(0.0051));

    let summary_url = &http.urls_containing("quoteSummary")[0];
    assert!(summary_url.contains("crumb=AbCdEf12"));
    assert!(summary_url.contains("modules=summaryDetail,price"));
}

#[tokio::test]
async fn sparse_summary_falls_back_to_price_module_or_sentinel() {
    let (yahoo, _http) = provider(
        CannedHttpClient::new()
            .with_crumb()
            .route("quoteSummary", HttpResponse::ok_json(SUMMARY_SPARSE)),
    );

    let snapshot = yahoo.snapshot(&symbol("TINY")).await.expect("snapshot");

    assert_eq!(snapshot.get(MetricKind::Open), MetricValue::Available(41.0));
    assert_eq!(snapshot.get(MetricKind::Volume), MetricValue::Available(1200.0));
    assert_eq!(snapshot.get(MetricKind::PeRatio), MetricValue::NotAvailable);
    assert_eq!(snapshot.get(MetricKind::MarketCap), MetricValue::NotAvailable);
    assert_eq!(snapshot.rows().len(), 8);
}

#[tokio::test]
async fn missing_crumb_makes_snapshot_unavailable() {
    let (yahoo, _http) = provider(
        CannedHttpClient::new()
            .route("fc.yahoo.com", HttpResponse::new(404, ""))
            .route("getcrumb", HttpResponse::new(403, "<html>blocked</html>")),
    );

    let err = yahoo.snapshot(&symbol("XYZ")).await.expect_err("must fail");
    assert_eq!(err.kind(), SourceErrorKind::Unavailable);
}

#[tokio::test]
async fn client_degrades_yahoo_not_found_to_empty_result() {
    // Given: Yahoo answering 404 for both endpoints
    let (yahoo, _http) = provider(
        CannedHttpClient::new()
            .with_crumb()
            .route("v8/finance/chart", HttpResponse::new(404, CHART_NOT_FOUND))
            .route("quoteSummary", HttpResponse::new(404, SUMMARY_NOT_FOUND)),
    );
    let client = MarketDataClient::new(Arc::new(yahoo));

    // When: ACME is fetched
    let data = client.fetch(&symbol("ACME"), range("2024-01-01", "2024-12-31")).await;

    // Then: Empty series and an all-sentinel snapshot
    assert!(data.series.is_empty());
    assert_eq!(data.snapshot.available_count(), 0);
    assert_eq!(data.snapshot.rows().len(), 8);
}

#[tokio::test]
async fn transport_failure_degrades_through_the_client() {
    let (yahoo, _http) = provider(
        CannedHttpClient::new()
            .with_crumb()
            .failing_route("v8/finance/chart", HttpError::new("connection reset"))
            .route("quoteSummary", HttpResponse::ok_json(SUMMARY_XYZ)),
    );
    let client = MarketDataClient::new(Arc::new(yahoo));

    let data = client.fetch(&symbol("XYZ"), range("2024-01-01", "2024-12-31")).await;

    assert!(data.series.is_empty());
    assert_eq!(data.snapshot.available_count(), 8);
}
