use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::data_source::{HistoryRequest, MarketDataProvider, SourceError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, DEFAULT_TIMEOUT_MS};
use crate::{
    Field, MetricKind, ProviderId, SnapshotMetrics, Symbol, TimeSeries, TradingDate,
};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";
const CRUMB_TTL: Duration = Duration::from_secs(3600);

// ============================================================================
// Crumb cache
// ============================================================================

#[derive(Debug, Clone)]
struct CachedCrumb {
    value: String,
    fetched_at: Instant,
}

/// Yahoo's quoteSummary endpoint wants a session cookie (kept by the
/// client's cookie jar) plus a crumb token passed as a query parameter.
/// The lock is held across a refresh so concurrent callers share one
/// handshake.
#[derive(Debug)]
struct CrumbCache {
    state: Mutex<Option<CachedCrumb>>,
    ttl: Duration,
}

impl CrumbCache {
    fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(None),
            ttl,
        }
    }

    async fn get(&self, http: &dyn HttpClient, timeout_ms: u64) -> Result<String, SourceError> {
        let mut state = self.state.lock().await;
        if let Some(cached) = state
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
        {
            return Ok(cached.value.clone());
        }

        let value = fetch_crumb(http, timeout_ms).await?;
        *state = Some(CachedCrumb {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn invalidate(&self) {
        *self.state.lock().await = None;
    }
}

async fn fetch_crumb(http: &dyn HttpClient, timeout_ms: u64) -> Result<String, SourceError> {
    // fc.yahoo.com answers 404 but sets the session cookie; only transport
    // failures matter here.
    let cookie_request = HttpRequest::get(COOKIE_URL)
        .with_header("referer", REFERER)
        .with_timeout_ms(timeout_ms);
    http.execute(cookie_request).await.map_err(|e| {
        SourceError::unavailable(format!("failed to fetch yahoo session cookie: {}", e.message()))
    })?;

    for endpoint in CRUMB_URLS {
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);

        let Ok(response) = http.execute(request).await else {
            continue;
        };
        if response.status == 429 {
            return Err(SourceError::rate_limited(
                "yahoo rate limited while fetching crumb",
            ));
        }
        if !response.is_success() {
            continue;
        }

        let body = response.body.trim();
        if body.contains("<html") || body.contains("<!DOCTYPE") {
            continue;
        }
        if body.to_ascii_lowercase().contains("too many requests") {
            return Err(SourceError::rate_limited(
                "yahoo rate limited while fetching crumb",
            ));
        }
        if !body.is_empty() && body.len() < 100 && !body.contains(char::is_whitespace) {
            return Ok(body.to_owned());
        }
    }

    Err(SourceError::unavailable(
        "failed to fetch yahoo crumb from all endpoints",
    ))
}

// ============================================================================
// Provider
// ============================================================================

/// Yahoo Finance provider: daily bars from the chart API, snapshot metrics
/// from quoteSummary.
#[derive(Clone)]
pub struct YahooProvider {
    http_client: Arc<dyn HttpClient>,
    crumbs: Arc<CrumbCache>,
    timeout_ms: u64,
}

impl YahooProvider {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            crumbs: Arc::new(CrumbCache::new(CRUMB_TTL)),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn send(&self, url: &str) -> Result<HttpResponse, SourceError> {
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);

        self.http_client.execute(request).await.map_err(|e| {
            if e.retryable() {
                SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
            } else {
                SourceError::internal(format!("yahoo transport error: {}", e.message()))
            }
        })
    }

    /// Fetch a crumb-authenticated URL, refreshing the crumb and retrying
    /// once when Yahoo answers 401 or 429.
    async fn send_with_crumb<F>(&self, build_url: F) -> Result<HttpResponse, SourceError>
    where
        F: Fn(&str) -> String + Send,
    {
        let crumb = self
            .crumbs
            .get(self.http_client.as_ref(), self.timeout_ms)
            .await?;
        let response = self.send(&build_url(&crumb)).await?;
        if !matches!(response.status, 401 | 429) {
            return Ok(response);
        }

        tracing::debug!(status = response.status, "yahoo rejected crumb, refreshing");
        self.crumbs.invalidate().await;
        let crumb = self
            .crumbs
            .get(self.http_client.as_ref(), self.timeout_ms)
            .await?;
        self.send(&build_url(&crumb)).await
    }

    async fn fetch_history(&self, req: &HistoryRequest) -> Result<TimeSeries, SourceError> {
        let period1 = unix_midnight(req.range.start);
        let period2 = req
            .range
            .end
            .next_day()
            .map_or(unix_midnight(req.range.end) + 86_400, unix_midnight);

        let url = format!(
            "{CHART_URL}/{}?period1={period1}&period2={period2}&interval=1d&events=history",
            urlencoding::encode(req.symbol.as_str()),
        );

        let response = self.send(&url).await?;
        // Unknown symbols come back as 404 with a JSON error body.
        if !response.is_success() && response.status != 404 {
            return Err(status_error(response.status));
        }
        parse_chart(req, &response.body)
    }

    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<SnapshotMetrics, SourceError> {
        let encoded = urlencoding::encode(symbol.as_str()).into_owned();
        let response = self
            .send_with_crumb(|crumb| {
                format!(
                    "{SUMMARY_URL}/{encoded}?modules=summaryDetail,price&crumb={}",
                    urlencoding::encode(crumb)
                )
            })
            .await?;

        if !response.is_success() && response.status != 404 {
            return Err(status_error(response.status));
        }
        parse_summary(symbol, &response.body)
    }
}

impl MarketDataProvider for YahooProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TimeSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_history(&req).await })
    }

    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotMetrics, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_snapshot(symbol).await })
    }
}

fn unix_midnight(date: TradingDate) -> i64 {
    date.into_inner().midnight().assume_utc().unix_timestamp()
}

fn status_error(status: u16) -> SourceError {
    match status {
        429 => SourceError::rate_limited("yahoo returned status 429"),
        _ => SourceError::unavailable(format!("yahoo returned status {status}")),
    }
}

fn api_error(error: &YahooApiError) -> SourceError {
    let description = error
        .description
        .clone()
        .unwrap_or_else(|| String::from("no description"));
    match error.code.as_deref() {
        Some("Not Found") => SourceError::not_found(format!("yahoo: {description}")),
        Some(code) => SourceError::unavailable(format!("yahoo API error {code}: {description}")),
        None => SourceError::unavailable(format!("yahoo API error: {description}")),
    }
}

// ============================================================================
// Chart parsing
// ============================================================================

fn parse_chart(req: &HistoryRequest, body: &str) -> Result<TimeSeries, SourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = &envelope.chart.error {
        return Err(api_error(error));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found(format!("yahoo: no chart for {}", req.symbol)))?;

    let Some(timestamps) = result.timestamp else {
        return Ok(TimeSeries::empty(req.symbol.clone()));
    };
    let Some(quote) = result.indicators.and_then(|i| i.quote.into_iter().next()) else {
        return Ok(TimeSeries::empty(req.symbol.clone()));
    };
    let gmtoffset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);
    let has_volume = quote.volume.iter().flatten().any(Option::is_some);

    let mut rows: BTreeMap<TradingDate, [f64; 5]> = BTreeMap::new();
    for (i, ts) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        ) else {
            continue;
        };

        let local = ts.checked_add(gmtoffset).ok_or_else(|| {
            SourceError::malformed(format!("yahoo timestamp {ts} overflows offset {gmtoffset}"))
        })?;
        let date = OffsetDateTime::from_unix_timestamp(local)
            .map(|moment| TradingDate::from_date(moment.date()))
            .map_err(|e| SourceError::malformed(format!("invalid yahoo timestamp {ts}: {e}")))?;
        if !req.range.contains(date) {
            continue;
        }

        let volume = value_at(&quote.volume, i).unwrap_or(0.0);
        rows.insert(date, [open, high, low, close, volume]);
    }

    let dates = rows.keys().copied().collect::<Vec<_>>();
    let mut columns = BTreeMap::new();
    for (slot, field) in Field::ALL.into_iter().enumerate() {
        if field == Field::Volume && !has_volume {
            continue;
        }
        columns.insert(field, rows.values().map(|row| row[slot]).collect());
    }

    TimeSeries::from_columns(req.symbol.clone(), dates, columns)
        .map_err(|e| SourceError::malformed(e.to_string()))
}

fn value_at(column: &Option<Vec<Option<f64>>>, index: usize) -> Option<f64> {
    column
        .as_ref()
        .and_then(|values| values.get(index).copied().flatten())
        .filter(|value| value.is_finite())
}

// ============================================================================
// Summary parsing
// ============================================================================

fn parse_summary(symbol: &Symbol, body: &str) -> Result<SnapshotMetrics, SourceError> {
    let envelope: SummaryEnvelope = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("failed to parse yahoo summary: {e}")))?;

    if let Some(error) = &envelope.quote_summary.error {
        return Err(api_error(error));
    }

    let result = envelope
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found(format!("yahoo: no summary for {symbol}")))?;

    let detail = result.summary_detail.unwrap_or_default();
    let price = result.price.unwrap_or_default();
    let pick = |primary: &Option<YahooNumber>, fallback: &Option<YahooNumber>| {
        number(primary).or_else(|| number(fallback))
    };

    Ok(SnapshotMetrics::unavailable(symbol.clone())
        .with(MetricKind::Open, pick(&detail.open, &price.regular_market_open))
        .with(
            MetricKind::Close,
            pick(&detail.previous_close, &price.regular_market_previous_close),
        )
        .with(MetricKind::High, pick(&detail.day_high, &price.regular_market_day_high))
        .with(MetricKind::Low, pick(&detail.day_low, &price.regular_market_day_low))
        .with(MetricKind::Volume, pick(&detail.volume, &price.regular_market_volume))
        .with(MetricKind::MarketCap, pick(&detail.market_cap, &price.market_cap))
        .with(MetricKind::PeRatio, number(&detail.trailing_pe))
        .with(MetricKind::DividendYield, number(&detail.dividend_yield)))
}

fn number(value: &Option<YahooNumber>) -> Option<f64> {
    match value.as_ref()? {
        YahooNumber::Wrapped { raw } => *raw,
        YahooNumber::Plain(value) => Some(*value),
    }
}

// ============================================================================
// Yahoo response structures
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    volume: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}

#[derive(Debug, Clone, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
struct SummaryResult {
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    price: Option<PriceModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(default)]
    open: Option<YahooNumber>,
    #[serde(default)]
    previous_close: Option<YahooNumber>,
    #[serde(default)]
    day_high: Option<YahooNumber>,
    #[serde(default)]
    day_low: Option<YahooNumber>,
    #[serde(default)]
    volume: Option<YahooNumber>,
    #[serde(default)]
    market_cap: Option<YahooNumber>,
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooNumber>,
    #[serde(default)]
    dividend_yield: Option<YahooNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    regular_market_open: Option<YahooNumber>,
    #[serde(default)]
    regular_market_previous_close: Option<YahooNumber>,
    #[serde(default)]
    regular_market_day_high: Option<YahooNumber>,
    #[serde(default)]
    regular_market_day_low: Option<YahooNumber>,
    #[serde(default)]
    regular_market_volume: Option<YahooNumber>,
    #[serde(default)]
    market_cap: Option<YahooNumber>,
}

/// Yahoo wraps most numbers as `{"raw": 1.0, "fmt": "1.00"}` and sends `{}`
/// when a value is missing; some fields arrive as bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum YahooNumber {
    Plain(f64),
    Wrapped {
        #[serde(default)]
        raw: Option<f64>,
    },
}
