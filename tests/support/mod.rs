//! Shared fakes for the behavior tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tickerdash_core::{
    ChartRenderer, DashboardController, DateRange, HistoryRequest, HttpClient, HttpError,
    HttpRequest, HttpResponse, MarketDataClient, MarketDataProvider, MetricKind, PricePoint,
    ProviderId, SnapshotMetrics, SourceError, Symbol, TimeSeries, TradingDate,
};

pub fn symbol(text: &str) -> Symbol {
    Symbol::parse(text).expect("valid symbol")
}

pub fn date(text: &str) -> TradingDate {
    TradingDate::parse(text).expect("valid date")
}

pub fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(date(start), date(end))
}

pub fn year_2024() -> DateRange {
    range("2024-01-01", "2024-12-31")
}

/// Weekday bars across `range`, alternating up and down days.
pub fn weekday_series(symbol: &Symbol, range: DateRange) -> TimeSeries {
    let points = range
        .days()
        .filter(|day| day.into_inner().weekday().number_from_monday() <= 5)
        .enumerate()
        .map(|(i, day)| {
            let close = 100.0 + i as f64 * 0.25;
            let open = if i % 2 == 0 { close - 1.0 } else { close + 1.0 };
            PricePoint::new(
                day,
                open,
                open.max(close) + 0.5,
                open.min(close) - 0.5,
                close,
                1_000_000.0 + (i % 10) as f64 * 50_000.0,
            )
        });
    TimeSeries::from_points(symbol.clone(), points)
}

pub fn full_snapshot(symbol: &Symbol) -> SnapshotMetrics {
    SnapshotMetrics::unavailable(symbol.clone())
        .with(MetricKind::Open, Some(101.0))
        .with(MetricKind::Close, Some(100.5))
        .with(MetricKind::High, Some(102.0))
        .with(MetricKind::Low, Some(99.0))
        .with(MetricKind::Volume, Some(1_250_000.0))
        .with(MetricKind::MarketCap, Some(3.2e12))
        .with(MetricKind::PeRatio, Some(28.4))
        .with(MetricKind::DividendYield, Some(0.0051))
}

/// Provider that knows a single symbol and records every call.
///
/// Every client fetch asks for exactly one snapshot, so `fetch_count` is the
/// number of snapshot calls.
#[derive(Debug, Default)]
pub struct RecordingProvider {
    known: Option<(Symbol, TimeSeries, SnapshotMetrics)>,
    failing_history: bool,
    failing_snapshot: bool,
    history_calls: AtomicUsize,
    snapshot_calls: AtomicUsize,
    requested_ranges: Mutex<Vec<DateRange>>,
}

impl RecordingProvider {
    pub fn knowing_nothing() -> Self {
        Self::default()
    }

    /// Knows `symbol` with a weekday series over all of 2024 and a complete
    /// snapshot.
    pub fn knowing(text: &str) -> Self {
        let known = symbol(text);
        let series = weekday_series(&known, year_2024());
        let snapshot = full_snapshot(&known);
        Self::with_data(series, snapshot)
    }

    pub fn with_data(series: TimeSeries, snapshot: SnapshotMetrics) -> Self {
        Self {
            known: Some((series.symbol().clone(), series, snapshot)),
            ..Self::default()
        }
    }

    pub fn failing_history(mut self) -> Self {
        self.failing_history = true;
        self
    }

    pub fn failing_snapshot(mut self) -> Self {
        self.failing_snapshot = true;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn requested_ranges(&self) -> Vec<DateRange> {
        self.requested_ranges.lock().expect("ranges").clone()
    }

    fn lookup(&self, wanted: &Symbol) -> Result<&(Symbol, TimeSeries, SnapshotMetrics), SourceError> {
        self.known
            .as_ref()
            .filter(|(known, _, _)| known == wanted)
            .ok_or_else(|| SourceError::not_found(format!("unknown symbol {wanted}")))
    }
}

impl MarketDataProvider for RecordingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Synthetic
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TimeSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.requested_ranges.lock().expect("ranges").push(req.range);
            if self.failing_history {
                return Err(SourceError::unavailable("history endpoint down"));
            }

            let (_, series, _) = self.lookup(&req.symbol)?;
            let points = series
                .points()
                .into_iter()
                .filter(|point| req.range.contains(point.date));
            let mut subset = TimeSeries::from_points(req.symbol.clone(), points);
            if !series.has_column(tickerdash_core::Field::Volume) {
                subset = subset.without_column(tickerdash_core::Field::Volume);
            }
            Ok(subset)
        })
    }

    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotMetrics, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_snapshot {
                return Err(SourceError::rate_limited("snapshot throttled"));
            }
            let (_, _, snapshot) = self.lookup(symbol)?;
            Ok(snapshot.clone())
        })
    }
}

pub fn controller_for(provider: Arc<RecordingProvider>) -> DashboardController {
    DashboardController::new(MarketDataClient::new(provider), ChartRenderer::default())
}

/// Canned transport: the first route whose pattern occurs in the URL answers.
/// Unrouted URLs get a 404 with an empty body.
#[derive(Debug, Default)]
pub struct CannedHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, response: HttpResponse) -> Self {
        self.routes.push((pattern.to_owned(), Ok(response)));
        self
    }

    pub fn failing_route(mut self, pattern: &str, error: HttpError) -> Self {
        self.routes.push((pattern.to_owned(), Err(error)));
        self
    }

    /// Routes for the cookie and crumb handshake.
    pub fn with_crumb(self) -> Self {
        self.route("fc.yahoo.com", HttpResponse::new(404, ""))
            .route("getcrumb", HttpResponse::ok_json("AbCdEf12"))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests").clone()
    }

    pub fn urls_containing(&self, pattern: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.url)
            .filter(|url| url.contains(pattern))
            .collect()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let answer = self
            .routes
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "")));
        self.requests.lock().expect("requests").push(request);
        Box::pin(async move { answer })
    }
}
