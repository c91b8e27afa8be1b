//! Fetch facade that never fails.
//!
//! [`MarketDataClient::fetch`] asks the provider for history and snapshot
//! concurrently and degrades each half on its own: a failed history becomes
//! an empty series, a failed snapshot becomes the all-`N/A` record.

use std::sync::Arc;

use serde::Serialize;

use crate::cache::FetchCache;
use crate::data_source::{HistoryRequest, MarketDataProvider, SourceError};
use crate::{DateRange, ProviderId, SnapshotMetrics, Symbol, TimeSeries};

/// Result of one fetch: the series (possibly empty) and the snapshot
/// (possibly all sentinels).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketData {
    pub series: TimeSeries,
    pub snapshot: SnapshotMetrics,
}

impl MarketData {
    pub fn empty(symbol: &Symbol) -> Self {
        Self {
            series: TimeSeries::empty(symbol.clone()),
            snapshot: SnapshotMetrics::unavailable(symbol.clone()),
        }
    }
}

#[derive(Clone)]
pub struct MarketDataClient {
    provider: Arc<dyn MarketDataProvider>,
    cache: FetchCache,
}

impl MarketDataClient {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_cache(provider, FetchCache::disabled())
    }

    pub fn with_cache(provider: Arc<dyn MarketDataProvider>, cache: FetchCache) -> Self {
        Self { provider, cache }
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    /// Fetch history for `range` and the current snapshot for `symbol`.
    ///
    /// An inverted range skips the history request entirely.
    pub async fn fetch(&self, symbol: &Symbol, range: DateRange) -> MarketData {
        if let Some(hit) = self.cache.get(symbol, range).await {
            tracing::debug!(%symbol, start = %range.start, end = %range.end, "fetch cache hit");
            return hit;
        }

        let provider = self.provider_id();
        let history = async {
            match HistoryRequest::new(symbol.clone(), range) {
                Ok(req) => self.provider.history(req).await,
                Err(err) => Err(err),
            }
        };
        let (history, snapshot) = tokio::join!(history, self.provider.snapshot(symbol));

        let complete = history.is_ok() && snapshot.is_ok();
        let series = history.unwrap_or_else(|err| {
            log_degraded(provider, symbol, "history", &err);
            TimeSeries::empty(symbol.clone())
        });
        let snapshot = snapshot.unwrap_or_else(|err| {
            log_degraded(provider, symbol, "snapshot", &err);
            SnapshotMetrics::unavailable(symbol.clone())
        });

        tracing::debug!(
            %symbol,
            %provider,
            rows = series.len(),
            metrics = snapshot.available_count(),
            "fetch complete"
        );

        let data = MarketData { series, snapshot };
        if complete {
            self.cache.put(symbol.clone(), range, data.clone()).await;
        }
        data
    }
}

fn log_degraded(provider: ProviderId, symbol: &Symbol, part: &str, err: &SourceError) {
    tracing::warn!(
        %symbol,
        %provider,
        part,
        code = err.code(),
        retryable = err.retryable(),
        error = err.message(),
        "fetch degraded to empty result"
    );
}
