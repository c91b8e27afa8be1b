//! Provider trait and request/error types.
//!
//! A [`MarketDataProvider`] answers two questions about a symbol: what its
//! daily history looks like over a date range, and what its current
//! snapshot metrics are. Providers report failures as [`SourceError`];
//! turning those into empty results is the job of
//! [`MarketDataClient`](crate::MarketDataClient), not of the provider.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{DateRange, ProviderId, SnapshotMetrics, Symbol, TimeSeries};

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotFound,
    Unavailable,
    RateLimited,
    InvalidRequest,
    Malformed,
    Internal,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for daily history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub range: DateRange,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, range: DateRange) -> Result<Self, SourceError> {
        if range.is_inverted() {
            return Err(SourceError::invalid_request(format!(
                "history range start {} is after end {}",
                range.start, range.end
            )));
        }
        Ok(Self { symbol, range })
    }
}

/// Market data provider contract.
///
/// Implementations must be `Send + Sync`; the dashboard session task holds
/// one behind an `Arc` for the life of the process.
pub trait MarketDataProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Daily OHLCV history for the request's inclusive date range, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown symbols; `Unavailable`, `RateLimited`, or
    /// `Malformed` for transport and payload problems.
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TimeSeries, SourceError>> + Send + 'a>>;

    /// Current metrics for `symbol`. Fields the provider does not know are
    /// left as sentinels rather than reported as errors.
    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotMetrics, SourceError>> + Send + 'a>>;
}
