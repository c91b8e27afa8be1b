use std::future::Future;
use std::pin::Pin;

use time::Weekday;

use crate::data_source::{HistoryRequest, MarketDataProvider, SourceError};
use crate::{
    Field, MetricKind, PricePoint, ProviderId, SnapshotMetrics, Symbol, TimeSeries, TradingDate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Equity,
    Fund,
    Index,
}

const CATALOG: [(&str, Listing); 6] = [
    ("AAPL", Listing::Equity),
    ("MSFT", Listing::Equity),
    ("XYZ", Listing::Equity),
    ("SPY", Listing::Fund),
    ("QQQ", Listing::Fund),
    ("^VIX", Listing::Index),
];

/// Offline provider producing deterministic weekday bars for a small
/// catalog. Indexes carry no volume column; funds report no PE ratio or
/// market cap.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    as_of: TradingDate,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::as_of(TradingDate::today())
    }

    /// Pin the snapshot date, mostly for tests.
    pub fn as_of(as_of: TradingDate) -> Self {
        Self { as_of }
    }

    fn listing(symbol: &Symbol) -> Result<Listing, SourceError> {
        CATALOG
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(symbol.as_str()))
            .map(|(_, listing)| *listing)
            .ok_or_else(|| SourceError::not_found(format!("synthetic: unknown symbol {symbol}")))
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Synthetic
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TimeSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let listing = Self::listing(&req.symbol)?;
            let seed = symbol_seed(&req.symbol);

            let points = req
                .range
                .days()
                .filter(|day| !matches!(day.into_inner().weekday(), Weekday::Saturday | Weekday::Sunday))
                .map(|day| synthetic_bar(seed, day));
            let series = TimeSeries::from_points(req.symbol.clone(), points);

            Ok(match listing {
                Listing::Index => series.without_column(Field::Volume),
                Listing::Equity | Listing::Fund => series,
            })
        })
    }

    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotMetrics, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let listing = Self::listing(symbol)?;
            let seed = symbol_seed(symbol);
            let bar = synthetic_bar(seed, self.as_of);
            let previous_close = bar.open - (seed % 7) as f64 / 10.0;

            let mut snapshot = SnapshotMetrics::unavailable(symbol.clone())
                .with(MetricKind::Open, Some(bar.open))
                .with(MetricKind::Close, Some(previous_close))
                .with(MetricKind::High, Some(bar.high))
                .with(MetricKind::Low, Some(bar.low));

            match listing {
                Listing::Equity => {
                    snapshot = snapshot
                        .with(MetricKind::Volume, Some(bar.volume))
                        .with(
                            MetricKind::MarketCap,
                            Some(500_000_000_000.0 + (seed % 300_000) as f64 * 1_000_000.0),
                        )
                        .with(MetricKind::PeRatio, Some(14.0 + (seed % 200) as f64 / 10.0))
                        .with(
                            MetricKind::DividendYield,
                            Some(0.005 + (seed % 50) as f64 / 10_000.0),
                        );
                }
                Listing::Fund => {
                    snapshot = snapshot.with(MetricKind::Volume, Some(bar.volume)).with(
                        MetricKind::DividendYield,
                        Some(0.012 + (seed % 20) as f64 / 10_000.0),
                    );
                }
                Listing::Index => {}
            }

            Ok(snapshot)
        })
    }
}

/// One bar as a function of symbol and date only, so overlapping ranges
/// agree on shared days.
fn synthetic_bar(seed: u64, day: TradingDate) -> PricePoint {
    let julian = i64::from(day.into_inner().to_julian_day());
    let noise = |salt: u64| {
        let mixed = (seed ^ salt)
            .wrapping_add(julian as u64)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15);
        ((mixed >> 40) % 1000) as f64 / 1000.0
    };

    let base = 40.0 + (seed % 400) as f64;
    let cycle = (julian as f64 / 45.0).sin() * 0.12 + (julian as f64 / 11.0).cos() * 0.03;
    let mid = base * (1.0 + cycle);
    let swing = mid * 0.01 * (noise(1) - 0.5);

    let open = round_cents(mid - swing);
    let close = round_cents(mid + swing);
    let high = round_cents(open.max(close) + mid * 0.008 * noise(2));
    let low = round_cents(open.min(close) - mid * 0.008 * noise(3));
    let volume = (1_000_000 + seed % 500_000) as f64 + (noise(4) * 400_000.0).round();

    PricePoint::new(day, open, high, low, close, volume)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol
        .as_str()
        .to_ascii_uppercase()
        .bytes()
        .fold(7_u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(byte)))
}
