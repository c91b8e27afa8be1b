//! # Domain Models
//!
//! Canonical dashboard types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Ticker text as entered, non-empty |
//! | [`TradingDate`] | Calendar date, `YYYY-MM-DD` on the wire |
//! | [`DateRange`] | Inclusive history window |
//! | [`PricePoint`] | One OHLCV row |
//! | [`TimeSeries`] | Columnar daily history for one symbol |
//! | [`SnapshotMetrics`] | Current metrics, sentinel-filled |
//! | [`MetricKind`] / [`ChartKind`] | Panel selections |
//! | [`DashboardState`] | Every input, as one snapshot |

mod date;
mod metrics;
mod selection;
mod series;
mod symbol;

pub use date::{DateRange, TradingDate};
pub use metrics::{MetricKind, MetricRow, MetricValue, SnapshotMetrics, NOT_AVAILABLE};
pub use selection::{ChartKind, DashboardState, PanelConfig, PANEL_COUNT};
pub use series::{Field, PricePoint, TimeSeries};
pub use symbol::Symbol;
