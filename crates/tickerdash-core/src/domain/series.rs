use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Symbol, TradingDate, ValidationError};

/// A historical column a time series can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    pub const ALL: [Self; 5] = [Self::Open, Self::High, Self::Low, Self::Close, Self::Volume];
    pub const OHLC: [Self; 4] = [Self::Open, Self::High, Self::Low, Self::Close];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One daily OHLCV row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    pub const fn new(
        date: TradingDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub const fn value(&self, field: Field) -> f64 {
        match field {
            Field::Open => self.open,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Close => self.close,
            Field::Volume => self.volume,
        }
    }
}

/// Columnar daily history for one symbol.
///
/// Dates are strictly ascending and every present column has exactly one
/// value per date. A column can be absent as a whole, which is how partial
/// provider payloads are represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    symbol: Symbol,
    dates: Vec<TradingDate>,
    columns: BTreeMap<Field, Vec<f64>>,
}

impl TimeSeries {
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            dates: Vec::new(),
            columns: BTreeMap::new(),
        }
    }

    /// Build a full OHLCV series from rows in any order. When a date appears
    /// more than once the last row wins.
    pub fn from_points(symbol: Symbol, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let by_date = points
            .into_iter()
            .map(|point| (point.date, point))
            .collect::<BTreeMap<_, _>>();

        let dates = by_date.keys().copied().collect::<Vec<_>>();
        let columns = Field::ALL
            .into_iter()
            .map(|field| {
                let values = by_date.values().map(|point| point.value(field)).collect();
                (field, values)
            })
            .collect();

        Self {
            symbol,
            dates,
            columns,
        }
    }

    /// Build a series from pre-aligned columns. `dates` must be strictly
    /// ascending and every column must match its length.
    pub fn from_columns(
        symbol: Symbol,
        dates: Vec<TradingDate>,
        columns: BTreeMap<Field, Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        if let Some(index) = dates.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(ValidationError::UnorderedDates { index: index + 1 });
        }
        for (field, values) in &columns {
            if values.len() != dates.len() {
                return Err(ValidationError::ColumnLengthMismatch {
                    field: field.as_str(),
                    expected: dates.len(),
                    actual: values.len(),
                });
            }
        }

        Ok(Self {
            symbol,
            dates,
            columns,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn dates(&self) -> &[TradingDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Values for `field`, or `None` when the series is empty or the column
    /// is absent.
    pub fn column(&self, field: Field) -> Option<&[f64]> {
        if self.is_empty() {
            return None;
        }
        self.columns.get(&field).map(Vec::as_slice)
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.column(field).is_some()
    }

    pub fn without_column(mut self, field: Field) -> Self {
        self.columns.remove(&field);
        self
    }

    /// Rows for which every OHLC column is present. Volume reads as zero
    /// when its column is absent.
    pub fn points(&self) -> Vec<PricePoint> {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            self.column(Field::Open),
            self.column(Field::High),
            self.column(Field::Low),
            self.column(Field::Close),
        ) else {
            return Vec::new();
        };
        let volume = self.column(Field::Volume);

        self.dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                PricePoint::new(
                    *date,
                    open[i],
                    high[i],
                    low[i],
                    close[i],
                    volume.map_or(0.0, |values| values[i]),
                )
            })
            .collect()
    }
}
