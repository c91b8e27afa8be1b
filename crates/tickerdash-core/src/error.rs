use thiserror::Error;

/// Validation errors exposed by `tickerdash-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("invalid metric '{value}', expected one of Open, Close, High, Low, Volume, Market Cap, PE Ratio, Dividend Yield")]
    InvalidMetric { value: String },
    #[error("invalid chart type '{value}', expected one of lines, bars, markers, bubble, candlestick, choropleth")]
    InvalidChartKind { value: String },
    #[error("invalid source '{value}', expected one of yahoo, synthetic")]
    InvalidSource { value: String },

    #[error("series dates must be strictly ascending (violated at index {index})")]
    UnorderedDates { index: usize },
    #[error("column '{field}' has {actual} values but the series has {expected} dates")]
    ColumnLengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}
