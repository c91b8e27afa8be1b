use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Field, Symbol, ValidationError};

/// Text shown wherever a value is not available.
pub const NOT_AVAILABLE: &str = "N/A";

/// A metric a panel can plot or the summary table can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricKind {
    Open,
    Close,
    High,
    Low,
    Volume,
    MarketCap,
    PeRatio,
    DividendYield,
}

impl MetricKind {
    /// Canonical order, also the row order of the metrics table.
    pub const ALL: [Self; 8] = [
        Self::Open,
        Self::Close,
        Self::High,
        Self::Low,
        Self::Volume,
        Self::MarketCap,
        Self::PeRatio,
        Self::DividendYield,
    ];

    /// Name used in titles, the table, and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Close => "Close",
            Self::High => "High",
            Self::Low => "Low",
            Self::Volume => "Volume",
            Self::MarketCap => "Market Cap",
            Self::PeRatio => "PE Ratio",
            Self::DividendYield => "Dividend Yield",
        }
    }

    /// Label for the metric dropdown.
    pub const fn option_label(self) -> &'static str {
        match self {
            Self::Open => "Open Price",
            Self::Close => "Close Price",
            Self::High => "Day High",
            Self::Low => "Day Low",
            other => other.as_str(),
        }
    }

    /// The historical column backing this metric, if any. Market cap, PE
    /// ratio, and dividend yield only exist as snapshot values.
    pub const fn series_field(self) -> Option<Field> {
        match self {
            Self::Open => Some(Field::Open),
            Self::Close => Some(Field::Close),
            Self::High => Some(Field::High),
            Self::Low => Some(Field::Low),
            Self::Volume => Some(Field::Volume),
            Self::MarketCap | Self::PeRatio | Self::DividendYield => None,
        }
    }
}

impl Display for MetricKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::InvalidMetric {
                value: value.to_owned(),
            })
    }
}

impl Serialize for MetricKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MetricKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(D::Error::custom)
    }
}

/// A snapshot value or the explicit "not available" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MetricValue {
    Available(f64),
    #[default]
    NotAvailable,
}

impl MetricValue {
    /// Non-finite numbers are treated as missing.
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(number) if number.is_finite() => Self::Available(number),
            _ => Self::NotAvailable,
        }
    }

    pub const fn as_f64(self) -> Option<f64> {
        match self {
            Self::Available(number) => Some(number),
            Self::NotAvailable => None,
        }
    }

    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl Display for MetricValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(number) => write!(f, "{number}"),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Available(number) => serializer.serialize_f64(*number),
            Self::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(number) => Ok(Self::from_option(Some(number))),
            Raw::Text(text) if text == NOT_AVAILABLE => Ok(Self::NotAvailable),
            Raw::Text(text) => Err(D::Error::custom(format!(
                "expected a number or '{NOT_AVAILABLE}', got '{text}'"
            ))),
        }
    }
}

/// One `{Metric, Value}` row of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    pub metric: MetricKind,
    #[serde(rename = "Value")]
    pub value: MetricValue,
}

/// Point-in-time metrics for an instrument. Every `MetricKind` always has
/// an entry; missing ones hold `MetricValue::NotAvailable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetrics {
    symbol: Symbol,
    values: BTreeMap<MetricKind, MetricValue>,
}

impl SnapshotMetrics {
    pub fn unavailable(symbol: Symbol) -> Self {
        Self {
            symbol,
            values: MetricKind::ALL
                .into_iter()
                .map(|kind| (kind, MetricValue::NotAvailable))
                .collect(),
        }
    }

    pub fn with(mut self, kind: MetricKind, value: Option<f64>) -> Self {
        self.values.insert(kind, MetricValue::from_option(value));
        self
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn get(&self, kind: MetricKind) -> MetricValue {
        self.values.get(&kind).copied().unwrap_or_default()
    }

    pub fn available_count(&self) -> usize {
        self.values.values().filter(|value| value.is_available()).count()
    }

    /// The eight table rows in canonical order.
    pub fn rows(&self) -> Vec<MetricRow> {
        MetricKind::ALL
            .into_iter()
            .map(|metric| MetricRow {
                metric,
                value: self.get(metric),
            })
            .collect()
    }
}
