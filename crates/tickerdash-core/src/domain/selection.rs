use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DateRange, MetricKind, Symbol, ValidationError};

/// Number of independently configurable chart panels.
pub const PANEL_COUNT: usize = 4;

/// Rendering strategy a panel can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    #[serde(rename = "lines")]
    Line,
    #[serde(rename = "bars")]
    Bar,
    #[serde(rename = "markers")]
    Scatter,
    #[serde(rename = "bubble")]
    Bubble,
    #[serde(rename = "candlestick")]
    Candlestick,
    #[serde(rename = "choropleth")]
    Choropleth,
}

impl ChartKind {
    pub const ALL: [Self; 6] = [
        Self::Line,
        Self::Bar,
        Self::Scatter,
        Self::Bubble,
        Self::Candlestick,
        Self::Choropleth,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "lines",
            Self::Bar => "bars",
            Self::Scatter => "markers",
            Self::Bubble => "bubble",
            Self::Candlestick => "candlestick",
            Self::Choropleth => "choropleth",
        }
    }

    pub const fn option_label(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Bar => "Bar",
            Self::Scatter => "Scatter",
            Self::Bubble => "Bubble",
            Self::Candlestick => "Candlestick",
            Self::Choropleth => "Choropleth Map",
        }
    }
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidChartKind {
                value: value.to_owned(),
            })
    }
}

/// One panel's `(metric, chart type)` selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelConfig {
    pub metric: MetricKind,
    #[serde(rename = "chartType")]
    pub chart_type: ChartKind,
}

impl PanelConfig {
    pub const fn new(metric: MetricKind, chart_type: ChartKind) -> Self {
        Self { metric, chart_type }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new(MetricKind::Close, ChartKind::Line)
    }
}

/// Full snapshot of every dashboard input. A change event always carries a
/// complete `DashboardState`; nothing is applied partially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    /// Raw text of the symbol box. Blank means no symbol has been chosen.
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "dateRange", default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub panels: [PanelConfig; PANEL_COUNT],
}

impl DashboardState {
    pub fn new(symbol: impl Into<String>, date_range: DateRange) -> Self {
        Self {
            symbol: symbol.into(),
            date_range,
            panels: [PanelConfig::default(); PANEL_COUNT],
        }
    }

    pub fn with_panel(mut self, index: usize, panel: PanelConfig) -> Self {
        if let Some(slot) = self.panels.get_mut(index) {
            *slot = panel;
        }
        self
    }

    /// The parsed symbol, or `None` while the symbol box is blank.
    pub fn symbol(&self) -> Option<Symbol> {
        Symbol::parse(&self.symbol).ok()
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(String::new(), DateRange::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_kinds_use_dropdown_values_on_the_wire() {
        let json = serde_json::to_string(&ChartKind::Scatter).expect("serialize");
        assert_eq!(json, r#""markers""#);
        assert_eq!("Bubble".parse::<ChartKind>(), Ok(ChartKind::Bubble));
    }

    #[test]
    fn blank_symbol_is_not_a_symbol() {
        let state = DashboardState::new("  ", DateRange::default());
        assert!(state.symbol().is_none());
    }

    #[test]
    fn deserializes_a_full_change_event() {
        let json = r#"{
            "symbol": "XYZ",
            "dateRange": {"start": "2024-01-01", "end": "2024-12-31"},
            "panels": [
                {"metric": "Close", "chartType": "lines"},
                {"metric": "Volume", "chartType": "bars"},
                {"metric": "High", "chartType": "candlestick"},
                {"metric": "PE Ratio", "chartType": "choropleth"}
            ]
        }"#;

        let state: DashboardState = serde_json::from_str(json).expect("deserialize");
        assert_eq!(state.symbol().map(String::from), Some(String::from("XYZ")));
        assert_eq!(
            state.panels[3],
            PanelConfig::new(MetricKind::PeRatio, ChartKind::Choropleth)
        );
    }

    #[test]
    fn out_of_range_panel_index_is_ignored() {
        let state = DashboardState::default()
            .with_panel(9, PanelConfig::new(MetricKind::Low, ChartKind::Bar));
        assert_eq!(state.panels, [PanelConfig::default(); PANEL_COUNT]);
    }
}
