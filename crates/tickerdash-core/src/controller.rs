use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::chart::Chart;
use crate::client::MarketDataClient;
use crate::renderer::ChartRenderer;
use crate::{DashboardState, MetricRow, PANEL_COUNT};

/// Whether a symbol has been entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Populated,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Populated => "populated",
        })
    }
}

/// Everything the page displays after one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOutput {
    pub charts: [Chart; PANEL_COUNT],
    pub table: Vec<MetricRow>,
}

impl DashboardOutput {
    /// Four blank charts and no table rows.
    pub fn idle() -> Self {
        Self {
            charts: std::array::from_fn(|_| Chart::blank()),
            table: Vec::new(),
        }
    }
}

/// Recomputes all four panels and the metrics table from a full input
/// snapshot. Each populated recomputation makes exactly one fetch.
pub struct DashboardController {
    client: MarketDataClient,
    renderer: ChartRenderer,
    phase: Phase,
}

impl DashboardController {
    pub fn new(client: MarketDataClient, renderer: ChartRenderer) -> Self {
        Self {
            client,
            renderer,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub async fn on_input_change(&mut self, state: DashboardState) -> DashboardOutput {
        let symbol = state.symbol();
        self.transition(if symbol.is_some() {
            Phase::Populated
        } else {
            Phase::Idle
        });

        let Some(symbol) = symbol else {
            return DashboardOutput::idle();
        };

        let data = self.client.fetch(&symbol, state.date_range).await;
        let charts = state.panels.map(|panel| {
            self.renderer
                .render(&data.series, panel.metric, panel.chart_type)
        });

        tracing::debug!(
            %symbol,
            rows = data.series.len(),
            placeholders = charts.iter().filter(|chart| chart.is_placeholder()).count(),
            "dashboard recomputed"
        );

        DashboardOutput {
            charts,
            table: data.snapshot.rows(),
        }
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            tracing::info!(from = %self.phase, to = %next, "dashboard phase changed");
            self.phase = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SyntheticProvider;
    use crate::DateRange;
    use std::sync::Arc;

    fn controller() -> DashboardController {
        DashboardController::new(
            MarketDataClient::new(Arc::new(SyntheticProvider::default())),
            ChartRenderer::default(),
        )
    }

    #[tokio::test]
    async fn clearing_the_symbol_returns_to_idle() {
        let mut controller = controller();
        assert_eq!(controller.phase(), Phase::Idle);

        controller
            .on_input_change(DashboardState::new("MSFT", DateRange::default()))
            .await;
        assert_eq!(controller.phase(), Phase::Populated);

        let output = controller
            .on_input_change(DashboardState::new("", DateRange::default()))
            .await;
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(output, DashboardOutput::idle());
    }

    #[tokio::test]
    async fn populated_output_always_has_eight_rows() {
        let mut controller = controller();
        let output = controller
            .on_input_change(DashboardState::new("MSFT", DateRange::default()))
            .await;

        assert_eq!(output.table.len(), 8);
        assert!(output.charts.iter().all(|chart| !chart.is_blank()));
    }
}
