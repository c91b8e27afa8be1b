//! Maps a `(metric, chart type)` selection over a series to a [`Chart`].
//!
//! Rendering is pure and infallible. Anything that cannot be drawn, whether
//! an absent column, a candlestick missing one of its OHLC fields, or a
//! choropleth, comes back as the "No data available" placeholder.

use crate::chart::{
    Axis, BarTrace, CandleStyle, CandlestickTrace, Chart, Font, Layout, LineStyle, Marker,
    MarkerSize, ScatterMode, ScatterTrace, Title, Trace,
};
use crate::theme::Theme;
use crate::{ChartKind, Field, MetricKind, TimeSeries};

/// Fixed panel height in pixels.
pub const PANEL_HEIGHT: u32 = 400;
pub const BUBBLE_MIN_SIZE: f64 = 4.0;
pub const BUBBLE_MAX_SIZE: f64 = 40.0;
/// Marker size used when a bubble chart has no usable volume.
pub const BUBBLE_FALLBACK_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    theme: Theme,
}

impl ChartRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn render(&self, series: &TimeSeries, metric: MetricKind, chart_type: ChartKind) -> Chart {
        let Some(values) = metric.series_field().and_then(|field| series.column(field)) else {
            return self.placeholder(series, metric);
        };

        let x = series
            .dates()
            .iter()
            .map(|date| date.format_iso())
            .collect::<Vec<_>>();
        let y = values.to_vec();
        let name = metric.as_str().to_owned();

        let trace = match chart_type {
            ChartKind::Line => Trace::Scatter(ScatterTrace {
                name,
                x,
                y,
                mode: ScatterMode::Lines,
                line: Some(LineStyle {
                    color: self.theme.line.clone(),
                }),
                marker: None,
            }),
            ChartKind::Bar => Trace::Bar(BarTrace {
                name,
                x,
                y,
                marker: self.marker(None),
            }),
            ChartKind::Scatter => Trace::Scatter(ScatterTrace {
                name,
                x,
                y,
                mode: ScatterMode::Markers,
                line: None,
                marker: Some(self.marker(None)),
            }),
            ChartKind::Bubble => Trace::Scatter(ScatterTrace {
                name,
                x,
                y,
                mode: ScatterMode::Markers,
                line: None,
                marker: Some(self.marker(Some(bubble_sizes(series.column(Field::Volume))))),
            }),
            ChartKind::Candlestick => {
                let ohlc = Field::OHLC.map(|field| series.column(field));
                let [Some(open), Some(high), Some(low), Some(close)] = ohlc else {
                    return self.placeholder(series, metric);
                };
                Trace::Candlestick(CandlestickTrace {
                    name: series.symbol().to_string(),
                    x,
                    open: open.to_vec(),
                    high: high.to_vec(),
                    low: low.to_vec(),
                    close: close.to_vec(),
                    increasing: self.candle_style(&self.theme.increasing),
                    decreasing: self.candle_style(&self.theme.decreasing),
                })
            }
            ChartKind::Choropleth => return self.placeholder(series, metric),
        };

        Chart {
            data: vec![trace],
            layout: Layout {
                title: Some(Title::new(format!("{metric} for {}", series.symbol()))),
                xaxis: Some(Axis {
                    title: Title::new("Time"),
                }),
                yaxis: Some(Axis {
                    title: Title::new(metric.as_str()),
                }),
                ..self.base_layout()
            },
        }
    }

    pub fn placeholder(&self, series: &TimeSeries, metric: MetricKind) -> Chart {
        Chart {
            data: Vec::new(),
            layout: Layout {
                title: Some(Title::new(format!(
                    "No data available for {metric} of {}",
                    series.symbol()
                ))),
                ..self.base_layout()
            },
        }
    }

    fn base_layout(&self) -> Layout {
        Layout {
            plot_bgcolor: Some(self.theme.plot_background.clone()),
            paper_bgcolor: Some(self.theme.background.clone()),
            font: Some(Font {
                color: self.theme.text.clone(),
            }),
            height: Some(PANEL_HEIGHT),
            ..Layout::default()
        }
    }

    fn marker(&self, size: Option<MarkerSize>) -> Marker {
        Marker {
            color: self.theme.line.clone(),
            size,
        }
    }

    fn candle_style(&self, color: &str) -> CandleStyle {
        CandleStyle {
            line: LineStyle {
                color: color.to_owned(),
            },
        }
    }
}

/// Scale volumes linearly into `BUBBLE_MIN_SIZE..=BUBBLE_MAX_SIZE` against
/// the series maximum.
fn bubble_sizes(volume: Option<&[f64]>) -> MarkerSize {
    let Some(volume) = volume else {
        return MarkerSize::Constant(BUBBLE_FALLBACK_SIZE);
    };
    let max = volume
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return MarkerSize::Constant(BUBBLE_FALLBACK_SIZE);
    }

    MarkerSize::PerPoint(
        volume
            .iter()
            .map(|v| {
                let ratio = if v.is_finite() { (v / max).clamp(0.0, 1.0) } else { 0.0 };
                BUBBLE_MIN_SIZE + ratio * (BUBBLE_MAX_SIZE - BUBBLE_MIN_SIZE)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PricePoint, Symbol, TradingDate};

    fn series() -> TimeSeries {
        let day = |d: u8| TradingDate::from_ymd(2024, 1, d).expect("date");
        TimeSeries::from_points(
            Symbol::parse("XYZ").expect("symbol"),
            [
                PricePoint::new(day(2), 10.0, 11.0, 9.5, 10.5, 100.0),
                PricePoint::new(day(3), 10.5, 10.8, 9.8, 10.0, 400.0),
            ],
        )
    }

    #[test]
    fn line_chart_uses_metric_values_and_titles() {
        let chart = ChartRenderer::default().render(&series(), MetricKind::Close, ChartKind::Line);

        assert_eq!(chart.title(), Some("Close for XYZ"));
        assert_eq!(chart.layout.height, Some(PANEL_HEIGHT));
        assert_eq!(chart.layout.xaxis.as_ref().map(|a| a.title.text.as_str()), Some("Time"));
        let Trace::Scatter(trace) = &chart.data[0] else {
            panic!("expected scatter trace");
        };
        assert_eq!(trace.mode, ScatterMode::Lines);
        assert_eq!(trace.y, vec![10.5, 10.0]);
        assert_eq!(trace.x, vec!["2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn snapshot_only_metrics_render_placeholder() {
        let chart = ChartRenderer::default().render(&series(), MetricKind::PeRatio, ChartKind::Bar);
        assert!(chart.is_placeholder());
        assert_eq!(chart.title(), Some("No data available for PE Ratio of XYZ"));
    }

    #[test]
    fn bubble_sizes_scale_with_volume() {
        assert_eq!(
            bubble_sizes(Some(&[100.0, 400.0])),
            MarkerSize::PerPoint(vec![13.0, 40.0])
        );
        assert_eq!(bubble_sizes(None), MarkerSize::Constant(BUBBLE_FALLBACK_SIZE));
        assert_eq!(
            bubble_sizes(Some(&[0.0, 0.0])),
            MarkerSize::Constant(BUBBLE_FALLBACK_SIZE)
        );
    }

    #[test]
    fn choropleth_is_always_placeholder() {
        let chart =
            ChartRenderer::default().render(&series(), MetricKind::Close, ChartKind::Choropleth);
        assert!(chart.is_placeholder());
    }

    #[test]
    fn candlestick_uses_theme_direction_colors() {
        let chart =
            ChartRenderer::default().render(&series(), MetricKind::Open, ChartKind::Candlestick);
        let Trace::Candlestick(trace) = &chart.data[0] else {
            panic!("expected candlestick trace");
        };
        assert_eq!(trace.increasing.line.color, "green");
        assert_eq!(trace.decreasing.line.color, "red");
    }
}
