//! HTTP surface: the dashboard page and its JSON API.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Dashboard page |
//! | `GET /api/options` | Dropdown options, palette, provider |
//! | `GET /api/state/default` | Initial input snapshot |
//! | `POST /api/dashboard` | Submit a full input snapshot, receive charts and table |
//! | `GET /api/dashboard/latest` | Most recent output |

use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tickerdash_core::{
    ChartKind, DashboardOutput, DashboardSession, DashboardState, MetricKind, ProviderId, Theme,
    PANEL_COUNT,
};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Debug, Clone)]
pub struct AppState {
    session: DashboardSession,
    theme: Theme,
    provider: ProviderId,
}

impl AppState {
    pub fn new(session: DashboardSession, theme: Theme, provider: ProviderId) -> Self {
        Self {
            session,
            theme,
            provider,
        }
    }
}

#[derive(Debug, Serialize)]
struct SelectOption {
    label: &'static str,
    value: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    metrics: Vec<SelectOption>,
    chart_types: Vec<SelectOption>,
    panel_count: usize,
    provider: ProviderId,
    theme: Theme,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/options", get(options))
        .route("/api/state/default", get(default_state))
        .route("/api/dashboard", post(update_dashboard))
        .route("/api/dashboard/latest", get(latest_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        metrics: MetricKind::ALL
            .into_iter()
            .map(|metric| SelectOption {
                label: metric.option_label(),
                value: metric.as_str(),
            })
            .collect(),
        chart_types: ChartKind::ALL
            .into_iter()
            .map(|kind| SelectOption {
                label: kind.option_label(),
                value: kind.as_str(),
            })
            .collect(),
        panel_count: PANEL_COUNT,
        provider: state.provider,
        theme: state.theme.clone(),
    })
}

async fn default_state() -> Json<DashboardState> {
    Json(DashboardState::default())
}

async fn update_dashboard(
    State(state): State<AppState>,
    Json(inputs): Json<DashboardState>,
) -> Result<Json<DashboardOutput>, ApiError> {
    let output = state.session.submit(inputs).await?;
    Ok(Json(output))
}

async fn latest_dashboard(State(state): State<AppState>) -> Json<DashboardOutput> {
    Json(state.session.latest())
}
