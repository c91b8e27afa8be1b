//! # Tickerdash Core
//!
//! Data retrieval, chart rendering, and reactive recomputation for the
//! tickerdash multi-panel market dashboard.
//!
//! ## Overview
//!
//! - **Domain models** for symbols, date ranges, columnar price history,
//!   and sentinel-filled snapshot metrics
//! - **Provider trait** with Yahoo Finance and synthetic adapters
//! - **MarketDataClient** that degrades every failure to an empty result
//! - **ChartRenderer** producing Plotly-compatible figures
//! - **DashboardController** and a single-consumer session task
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo, Synthetic) |
//! | [`cache`] | Optional `(symbol, range)` memoization |
//! | [`chart`] | Plotly figure model |
//! | [`client`] | Never-failing fetch facade |
//! | [`controller`] | Idle/Populated recomputation |
//! | [`data_source`] | Provider trait and request/error types |
//! | [`domain`] | Domain models |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`renderer`] | Selection-to-chart mapping |
//! | [`session`] | Event loop around the controller |
//! | [`source`] | Provider identifiers |
//! | [`theme`] | Color palette |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerdash_core::{
//!     ChartRenderer, DashboardController, DashboardState, DateRange, MarketDataClient,
//!     SyntheticProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = MarketDataClient::new(Arc::new(SyntheticProvider::default()));
//!     let mut controller = DashboardController::new(client, ChartRenderer::default());
//!
//!     let output = controller
//!         .on_input_change(DashboardState::new("AAPL", DateRange::default()))
//!         .await;
//!     println!("{}", output.charts[0].title().unwrap_or_default());
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod chart;
pub mod client;
pub mod controller;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod renderer;
pub mod session;
pub mod source;
pub mod theme;

pub use adapters::{build_provider, SyntheticProvider, YahooProvider};
pub use cache::FetchCache;
pub use chart::{Chart, Trace};
pub use client::{MarketData, MarketDataClient};
pub use controller::{DashboardController, DashboardOutput, Phase};
pub use data_source::{HistoryRequest, MarketDataProvider, SourceError, SourceErrorKind};
pub use domain::*;
pub use error::ValidationError;
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use renderer::ChartRenderer;
pub use session::{DashboardSession, SessionError};
pub use source::ProviderId;
pub use theme::Theme;
