mod cli;
mod error;
mod launcher;
mod server;

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tickerdash_core::{
    build_provider, ChartRenderer, DashboardController, DashboardSession, FetchCache,
    MarketDataClient, ProviderId, Theme,
};
use tokio::net::TcpListener;

use crate::cli::{Cli, LogFormat};
use crate::error::WebError;
use crate::launcher::{BrowserLauncher, SystemBrowser};
use crate::server::AppState;

static BROWSER: BrowserLauncher = BrowserLauncher::new();

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "tickerdash exited with an error");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn run(cli: Cli) -> Result<(), WebError> {
    let provider_id = ProviderId::from(cli.provider);
    let provider = build_provider(provider_id, cli.timeout_ms)?;
    let cache = FetchCache::new(Duration::from_secs(cli.cache_ttl_secs));
    let theme = Theme::default();

    let controller = DashboardController::new(
        MarketDataClient::with_cache(provider, cache),
        ChartRenderer::new(theme.clone()),
    );
    let (session, _worker) = DashboardSession::spawn(controller);
    let app = server::router(AppState::new(session, theme, provider_id));

    let addr = SocketAddr::new(cli.host, cli.port);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| WebError::Bind { addr, source })?;
    let url = format!("http://{addr}/");
    tracing::info!(
        %url,
        provider = %provider_id,
        cache_ttl_secs = cli.cache_ttl_secs,
        "dashboard listening"
    );

    if !cli.no_browser {
        let _ = BROWSER.schedule(
            SystemBrowser,
            url,
            Duration::from_millis(cli.browser_delay_ms),
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WebError::Serve)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
