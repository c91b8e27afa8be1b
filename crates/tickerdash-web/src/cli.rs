//! Command-line options for the dashboard server.
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--host` | `127.0.0.1` | Address to bind |
//! | `--port` | `8050` | Port to bind |
//! | `--provider` | `yahoo` | Market data provider (yahoo, synthetic) |
//! | `--timeout-ms` | `10000` | Upstream request timeout |
//! | `--cache-ttl-secs` | `0` | Fetch memoization TTL, 0 disables |
//! | `--no-browser` | `false` | Skip opening the browser |
//! | `--browser-delay-ms` | `1000` | Delay before opening the browser |
//! | `--log-format` | `text` | Log output (text, json) |

use std::net::IpAddr;

use clap::{Parser, ValueEnum};
use tickerdash_core::ProviderId;

/// Multi-panel stock dashboard served on localhost.
#[derive(Debug, Parser)]
#[command(name = "tickerdash", author, version, about = "Multi-panel stock dashboard")]
pub struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind the HTTP server to.
    #[arg(long, default_value_t = 8050)]
    pub port: u16,

    /// Market data provider.
    #[arg(long, value_enum, default_value_t = ProviderArg::Yahoo)]
    pub provider: ProviderArg,

    /// Per-request upstream timeout in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Memoize identical fetches for this many seconds. Zero disables.
    #[arg(long, default_value_t = 0)]
    pub cache_ttl_secs: u64,

    /// Do not open a browser window on startup.
    #[arg(long, default_value_t = false)]
    pub no_browser: bool,

    /// Wait this long after binding before opening the browser.
    #[arg(long, default_value_t = 1000)]
    pub browser_delay_ms: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    Yahoo,
    Synthetic,
}

impl From<ProviderArg> for ProviderId {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Yahoo => Self::Yahoo,
            ProviderArg::Synthetic => Self::Synthetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
