//! Provider adapters.
//!
//! | Adapter | Source |
//! |---------|--------|
//! | [`YahooProvider`] | Yahoo Finance chart and quoteSummary APIs |
//! | [`SyntheticProvider`] | Deterministic offline catalog |

use std::sync::Arc;

use crate::data_source::MarketDataProvider;
use crate::http_client::{HttpClient, HttpError, ReqwestHttpClient};
use crate::ProviderId;

mod synthetic;
mod yahoo;

pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;

/// Build the provider selected by `id`. Only the Yahoo adapter touches the
/// network, so only it can fail to construct.
pub fn build_provider(
    id: ProviderId,
    timeout_ms: u64,
) -> Result<Arc<dyn MarketDataProvider>, HttpError> {
    Ok(match id {
        ProviderId::Yahoo => {
            let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
            Arc::new(YahooProvider::new(http).with_timeout_ms(timeout_ms))
        }
        ProviderId::Synthetic => Arc::new(SyntheticProvider::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_selected_provider() {
        for id in [ProviderId::Synthetic, ProviderId::Yahoo] {
            let provider = build_provider(id, 5_000).expect("provider");
            assert_eq!(provider.id(), id);
        }
    }
}
