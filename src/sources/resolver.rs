use tracing::{debug, error, warn};

use super::fallback::fallback_rates;
use crate::core::rate::{RateMap, RateSource};

/// Rates for a base currency together with the name of the source that
/// produced them, so cache rows keep their provenance.
#[derive(Debug)]
pub struct Resolution {
    pub rates: RateMap,
    pub source: String,
}

/// Walks upstream sources in priority order and accepts the first
/// success. Callers append [`super::fallback::StaticSource`] last, so
/// resolution is infallible either way.
pub struct RateResolver {
    sources: Vec<Box<dyn RateSource>>,
}

impl RateResolver {
    pub fn new(sources: Vec<Box<dyn RateSource>>) -> Self {
        RateResolver { sources }
    }

    /// Never fails. Each source gets exactly one attempt; any failure
    /// is logged and the next source is tried.
    pub async fn resolve(&self, base: &str) -> Resolution {
        for source in &self.sources {
            match source.fetch_rates(base).await {
                Ok(rates) => {
                    debug!(source = source.name(), count = rates.len(), "resolved rates");
                    return Resolution {
                        rates,
                        source: source.name().to_string(),
                    };
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "rate source failed");
                }
            }
        }

        error!(%base, "all rate sources failed, using fallback table");
        Resolution {
            rates: fallback_rates(),
            source: "static-fallback".to_string(),
        }
    }
}
