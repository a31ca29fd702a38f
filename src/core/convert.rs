//! Conversion flow: cache-first rate lookup, then the arithmetic and
//! the history append.

use anyhow::{Result, anyhow, ensure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::rate::ExchangeRate;
use crate::sources::resolver::RateResolver;
use crate::store::Store;

/// One performed conversion, as appended to the history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: f64,
    pub converted_amount: f64,
    pub exchange_rate: f64,
    pub timestamp: DateTime<Utc>,
}

pub struct Converter<'a> {
    resolver: &'a RateResolver,
    store: &'a Store,
}

impl<'a> Converter<'a> {
    pub fn new(resolver: &'a RateResolver, store: &'a Store) -> Self {
        Converter { resolver, store }
    }

    /// Looks up the rate for a pair: cache first, then the resolver
    /// with a write-back. Fails only on storage errors or when the
    /// target code is absent from the resolved table.
    pub async fn rate(&self, from: &str, to: &str, now: DateTime<Utc>) -> Result<ExchangeRate> {
        if from == to {
            return Ok(ExchangeRate {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                rate: 1.0,
                timestamp: now,
                source: "identity".to_string(),
            });
        }

        if let Some(cached) = self.store.rates.get(from, to, now)? {
            return Ok(cached);
        }

        debug!(from, to, "cache miss, resolving rates");
        let resolution = self.resolver.resolve(from).await;
        self.store
            .rates
            .put(from, &resolution.rates, &resolution.source, now)?;

        let rate = resolution
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| anyhow!("unsupported currency: {to}"))?;
        // Sources validate their tables, but a quote handed out here
        // must hold the invariant regardless of where it came from.
        ensure!(rate > 0.0, "invalid rate {rate} for {to}");
        Ok(ExchangeRate {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            rate,
            timestamp: now,
            source: resolution.source,
        })
    }

    /// Converts an amount and appends the result to the history log.
    pub async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        now: DateTime<Utc>,
    ) -> Result<ConversionRecord> {
        ensure!(
            amount.is_finite() && amount >= 0.0,
            "amount must be a non-negative number"
        );

        let rate = self.rate(from, to, now).await?;
        let record = ConversionRecord {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            amount,
            converted_amount: amount * rate.rate,
            exchange_rate: rate.rate,
            timestamp: now,
        };

        self.store.history.record(&record)?;
        Ok(record)
    }
}
