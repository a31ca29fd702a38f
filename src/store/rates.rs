use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::rate::{ExchangeRate, RateMap};

/// Maximum age for a cached rate to be served.
const FRESHNESS_WINDOW_SECS: i64 = 3600;

/// Persisted row for one (base, target) pair. The pair lives in the
/// key; the row carries the rest of the quote.
#[derive(Debug, Serialize, Deserialize)]
struct CachedRate {
    rate: f64,
    source: String,
    timestamp: DateTime<Utc>,
}

/// Time-bounded rate cache. Rows are keyed `base/target/{millis}` so a
/// prefix scan per pair yields rows in timestamp order; rows older than
/// the freshness window are invalid but may persist until the next
/// `put` for their base prunes them.
pub struct RateCache {
    partition: PartitionHandle,
}

fn row_key(base: &str, target: &str, timestamp: DateTime<Utc>) -> String {
    format!("{base}/{target}/{:020}", timestamp.timestamp_millis())
}

impl RateCache {
    pub(crate) fn new(partition: PartitionHandle) -> Self {
        RateCache { partition }
    }

    /// Returns the most recent rate for the pair fetched within the
    /// freshness window of `now`, or `None` on a miss.
    pub fn get(&self, from: &str, to: &str, now: DateTime<Utc>) -> Result<Option<ExchangeRate>> {
        let cutoff = now - Duration::seconds(FRESHNESS_WINDOW_SECS);

        // Keys sort by timestamp, so the last row under the pair's
        // prefix is the newest; if that one is stale, all are.
        if let Some(entry) = self.partition.prefix(format!("{from}/{to}/")).next_back() {
            let (_, value) = entry?;
            let row: CachedRate = serde_json::from_slice(&value)?;
            if row.timestamp > cutoff {
                debug!(from, to, rate = row.rate, "rate cache hit");
                return Ok(Some(ExchangeRate {
                    from_currency: from.to_string(),
                    to_currency: to.to_string(),
                    rate: row.rate,
                    timestamp: row.timestamp,
                    source: row.source,
                }));
            }
        }

        debug!(from, to, "rate cache miss");
        Ok(None)
    }

    /// Prunes rows for `base` that fell out of the freshness window,
    /// then inserts one row per target currency stamped `now`. Rows
    /// within the window accumulate; there is no LRU bound.
    pub fn put(&self, base: &str, rates: &RateMap, source: &str, now: DateTime<Utc>) -> Result<()> {
        let cutoff = now - Duration::seconds(FRESHNESS_WINDOW_SECS);

        let mut stale = Vec::new();
        for entry in self.partition.prefix(format!("{base}/")) {
            let (key, value) = entry?;
            let row: CachedRate = serde_json::from_slice(&value)?;
            if row.timestamp < cutoff {
                stale.push(key);
            }
        }
        for key in stale {
            self.partition.remove(key)?;
        }

        let mut inserted = 0usize;
        for (target, rate) in rates {
            if *rate <= 0.0 {
                warn!(base, target = %target, rate = *rate, "skipping non-positive rate");
                continue;
            }
            let row = CachedRate {
                rate: *rate,
                source: source.to_string(),
                timestamp: now,
            };
            self.partition
                .insert(row_key(base, target, now), serde_json::to_vec(&row)?)?;
            inserted += 1;
        }

        debug!(base, count = inserted, "cached rates");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn row_count(&self) -> usize {
        self.partition.iter().count()
    }
}
