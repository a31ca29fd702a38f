use anyhow::Result;
use fjall::PartitionHandle;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::core::convert::ConversionRecord;

/// Append-only conversion log. Keys are `{millis}/{seq}` so iteration
/// order is timestamp order with the sequence number breaking ties;
/// records are never mutated or deleted.
pub struct HistoryStore {
    partition: PartitionHandle,
    seq: AtomicU64,
}

fn record_key(record: &ConversionRecord, seq: u64) -> String {
    format!("{:020}/{seq:010}", record.timestamp.timestamp_millis())
}

impl HistoryStore {
    pub(crate) fn new(partition: PartitionHandle) -> Result<Self> {
        // Continue the sequence after the highest persisted seq so
        // re-opening the store cannot overwrite an existing key. The
        // last key in order is not enough: a clock that stepped back
        // can leave the highest seq on an earlier-timestamped key.
        let mut next_seq = 0;
        for entry in partition.iter() {
            let (key, _) = entry?;
            if let Some(seq) = parse_seq(&key) {
                next_seq = next_seq.max(seq + 1);
            }
        }

        Ok(HistoryStore {
            partition,
            seq: AtomicU64::new(next_seq),
        })
    }

    /// Appends unconditionally, in call order.
    pub fn record(&self, conversion: &ConversionRecord) -> Result<()> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.partition
            .insert(record_key(conversion, seq), serde_json::to_vec(conversion)?)?;
        debug!(
            from = %conversion.from_currency,
            to = %conversion.to_currency,
            amount = conversion.amount,
            "recorded conversion"
        );
        Ok(())
    }

    /// Returns at most `limit` records, most recent first.
    pub fn recent(&self, limit: usize) -> Result<Vec<ConversionRecord>> {
        let mut records = Vec::with_capacity(limit);
        for entry in self.partition.iter().rev().take(limit) {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

fn parse_seq(key: &[u8]) -> Option<u64> {
    std::str::from_utf8(key)
        .ok()?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use chrono::{DateTime, Duration, Utc};
    use tempfile::tempdir;

    fn record_at(timestamp: DateTime<Utc>, amount: f64) -> ConversionRecord {
        ConversionRecord {
            from_currency: "USD".to_string(),
            to_currency: "EUR".to_string(),
            amount,
            converted_amount: amount * 0.85,
            exchange_rate: 0.85,
            timestamp,
        }
    }

    #[test]
    fn test_recent_returns_newest_first() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let t0 = Utc::now();

        for minutes in [0, 1, 2] {
            store
                .history
                .record(&record_at(t0 + Duration::minutes(minutes), minutes as f64))
                .unwrap();
        }

        let records = store.history.recent(2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 2.0);
        assert_eq!(records[1].amount, 1.0);
    }

    #[test]
    fn test_recent_with_limit_above_len() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        store.history.record(&record_at(Utc::now(), 100.0)).unwrap();

        assert_eq!(store.history.recent(10).unwrap().len(), 1);
        assert!(store.history.recent(0).unwrap().is_empty());
    }

    #[test]
    fn test_same_timestamp_keeps_insertion_order_reversed() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let t0 = Utc::now();

        for amount in [1.0, 2.0, 3.0] {
            store.history.record(&record_at(t0, amount)).unwrap();
        }

        let amounts: Vec<f64> = store
            .history
            .recent(3)
            .unwrap()
            .iter()
            .map(|r| r.amount)
            .collect();
        assert_eq!(amounts, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_sequence_survives_reopen() {
        let dir = tempdir().unwrap();
        let t0 = Utc::now();

        {
            let store = Store::open(dir.path()).unwrap();
            store.history.record(&record_at(t0, 1.0)).unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        store.history.record(&record_at(t0, 2.0)).unwrap();

        let records = store.history.recent(10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 2.0);
    }

    #[test]
    fn test_sequence_resumes_after_out_of_order_timestamps() {
        let dir = tempdir().unwrap();
        let t0 = Utc::now();
        let stepped_back = t0 - Duration::hours(1);

        {
            let store = Store::open(dir.path()).unwrap();
            store.history.record(&record_at(t0, 1.0)).unwrap();
            // Simulates a clock step: a later append with an earlier
            // timestamp carries the higher seq.
            store.history.record(&record_at(stepped_back, 2.0)).unwrap();
        }

        let store = Store::open(dir.path()).unwrap();
        store.history.record(&record_at(stepped_back, 3.0)).unwrap();

        // Nothing was overwritten: all three appends survive.
        let records = store.history.recent(10).unwrap();
        assert_eq!(records.len(), 3);
        let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_empty_history() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(store.history.recent(20).unwrap().is_empty());
    }
}
