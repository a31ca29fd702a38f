pub mod history;
pub mod rates;

use anyhow::Result;
use fjall::PartitionCreateOptions;
use history::HistoryStore;
use rates::RateCache;
use std::path::Path;

/// Embedded store with two partitions: cached exchange rates and the
/// conversion history log. Keys are ordered, so the (base, target)
/// prefix doubles as the lookup index.
pub struct Store {
    pub rates: RateCache,
    pub history: HistoryStore,
    // Dropping the keyspace flushes journals, keep it alive with the
    // partitions derived from it.
    _keyspace: fjall::Keyspace,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = fjall::Config::new(path).open()?;

        let rates = RateCache::new(
            keyspace.open_partition("rates", PartitionCreateOptions::default())?,
        );
        let history = HistoryStore::new(
            keyspace.open_partition("history", PartitionCreateOptions::default())?,
        )?;

        Ok(Store {
            rates,
            history,
            _keyspace: keyspace,
        })
    }
}
