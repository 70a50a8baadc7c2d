//! Session-lived memo of hydrated records, keyed by provider id.
//!
//! Entries are never evicted or updated in place: the upstream data set is static, so a
//! record fetched once stays valid for the whole session.

use std::{
    collections::HashMap,
    sync::Arc,
};

use parking_lot::RwLock;

use crate::core::HydratedRecord;

pub mod stats;

pub use stats::CacheStats;

#[derive(Debug, Default)]
pub struct RecordCache {
    records: RwLock<HashMap<u32, Arc<HydratedRecord>>>,
    stats: CacheStats,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a record and counts the hit or miss.
    pub fn get(&self, id: u32) -> Option<Arc<HydratedRecord>> {
        let found = self.records.read().get(&id).cloned();
        match found {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        found
    }

    /// Stores a record under its id. Two racing fetches of the same id both land here;
    /// the later one overwrites an identical value.
    pub fn insert(&self, record: HydratedRecord) -> Arc<HydratedRecord> {
        let record = Arc::new(record);
        self.records.write().insert(record.id, record.clone());
        self.stats.record_insert();
        record
    }

    pub fn contains(&self, id: u32) -> bool {
        self.records.read().contains_key(&id)
    }

    /// Reads a record without touching the statistics.
    pub(crate) fn peek(&self, id: u32) -> Option<Arc<HydratedRecord>> {
        self.records.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
