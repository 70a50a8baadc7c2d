//! Assembles one page of hydrated records from a provider that can only be queried one
//! id at a time.
//!
//! Browse mode walks ids upward from 1 and counts only records that pass the type filter
//! toward the skip and collect quotas. Search mode filters the provider's name index and
//! resolves a bounded number of candidates in small concurrent batches. Both modes go
//! through the shared [`RecordCache`].

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::OnceCell;
use tracing::{
    debug,
    info,
    warn,
};

use crate::{
    cache::RecordCache,
    core::{
        HydratedRecord,
        IndexEntry,
        PageRequest,
        PageResult,
        PokedexError,
        Result,
        Settings,
        TypeFilter,
    },
    provider::CreatureProvider,
};

pub mod token;

pub use token::{
    RequestToken,
    RequestTracker,
};

#[derive(Debug, Clone, PartialEq)]
pub struct WalkOptions {
    pub page_size: u32,
    pub total_records: u32,
    pub search_candidate_limit: usize,
    pub search_batch_size: usize,
    pub filtered_total_ratio: f64,
}

impl Default for WalkOptions {
    fn default() -> Self {
        WalkOptions::from(&Settings::default())
    }
}

impl From<&Settings> for WalkOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            page_size: settings.page_size.max(1),
            total_records: settings.total_records,
            search_candidate_limit: settings.search_candidate_limit,
            search_batch_size: settings.search_batch_size.max(1),
            filtered_total_ratio: settings.filtered_total_ratio,
        }
    }
}

impl WalkOptions {
    /// Page count for browse mode. With a type filter active this is a fixed fraction of
    /// the id space, not a count.
    pub fn estimated_total_pages(&self, filter: &TypeFilter) -> u32 {
        let estimate = if filter.is_active() {
            (self.total_records as f64 * self.filtered_total_ratio).floor() as u32
        } else {
            self.total_records
        };
        estimate.div_ceil(self.page_size.max(1))
    }
}

/// Consecutive provider failures after which a walk gives up instead of trying the
/// remaining ids.
const MAX_FAILURE_STREAK: usize = 5;

/// Counts the ids resolved while building one page, cache hits included. Per-id failures
/// are skipped unless they are a strict majority of those ids or arrive in an unbroken
/// streak of `MAX_FAILURE_STREAK`.
#[derive(Debug, Default)]
struct FetchTally {
    resolved: usize,
    failures: usize,
    streak: usize,
    last_error: Option<PokedexError>,
}

impl FetchTally {
    fn record(
        &mut self,
        id: u32,
        result: Result<Arc<HydratedRecord>>,
    ) -> Option<Arc<HydratedRecord>> {
        self.resolved += 1;
        match result {
            Ok(record) => {
                self.streak = 0;
                Some(record)
            }
            Err(e) if e.is_not_found() => {
                debug!("Skipping {}: not found", id);
                self.streak = 0;
                None
            }
            Err(e) => {
                warn!("Skipping {}: {}", id, e);
                self.failures += 1;
                self.streak += 1;
                self.last_error = Some(e);
                None
            }
        }
    }

    fn should_abort(&self) -> bool {
        self.streak >= MAX_FAILURE_STREAK
    }

    fn into_result(self) -> Result<()> {
        match self.last_error {
            Some(e) if self.streak >= MAX_FAILURE_STREAK || self.failures * 2 > self.resolved => {
                Err(e)
            }
            _ => Ok(()),
        }
    }
}

pub struct FetchWalker<P: CreatureProvider> {
    provider: P,
    cache: Arc<RecordCache>,
    index: OnceCell<Vec<IndexEntry>>,
    options: WalkOptions,
}

impl<P: CreatureProvider> FetchWalker<P> {
    pub fn new(provider: P, cache: Arc<RecordCache>, options: WalkOptions) -> Self {
        Self { provider, cache, index: OnceCell::new(), options }
    }

    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    pub async fn get_page(&self, request: &PageRequest) -> Result<PageResult> {
        if request.page == 0 {
            return Err(PokedexError::InvalidPage(request.page));
        }

        let result = match request.search_needle() {
            Some(needle) => self.search_page(&needle, request).await?,
            None => self.browse_page(request).await?,
        };

        info!(
            "Page {} (search: {:?}, type: {}) -> {} records, ~{} pages, cache {} entries",
            request.page,
            request.search,
            request.type_filter,
            result.records.len(),
            result.total_pages,
            self.cache.len()
        );
        Ok(result)
    }

    /// Runs `get_page` under a fresh token and drops the result if another request was
    /// started before this one finished.
    pub async fn get_latest_page(
        &self,
        tracker: &RequestTracker,
        request: &PageRequest,
    ) -> Result<Option<PageResult>> {
        let token = tracker.begin();
        let result = self.get_page(request).await;

        if !tracker.is_current(token) {
            debug!("Discarding superseded page request {:?}", token);
            return Ok(None);
        }
        result.map(Some)
    }

    /// Cache-or-fetch lookup of a single record.
    pub async fn record(&self, id: u32) -> Result<Arc<HydratedRecord>> {
        if let Some(record) = self.cache.get(id) {
            debug!("Cache hit for {}", id);
            return Ok(record);
        }

        debug!("Fetching {}", id);
        self.provider.fetch_record(id).await.map(|record| self.cache.insert(record))
    }

    async fn browse_page(&self, request: &PageRequest) -> Result<PageResult> {
        let page_size = self.options.page_size as usize;
        let skip = (request.page as usize - 1).saturating_mul(page_size);

        let mut tally = FetchTally::default();
        let mut records = Vec::with_capacity(page_size);
        let mut skipped = 0;
        let mut id = 1;

        while records.len() < page_size && id <= self.options.total_records {
            let result = self.record(id).await;
            if let Some(record) = tally.record(id, result) {
                if request.type_filter.matches(&record) {
                    if skipped < skip {
                        skipped += 1;
                    } else {
                        records.push(record);
                    }
                }
            }
            if tally.should_abort() {
                break;
            }
            id += 1;
        }

        tally.into_result()?;

        Ok(PageResult {
            records,
            total_pages: self.options.estimated_total_pages(&request.type_filter),
        })
    }

    async fn search_page(&self, needle: &str, request: &PageRequest) -> Result<PageResult> {
        // Search results are never paged.
        if request.page > 1 {
            return Ok(PageResult { records: Vec::new(), total_pages: 1 });
        }

        let page_size = self.options.page_size as usize;
        let candidates: Vec<u32> = self
            .name_index()
            .await?
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(needle))
            .take(self.options.search_candidate_limit)
            .map(|entry| entry.id)
            .collect();
        debug!("{} index matches for {:?}", candidates.len(), needle);

        let mut tally = FetchTally::default();
        let mut records = Vec::with_capacity(page_size);

        for batch in candidates.chunks(self.options.search_batch_size) {
            let resolved = join_all(batch.iter().map(|&id| self.record(id))).await;

            for (&id, result) in batch.iter().zip(resolved) {
                if let Some(record) = tally.record(id, result) {
                    if request.type_filter.matches(&record) && records.len() < page_size {
                        records.push(record);
                    }
                }
            }

            if records.len() >= page_size || tally.should_abort() {
                break;
            }
        }

        tally.into_result()?;

        Ok(PageResult { records, total_pages: 1 })
    }

    async fn name_index(&self) -> Result<&Vec<IndexEntry>> {
        self.index
            .get_or_try_init(|| async {
                let entries = self
                    .provider
                    .fetch_index(self.options.total_records)
                    .await
                    .map_err(|e| PokedexError::IndexFetchFailed(e.to_string()))?;
                info!("Loaded name index with {} entries", entries.len());
                Ok::<_, PokedexError>(entries)
            })
            .await
    }
}

#[cfg(test)]
mod walker_tests;
