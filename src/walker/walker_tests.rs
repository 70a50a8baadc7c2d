use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
    },
};

use async_trait::async_trait;

use super::*;
use crate::core::Stat;

const KANTO: [(&str, &[&str]); 20] = [
    ("bulbasaur", &["grass", "poison"]),
    ("ivysaur", &["grass", "poison"]),
    ("venusaur", &["grass", "poison"]),
    ("charmander", &["fire"]),
    ("charmeleon", &["fire"]),
    ("charizard", &["fire", "flying"]),
    ("squirtle", &["water"]),
    ("wartortle", &["water"]),
    ("blastoise", &["water"]),
    ("caterpie", &["bug"]),
    ("metapod", &["bug"]),
    ("butterfree", &["bug", "flying"]),
    ("weedle", &["bug", "poison"]),
    ("kakuna", &["bug", "poison"]),
    ("beedrill", &["bug", "poison"]),
    ("pidgey", &["normal", "flying"]),
    ("pidgeotto", &["normal", "flying"]),
    ("pidgeot", &["normal", "flying"]),
    ("rattata", &["normal"]),
    ("raticate", &["normal"]),
];

fn kanto_record(id: u32) -> HydratedRecord {
    let (name, types) = KANTO[id as usize - 1];
    HydratedRecord {
        id,
        name: name.to_string(),
        image: Some(format!("https://img/{id}.png")),
        types: types.iter().map(|t| t.to_string()).collect(),
        stats: vec![Stat { name: "hp".to_string(), value: (40 + id).to_string() }],
        species: None,
    }
}

#[derive(Default)]
struct FakeProvider {
    records: HashMap<u32, HydratedRecord>,
    unavailable: HashSet<u32>,
    index_failures: AtomicUsize,
    yield_on_fetch: bool,
    fetches: AtomicUsize,
    index_fetches: AtomicUsize,
}

impl FakeProvider {
    fn kanto() -> Self {
        Self {
            records: (1..=KANTO.len() as u32).map(|id| (id, kanto_record(id))).collect(),
            ..Self::default()
        }
    }

    fn without(mut self, id: u32) -> Self {
        self.records.remove(&id);
        self
    }

    fn unavailable_for(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.unavailable.extend(ids);
        self
    }

    fn failing_index(self, times: usize) -> Self {
        self.index_failures.store(times, Ordering::SeqCst);
        self
    }

    fn yielding(mut self) -> Self {
        self.yield_on_fetch = true;
        self
    }
}

#[async_trait]
impl CreatureProvider for Arc<FakeProvider> {
    async fn fetch_record(&self, id: u32) -> Result<HydratedRecord> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.yield_on_fetch {
            tokio::task::yield_now().await;
        }
        if self.unavailable.contains(&id) {
            return Err(PokedexError::ProviderUnavailable("connection refused".to_string()));
        }
        self.records.get(&id).cloned().ok_or(PokedexError::RecordNotFound(id))
    }

    async fn fetch_index(&self, limit: u32) -> Result<Vec<IndexEntry>> {
        self.index_fetches.fetch_add(1, Ordering::SeqCst);
        let remaining = self.index_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.index_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(PokedexError::Status { status: 503, url: "pokemon?limit".to_string() });
        }

        let mut entries: Vec<IndexEntry> = self
            .records
            .values()
            .filter(|r| r.id <= limit)
            .map(|r| IndexEntry { id: r.id, name: r.name.clone() })
            .collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }
}

fn options(page_size: u32, total_records: u32) -> WalkOptions {
    WalkOptions {
        page_size,
        total_records,
        search_candidate_limit: 50,
        search_batch_size: 10,
        filtered_total_ratio: 0.7,
    }
}

fn walker(
    provider: FakeProvider,
    options: WalkOptions,
) -> (Arc<FakeProvider>, FetchWalker<Arc<FakeProvider>>) {
    let provider = Arc::new(provider);
    let walker = FetchWalker::new(provider.clone(), Arc::new(RecordCache::new()), options);
    (provider, walker)
}

#[tokio::test]
async fn test_browse_pages_are_disjoint_contiguous_prefix() {
    let (_, walker) = walker(FakeProvider::kanto(), options(3, 20));

    let mut seen = Vec::new();
    for page in 1..=7 {
        let result = walker.get_page(&PageRequest::browse(page)).await.unwrap();
        let ids = result.ids();
        assert!(ids.iter().all(|id| !seen.contains(id)), "page {page} overlaps: {ids:?}");
        seen.extend(ids);
        assert_eq!(seen, (1..=seen.len() as u32).collect::<Vec<_>>());
    }

    assert_eq!(seen.len(), 20);
    let exhausted = walker.get_page(&PageRequest::browse(8)).await.unwrap();
    assert!(exhausted.is_empty());
}

#[tokio::test]
async fn test_get_page_is_idempotent_and_served_from_cache() {
    let (provider, walker) = walker(FakeProvider::kanto(), options(3, 20));

    let first = walker.get_page(&PageRequest::browse(2)).await.unwrap();
    let fetches_after_first = provider.fetches.load(Ordering::SeqCst);
    let second = walker.get_page(&PageRequest::browse(2)).await.unwrap();

    assert_eq!(first.ids(), vec![4, 5, 6]);
    assert_eq!(first.ids(), second.ids());
    for (a, b) in first.records.iter().zip(&second.records) {
        assert_eq!(a.as_ref(), b.as_ref());
    }
    assert_eq!(provider.fetches.load(Ordering::SeqCst), fetches_after_first);
}

#[tokio::test]
async fn test_returned_records_are_cached() {
    let (_, walker) = walker(FakeProvider::kanto(), options(4, 20));

    let result = walker.get_page(&PageRequest::new(1, "", "bug")).await.unwrap();

    assert!(!result.is_empty());
    for record in &result.records {
        let cached = walker.cache().peek(record.id).unwrap();
        assert_eq!(cached.as_ref(), record.as_ref());
    }
}

#[tokio::test]
async fn test_search_matches_name_substring() {
    let (_, walker) = walker(FakeProvider::kanto(), options(24, 20));

    let result = walker.get_page(&PageRequest::new(1, "char", "")).await.unwrap();

    assert_eq!(result.ids(), vec![4, 5, 6]);
    assert!(result.records.iter().all(|r| r.name.contains("char")));
    assert!(result.records.iter().any(|r| r.name == "charizard"));
    assert_eq!(result.total_pages, 1);
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_capped_at_page_size() {
    let (_, walker) = walker(FakeProvider::kanto(), options(3, 20));

    let result = walker.get_page(&PageRequest::new(1, "  A ", "")).await.unwrap();

    assert_eq!(result.records.len(), 3);
    assert!(result.records.iter().all(|r| r.name.contains('a')));
}

#[tokio::test]
async fn test_search_honours_type_filter() {
    let (_, walker) = walker(FakeProvider::kanto(), options(24, 20));

    let result = walker.get_page(&PageRequest::new(1, "char", "flying")).await.unwrap();

    assert_eq!(result.ids(), vec![6]);
}

#[tokio::test]
async fn test_search_candidates_capped() {
    let mut opts = options(24, 20);
    opts.search_candidate_limit = 2;
    opts.search_batch_size = 1;
    let (provider, walker) = walker(FakeProvider::kanto(), opts);

    let result = walker.get_page(&PageRequest::new(1, "e", "")).await.unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_search_is_single_page() {
    let (_, walker) = walker(FakeProvider::kanto(), options(24, 20));

    let second = walker.get_page(&PageRequest::new(2, "char", "")).await.unwrap();

    assert!(second.is_empty());
    assert_eq!(second.total_pages, 1);
}

#[tokio::test]
async fn test_search_reuses_records_from_browse() {
    let (provider, walker) = walker(FakeProvider::kanto(), options(3, 20));

    walker.get_page(&PageRequest::browse(1)).await.unwrap();
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 3);

    let result = walker.get_page(&PageRequest::new(1, "saur", "")).await.unwrap();

    assert_eq!(result.ids(), vec![1, 2, 3]);
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_type_filter_only_returns_matching_records() {
    let (_, walker) = walker(FakeProvider::kanto(), options(2, 20));

    let first = walker.get_page(&PageRequest::new(1, "", "fire")).await.unwrap();
    let second = walker.get_page(&PageRequest::new(2, "", "fire")).await.unwrap();

    assert!(first.records.iter().all(|r| r.has_type("fire")));
    assert_eq!(first.ids(), vec![4, 5]);
    assert_eq!(second.ids(), vec![6]);
}

#[tokio::test]
async fn test_page_beyond_end_is_empty() {
    let (_, walker) = walker(FakeProvider::kanto(), options(24, 20));

    let result = walker.get_page(&PageRequest::browse(100)).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.total_pages, 1);
}

#[tokio::test]
async fn test_page_zero_is_rejected() {
    let (_, walker) = walker(FakeProvider::kanto(), options(24, 20));

    let result = walker.get_page(&PageRequest::browse(0)).await;

    assert!(matches!(result, Err(PokedexError::InvalidPage(0))));
}

#[tokio::test]
async fn test_not_found_ids_are_skipped() {
    let (_, walker) = walker(FakeProvider::kanto().without(5), options(3, 10));

    let first = walker.get_page(&PageRequest::browse(1)).await.unwrap();
    let second = walker.get_page(&PageRequest::browse(2)).await.unwrap();

    assert_eq!(first.ids(), vec![1, 2, 3]);
    assert_eq!(second.ids(), vec![4, 6, 7]);
    assert!(!walker.cache().contains(5));
}

#[tokio::test]
async fn test_minority_provider_failures_are_skipped() {
    let (_, walker) = walker(FakeProvider::kanto().unavailable_for([2]), options(3, 20));

    let result = walker.get_page(&PageRequest::browse(1)).await.unwrap();

    assert_eq!(result.ids(), vec![1, 3, 4]);
}

#[tokio::test]
async fn test_majority_provider_failures_surface() {
    let (_, walker) = walker(FakeProvider::kanto().unavailable_for(1..=20), options(3, 20));

    let browse = walker.get_page(&PageRequest::browse(1)).await;
    let search = walker.get_page(&PageRequest::new(1, "char", "")).await;

    assert!(matches!(browse, Err(PokedexError::ProviderUnavailable(_))));
    assert!(matches!(search, Err(PokedexError::ProviderUnavailable(_))));
}

#[tokio::test]
async fn test_failing_id_stays_skipped_once_neighbours_are_cached() {
    let (_, walker) = walker(FakeProvider::kanto().unavailable_for([3]), options(3, 20));

    let first = walker.get_page(&PageRequest::browse(1)).await.unwrap();
    let second = walker.get_page(&PageRequest::browse(1)).await.unwrap();

    assert_eq!(first.ids(), vec![1, 2, 4]);
    assert_eq!(second.ids(), first.ids());
}

#[tokio::test]
async fn test_unreachable_provider_stops_after_failure_streak() {
    let (provider, walker) = walker(FakeProvider::kanto().unavailable_for(1..=20), options(3, 20));

    let result = walker.get_page(&PageRequest::browse(1)).await;

    assert!(matches!(result, Err(PokedexError::ProviderUnavailable(_))));
    assert_eq!(provider.fetches.load(Ordering::SeqCst), MAX_FAILURE_STREAK);
}

#[tokio::test]
async fn test_index_failure_surfaces_and_retries() {
    let (provider, walker) = walker(FakeProvider::kanto().failing_index(1), options(24, 20));
    let request = PageRequest::new(1, "squirt", "");

    let failed = walker.get_page(&request).await;
    assert!(matches!(failed, Err(PokedexError::IndexFetchFailed(_))));

    let retried = walker.get_page(&request).await.unwrap();
    assert_eq!(retried.ids(), vec![7]);

    walker.get_page(&PageRequest::new(1, "pidg", "")).await.unwrap();
    assert_eq!(provider.index_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_record_lookup_uses_cache() {
    let (provider, walker) = walker(FakeProvider::kanto(), options(3, 20));

    walker.get_page(&PageRequest::browse(1)).await.unwrap();
    let record = walker.record(2).await.unwrap();

    assert_eq!(record.name, "ivysaur");
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 3);
    assert!(matches!(walker.record(42).await, Err(PokedexError::RecordNotFound(42))));
}

#[tokio::test]
async fn test_superseded_request_is_discarded() {
    let (_, walker) = walker(FakeProvider::kanto().yielding(), options(3, 20));
    let tracker = RequestTracker::new();

    let first_request = PageRequest::browse(1);
    let second_request = PageRequest::new(1, "", "water");
    let (first, second) = futures::join!(
        walker.get_latest_page(&tracker, &first_request),
        walker.get_latest_page(&tracker, &second_request),
    );

    assert!(first.unwrap().is_none());
    assert_eq!(second.unwrap().unwrap().ids(), vec![7, 8, 9]);
}

#[test]
fn test_estimated_total_pages() {
    let options = WalkOptions::default();

    assert_eq!(options.estimated_total_pages(&TypeFilter::Any), 7);
    assert_eq!(options.estimated_total_pages(&TypeFilter::parse("fire")), 5);
}
