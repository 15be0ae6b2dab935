//! Paged Data Controller
//!
//! Orchestrates fetching, caching, pagination, incremental loading, debounced
//! search, throttled filtering and optimistic batch mutation over an injected
//! fetch source. State is published through a `watch` channel.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::cache::{derive_key, SharedCache};
use crate::config::ControllerOptions;
use crate::controller::patch::apply_fields;
use crate::controller::{
    BatchUpdate, DataState, FetchSource, Identity, LoadPhase, QueryParams, RecordId,
};
use crate::limiter::{Debouncer, Throttle};
use crate::window::VisibleRange;

/// What to do with a successful response.
#[derive(Debug, Clone, Copy)]
enum Apply {
    /// Replace `data`; `page` is recorded as the current page when given
    Replace { page: Option<u32> },
    /// Append to `data` and advance to `page`
    Append { page: u32 },
    /// Replace `search_results`
    Search,
}

struct Inner<T> {
    source: Arc<dyn FetchSource<T>>,
    identity: Identity<T>,
    cache: SharedCache<Vec<T>>,
    options: ControllerOptions,
    state: watch::Sender<DataState<T>>,
    /// Last request number issued for the main collection
    data_seq: AtomicU64,
    /// Last request number issued for search results
    search_seq: AtomicU64,
    in_flight: AtomicUsize,
    filters_in_flight: AtomicUsize,
    page_load: AtomicBool,
    search: Debouncer<String>,
    filter: Throttle<QueryParams>,
}

/// Releases the page-load flag when dropped.
struct PageLoadGuard<'a>(&'a AtomicBool);

impl<'a> PageLoadGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PageLoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// == Paged Data Controller ==
/// Data access controller for one collection of records.
///
/// Cloning is cheap and every clone drives the same state. Operations never
/// return errors: failures are logged and surface as [`DataState::error`].
///
/// Only the response to the most recently issued request is applied. A slower
/// response to an older request is returned to its caller but leaves the
/// published state untouched.
pub struct PagedDataController<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for PagedDataController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> PagedDataController<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a controller.
    ///
    /// # Arguments
    /// * `source` - Fetch function returning records for a parameter set
    /// * `identity` - Accessor used by batch operations to match records
    /// * `cache` - Cache shared with any controllers that invalidate together
    /// * `options` - Paging, cache and rate limiting options; a zero page size
    ///   or non-positive row height falls back to the default
    pub fn new<S, I>(
        source: S,
        identity: I,
        cache: SharedCache<Vec<T>>,
        options: ControllerOptions,
    ) -> Self
    where
        S: FetchSource<T>,
        I: Fn(&T) -> RecordId + Send + Sync + 'static,
    {
        let options = options.validated();
        let inner = Arc::new_cyclic(|weak: &Weak<Inner<T>>| {
            let search_target = weak.clone();
            let filter_target = weak.clone();

            Inner {
                source: Arc::new(source),
                identity: Arc::new(identity),
                cache,
                state: watch::Sender::new(DataState::new(&options)),
                data_seq: AtomicU64::new(0),
                search_seq: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                filters_in_flight: AtomicUsize::new(0),
                page_load: AtomicBool::new(false),
                search: Debouncer::new(options.debounce_delay, move |query: String| {
                    let target = search_target.clone();
                    async move {
                        if let Some(inner) = target.upgrade() {
                            PagedDataController { inner }.run_search(query).await;
                        }
                    }
                }),
                filter: Throttle::new(options.throttle_delay, move |params: QueryParams| {
                    let target = filter_target.clone();
                    async move {
                        if let Some(inner) = target.upgrade() {
                            PagedDataController { inner }.run_filter(params).await;
                        }
                    }
                }),
                options,
            }
        });

        info!(
            cache_key = %inner.options.cache_key,
            page_size = inner.options.page_size,
            "data controller created"
        );
        Self { inner }
    }

    // == State Access ==
    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<DataState<T>> {
        self.inner.state.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> DataState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.inner.options
    }

    pub fn cache(&self) -> &SharedCache<Vec<T>> {
        &self.inner.cache
    }

    // == Fetch ==
    /// Loads the collection for `params`, replacing `data`.
    ///
    /// With `use_cache`, a live cache entry is returned without calling the
    /// source, and a fresh result is cached for the configured TTL. Returns an
    /// empty vector on failure.
    pub async fn fetch(&self, params: QueryParams, use_cache: bool) -> Vec<T> {
        let key = derive_key(&self.inner.options.cache_key, Some(&params));

        if use_cache {
            let cached = self.inner.cache.write().await.get(&key);
            if let Some(items) = cached {
                debug!(key = %key, count = items.len(), "serving collection from cache");
                let page_size = self.inner.options.page_size;
                // A hit supersedes any request still in flight.
                self.inner.data_seq.fetch_add(1, Ordering::SeqCst);
                self.inner.state.send_modify(|state| {
                    state.total_count = items.len();
                    state.has_more = items.len() >= page_size;
                    state.data = items.clone();
                    state.error = None;
                    state.phase = LoadPhase::Ready;
                });
                return items;
            }
        }

        self.request(params, Apply::Replace { page: None }, use_cache.then_some(key))
            .await
    }

    // == Fetch Page ==
    /// Loads page `page` (1-based; 0 is treated as 1), bypassing the cache.
    pub async fn fetch_page(&self, page: u32, params: QueryParams) -> Vec<T> {
        let page = page.max(1);
        let params = self.page_params(page, params);
        self.request(params, Apply::Replace { page: Some(page) }, None)
            .await
    }

    // == Load More ==
    /// Appends the next page to `data`.
    ///
    /// Does nothing while another page load or request is in flight, or once
    /// the source has returned a short page. Returns the number of records
    /// fetched.
    pub async fn load_more(&self) -> usize {
        let Some(_guard) = PageLoadGuard::acquire(&self.inner.page_load) else {
            trace!("load_more: page load already in flight");
            return 0;
        };

        let (next_page, filters) = {
            let state = self.inner.state.borrow();
            if state.loading || !state.has_more {
                trace!(
                    loading = state.loading,
                    has_more = state.has_more,
                    "load_more: nothing to do"
                );
                return 0;
            }
            (state.current_page + 1, state.filter_params.clone())
        };

        let params = self.page_params(next_page, filters);
        let items = self
            .request(params, Apply::Append { page: next_page }, None)
            .await;
        items.len()
    }

    // == Search ==
    /// Records `query` and schedules a debounced search.
    ///
    /// Results land in `search_results`; a blank query clears them without
    /// fetching. Must be called from within a tokio runtime.
    pub fn search(&self, query: impl Into<String>) {
        let query = query.into();
        self.inner
            .state
            .send_modify(|state| state.search_query = query.clone());
        self.inner.search.call(query);
    }

    async fn run_search(&self, query: String) {
        if query.trim().is_empty() {
            self.inner.search_seq.fetch_add(1, Ordering::SeqCst);
            self.inner.state.send_modify(|state| {
                state.search_results.clear();
                state.is_searching = false;
            });
            return;
        }

        let params = QueryParams::new().with("search", query);
        let results = self.request(params, Apply::Search, None).await;
        debug!(count = results.len(), "search finished");
    }

    // == Filter ==
    /// Merges `params` into the accumulated filters and requests a throttled reload.
    ///
    /// The reload fetches the first page of the filtered collection, so a
    /// following `load_more` continues from page 2.
    ///
    /// Returns false when the reload was dropped by the throttle; the merged
    /// filters are kept either way. Must be called from within a tokio runtime.
    pub fn filter(&self, params: QueryParams) -> bool {
        let mut merged = QueryParams::new();
        self.inner.state.send_modify(|state| {
            state.filter_params.merge(&params);
            merged = state.filter_params.clone();
        });

        let started = self.inner.filter.call(merged);
        if !started {
            trace!("filter: reload dropped by throttle");
        }
        started
    }

    async fn run_filter(&self, params: QueryParams) {
        let inner = &self.inner;
        inner.state.send_modify(|state| {
            inner.filters_in_flight.fetch_add(1, Ordering::SeqCst);
            state.is_filtering = true;
        });

        let params = self.page_params(1, params);
        self.request(params, Apply::Replace { page: Some(1) }, None)
            .await;

        inner.state.send_modify(|state| {
            let remaining = inner.filters_in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            state.is_filtering = remaining > 0;
        });
    }

    // == Batch Delete ==
    /// Removes every record whose identity is in `ids` and caches the result
    /// under the base key. Returns the number of records removed.
    pub async fn batch_delete(&self, ids: &[RecordId]) -> usize {
        let ids: HashSet<RecordId> = ids.iter().cloned().collect();
        let identity = &self.inner.identity;
        let mut removed = 0;
        let mut snapshot = Vec::new();

        self.inner.state.send_modify(|state| {
            let before = state.data.len();
            state.data.retain(|record| !ids.contains(&(**identity)(record)));
            removed = before - state.data.len();
            state.total_count = state.data.len();
            snapshot = state.data.clone();
        });

        debug!(removed, "batch delete applied");
        self.store_base(snapshot).await;
        removed
    }

    // == Clear Cache ==
    /// Empties the whole shared cache, including entries of other controllers.
    pub async fn clear_cache(&self) {
        let mut cache = self.inner.cache.write().await;
        let dropped = cache.len();
        cache.clear();
        info!(dropped, "cache cleared");
    }

    // == Virtual Scroll ==
    pub fn update_scroll_position(&self, scroll_top: f64, container_height: f64) {
        self.inner.state.send_modify(|state| {
            state.scroll_top = scroll_top;
            state.container_height = container_height;
        });
    }

    /// Sets the row height; non-positive heights are ignored.
    pub fn update_item_height(&self, item_height: f64) {
        if !(item_height > 0.0) {
            warn!(item_height, "ignoring non-positive item height");
            return;
        }
        self.inner
            .state
            .send_modify(|state| state.item_height = item_height);
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.inner
            .state
            .borrow()
            .visible_range(self.inner.options.enable_virtual_scroll)
    }

    /// Records to render: the scrolled window, or everything when virtual
    /// scrolling is disabled.
    pub fn visible_items(&self) -> Vec<T> {
        self.inner
            .state
            .borrow()
            .visible_items(self.inner.options.enable_virtual_scroll)
            .to_vec()
    }

    // == Internals ==
    fn page_params(&self, page: u32, params: QueryParams) -> QueryParams {
        let page_size = self.inner.options.page_size as u64;
        let offset = (u64::from(page) - 1) * page_size;
        params.with("offset", offset).with("limit", page_size)
    }

    async fn store_base(&self, items: Vec<T>) {
        let key = derive_key(&self.inner.options.cache_key, None);
        self.inner
            .cache
            .write()
            .await
            .set(key, items, self.inner.options.cache_ttl);
    }

    /// Calls the source and applies the outcome if this is still the latest
    /// request on its channel.
    async fn request(
        &self,
        params: QueryParams,
        apply: Apply,
        cache_key: Option<String>,
    ) -> Vec<T> {
        let inner = &self.inner;
        let counter = match apply {
            Apply::Search => &inner.search_seq,
            _ => &inner.data_seq,
        };
        let seq = counter.fetch_add(1, Ordering::SeqCst) + 1;

        inner.state.send_modify(|state| {
            inner.in_flight.fetch_add(1, Ordering::SeqCst);
            state.loading = true;
            state.error = None;
            match apply {
                Apply::Search => state.is_searching = true,
                _ => state.phase = LoadPhase::Loading,
            }
        });

        let started = Instant::now();
        let outcome = inner.source.fetch(params).await;
        debug!(
            seq,
            ?apply,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "fetch finished"
        );

        if let (Ok(items), Some(key)) = (&outcome, cache_key) {
            inner
                .cache
                .write()
                .await
                .set(key, items.clone(), inner.options.cache_ttl);
        }

        let is_latest = counter.load(Ordering::SeqCst) == seq;
        if !is_latest {
            debug!(seq, "discarding superseded response");
        }

        let page_size = inner.options.page_size;
        inner.state.send_modify(|state| {
            let remaining = inner.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            state.loading = remaining > 0;
            if !is_latest {
                return;
            }
            match &outcome {
                Ok(items) => apply_items(state, apply, items, page_size),
                Err(err) => {
                    state.error = Some(err.to_string());
                    match apply {
                        Apply::Search => {
                            state.search_results.clear();
                            state.is_searching = false;
                        }
                        _ => state.phase = LoadPhase::Error,
                    }
                }
            }
        });

        match outcome {
            Ok(items) => items,
            Err(err) => {
                error!(error = %err, "fetch failed");
                Vec::new()
            }
        }
    }
}

impl<T> PagedDataController<T>
where
    T: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    // == Batch Update ==
    /// Applies partial updates to the first record matching each id and
    /// caches the result under the base key.
    ///
    /// Unknown ids and patches that do not fit the record type are skipped.
    /// Returns the number of patches applied.
    pub async fn batch_update(&self, updates: Vec<BatchUpdate>) -> usize {
        let identity = &self.inner.identity;
        let mut applied = 0;
        let mut snapshot = Vec::new();

        self.inner.state.send_modify(|state| {
            for update in &updates {
                let Some(record) = state
                    .data
                    .iter_mut()
                    .find(|record| (**identity)(&**record) == update.id)
                else {
                    debug!(id = %update.id, "batch update: no matching record");
                    continue;
                };
                match apply_fields(&*record, &update.fields) {
                    Ok(patched) => {
                        *record = patched;
                        applied += 1;
                    }
                    Err(err) => warn!(id = %update.id, error = %err, "batch update: patch skipped"),
                }
            }
            snapshot = state.data.clone();
        });

        debug!(applied, requested = updates.len(), "batch update applied");
        self.store_base(snapshot).await;
        applied
    }
}

fn apply_items<T: Clone>(state: &mut DataState<T>, apply: Apply, items: &[T], page_size: usize) {
    match apply {
        Apply::Replace { page } => {
            state.data = items.to_vec();
            state.total_count = items.len();
            state.has_more = items.len() >= page_size;
            if let Some(page) = page {
                state.current_page = page;
            }
            state.phase = LoadPhase::Ready;
        }
        Apply::Append { page } => {
            if items.is_empty() {
                state.has_more = false;
            } else {
                state.data.extend_from_slice(items);
                state.total_count = state.data.len();
                state.current_page = page;
                state.has_more = items.len() >= page_size;
            }
            state.phase = LoadPhase::Ready;
        }
        Apply::Search => {
            state.search_results = items.to_vec();
            state.is_searching = false;
        }
    }
}
