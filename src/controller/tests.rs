//! Behavioural tests for the paged data controller.
//!
//! All tests run on a paused clock so delays in the fake source, the debounce
//! and the throttle are deterministic.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cache::{derive_key, shared_cache, DEFAULT_TTL};
use crate::config::ControllerOptions;
use crate::controller::{BatchUpdate, LoadPhase, PagedDataController, QueryParams, RecordId};
use crate::error::{DataError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Listing {
    id: i64,
    name: String,
    price: u32,
}

fn listings(ids: std::ops::Range<i64>) -> Vec<Listing> {
    ids.map(|id| Listing {
        id,
        name: format!("listing-{}", id),
        price: 1000 + id as u32,
    })
    .collect()
}

type CallLog = Arc<Mutex<Vec<QueryParams>>>;

/// Controller over a fake source that logs every call and answers after the
/// returned delay.
fn controller_with<F>(
    options: ControllerOptions,
    respond: F,
) -> (PagedDataController<Listing>, CallLog)
where
    F: Fn(&QueryParams) -> (Duration, Result<Vec<Listing>>) + Send + Sync + 'static,
{
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let log = calls.clone();
    let source = move |params: QueryParams| {
        log.lock().unwrap().push(params.clone());
        let (delay, outcome) = respond(&params);
        async move {
            tokio::time::sleep(delay).await;
            outcome
        }
    };

    let controller = PagedDataController::new(
        source,
        |listing: &Listing| RecordId::from(listing.id),
        shared_cache(DEFAULT_TTL),
        options,
    );
    (controller, calls)
}

fn instant(items: Vec<Listing>) -> (Duration, Result<Vec<Listing>>) {
    (Duration::ZERO, Ok(items))
}

/// Source serving `total` listings, paged by `offset`/`limit` when present.
fn paged_backend(total: i64) -> impl Fn(&QueryParams) -> (Duration, Result<Vec<Listing>>) {
    move |params| {
        let offset = params.get("offset").and_then(Value::as_i64).unwrap_or(0);
        let limit = params.get("limit").and_then(Value::as_i64).unwrap_or(total);
        let end = (offset + limit).min(total);
        instant(listings(offset.min(end)..end))
    }
}

fn call_count(calls: &CallLog) -> usize {
    calls.lock().unwrap().len()
}

// == Fetch ==

#[tokio::test(start_paused = true)]
async fn test_fetch_populates_state_and_cache() {
    let (controller, calls) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..3)));

    let items = controller.fetch(QueryParams::new(), true).await;

    assert_eq!(items.len(), 3);
    let state = controller.state();
    assert_eq!(state.data, listings(0..3));
    assert_eq!(state.total_count, 3);
    assert_eq!(state.phase, LoadPhase::Ready);
    assert!(!state.loading);
    assert!(!state.has_more, "3 < page size");
    assert_eq!(call_count(&calls), 1);
    assert_eq!(controller.cache().read().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cached_fetch_skips_source() {
    let (controller, calls) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..3)));
    let params = QueryParams::new().with("type", "HOUSE");

    controller.fetch(params.clone(), true).await;
    let again = controller.fetch(params, true).await;

    assert_eq!(again, listings(0..3));
    assert_eq!(call_count(&calls), 1);
}

#[tokio::test(start_paused = true)]
async fn test_uncached_fetch_always_calls_source() {
    let (controller, calls) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..3)));

    controller.fetch(QueryParams::new(), false).await;
    controller.fetch(QueryParams::new(), false).await;

    assert_eq!(call_count(&calls), 2);
    assert!(controller.cache().read().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cache_entry_expires_after_ttl() {
    let (controller, calls) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..3)));

    controller.fetch(QueryParams::new(), true).await;
    tokio::time::advance(DEFAULT_TTL).await;
    controller.fetch(QueryParams::new(), true).await;
    assert_eq!(call_count(&calls), 1, "entry aged exactly TTL is still live");

    tokio::time::advance(Duration::from_millis(1)).await;
    controller.fetch(QueryParams::new(), true).await;
    assert_eq!(call_count(&calls), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_sets_error_state() {
    let (controller, _) = controller_with(ControllerOptions::default(), |_| {
        (Duration::ZERO, Err(DataError::Fetch("backend down".to_string())))
    });

    let items = controller.fetch(QueryParams::new(), true).await;

    assert!(items.is_empty());
    let state = controller.state();
    assert_eq!(state.phase, LoadPhase::Error);
    assert_eq!(state.error.as_deref(), Some("Fetch failed: backend down"));
    assert!(!state.loading);
    assert!(controller.cache().read().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_error_cleared_by_next_request() {
    let fail = Arc::new(std::sync::atomic::AtomicBool::new(true));
    let toggle = fail.clone();
    let (controller, _) = controller_with(ControllerOptions::default(), move |_| {
        if toggle.swap(false, std::sync::atomic::Ordering::SeqCst) {
            (Duration::ZERO, Err(DataError::Format("not an array".to_string())))
        } else {
            instant(listings(0..1))
        }
    });

    controller.fetch(QueryParams::new(), false).await;
    assert!(controller.state().error.is_some());

    controller.fetch(QueryParams::new(), false).await;
    let state = controller.state();
    assert!(state.error.is_none());
    assert_eq!(state.phase, LoadPhase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let (controller, _) = controller_with(ControllerOptions::default(), |params| {
        if params.get("q") == Some(&json!("slow")) {
            (Duration::from_millis(200), Ok(listings(0..5)))
        } else {
            (Duration::from_millis(10), Ok(listings(100..102)))
        }
    });

    let (slow, fast) = tokio::join!(
        controller.fetch(QueryParams::new().with("q", "slow"), false),
        controller.fetch(QueryParams::new().with("q", "fast"), false)
    );

    // Each caller still receives its own response
    assert_eq!(slow.len(), 5);
    assert_eq!(fast.len(), 2);
    assert_eq!(controller.state().data, listings(100..102));
    assert!(!controller.state().loading);
}

#[tokio::test(start_paused = true)]
async fn test_cache_hit_settles_request_in_flight() {
    let (controller, calls) = controller_with(ControllerOptions::default(), |params| {
        if params.get("q") == Some(&json!("slow")) {
            (Duration::from_millis(200), Ok(listings(10..12)))
        } else {
            instant(listings(0..3))
        }
    });
    controller.fetch(QueryParams::new(), true).await;

    let (slow, hit) = tokio::join!(
        controller.fetch(QueryParams::new().with("q", "slow"), false),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(controller.state().phase, LoadPhase::Loading);
            controller.fetch(QueryParams::new(), true).await
        }
    );

    assert_eq!(slow, listings(10..12));
    assert_eq!(hit, listings(0..3));
    assert_eq!(call_count(&calls), 2);

    let state = controller.state();
    assert_eq!(state.phase, LoadPhase::Ready);
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.data, listings(0..3));
}

#[tokio::test(start_paused = true)]
async fn test_cache_hit_clears_previous_error() {
    let (controller, _) = controller_with(ControllerOptions::default(), |params| {
        if params.get("broken").is_some() {
            (Duration::ZERO, Err(DataError::Fetch("backend down".into())))
        } else {
            instant(listings(0..3))
        }
    });
    controller.fetch(QueryParams::new(), true).await;
    controller.fetch(QueryParams::new().with("broken", true), false).await;
    assert_eq!(controller.state().phase, LoadPhase::Error);

    controller.fetch(QueryParams::new(), true).await;

    let state = controller.state();
    assert_eq!(state.phase, LoadPhase::Ready);
    assert!(state.error.is_none());
}

// == Pagination ==

#[tokio::test(start_paused = true)]
async fn test_fetch_page_offsets() {
    let (controller, calls) = controller_with(ControllerOptions::default(), paged_backend(500));

    controller.fetch_page(1, QueryParams::new()).await;
    controller.fetch_page(3, QueryParams::new()).await;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls[0], QueryParams::new().with("offset", 0).with("limit", 50));
    assert_eq!(calls[1], QueryParams::new().with("offset", 100).with("limit", 50));

    let state = controller.state();
    assert_eq!(state.current_page, 3);
    assert_eq!(state.data.first().map(|l| l.id), Some(100));
    assert!(state.has_more);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_page_is_never_cached() {
    let (controller, calls) = controller_with(ControllerOptions::default(), paged_backend(500));

    controller.fetch_page(2, QueryParams::new()).await;
    controller.fetch_page(2, QueryParams::new()).await;

    assert_eq!(call_count(&calls), 2);
    assert!(controller.cache().read().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_fetch_page_zero_is_first_page() {
    let (controller, calls) = controller_with(ControllerOptions::default(), paged_backend(10));

    controller.fetch_page(0, QueryParams::new().with("type", "LAND")).await;

    let first = calls.lock().unwrap()[0].clone();
    assert_eq!(first.get("offset"), Some(&json!(0)));
    assert_eq!(first.get("type"), Some(&json!("LAND")));
    assert_eq!(controller.state().current_page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_load_more_appends_until_short_page() {
    let (controller, calls) = controller_with(ControllerOptions::default(), paged_backend(110));

    controller.fetch_page(1, QueryParams::new()).await;
    let mut rounds = 0;
    while controller.load_more().await > 0 {
        rounds += 1;
        assert!(rounds < 10, "load_more should converge");
    }

    let state = controller.state();
    assert_eq!(state.data, listings(0..110));
    assert_eq!(state.total_count, 110);
    assert_eq!(state.current_page, 3);
    assert!(!state.has_more);

    let issued = call_count(&calls);
    assert_eq!(issued, 3);
    controller.load_more().await;
    controller.load_more().await;
    assert_eq!(call_count(&calls), issued, "no fetch once exhausted");
}

#[tokio::test(start_paused = true)]
async fn test_load_more_empty_page_stops() {
    let options = ControllerOptions::default().with_page_size(10);
    let (controller, calls) = controller_with(options, paged_backend(10));

    controller.fetch_page(1, QueryParams::new()).await;
    assert!(controller.state().has_more, "full first page");

    assert_eq!(controller.load_more().await, 0);
    let state = controller.state();
    assert!(!state.has_more);
    assert_eq!(state.current_page, 1, "page only advances on data");
    assert_eq!(state.data.len(), 10);
    assert_eq!(call_count(&calls), 2);
}

#[tokio::test(start_paused = true)]
async fn test_load_more_is_single_flight() {
    let (controller, calls) = controller_with(ControllerOptions::default(), |params| {
        let (_, outcome) = paged_backend(500)(params);
        (Duration::from_millis(50), outcome)
    });
    controller.fetch_page(1, QueryParams::new()).await;

    let (a, b, c) = tokio::join!(
        controller.load_more(),
        controller.load_more(),
        controller.load_more()
    );

    assert_eq!(a + b + c, 50);
    assert_eq!(call_count(&calls), 2);
    assert_eq!(controller.state().current_page, 2);
}

#[tokio::test(start_paused = true)]
async fn test_load_more_failure_keeps_page() {
    let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let switch = fail.clone();
    let (controller, _) = controller_with(ControllerOptions::default(), move |params| {
        if switch.load(std::sync::atomic::Ordering::SeqCst) {
            (Duration::ZERO, Err(DataError::Fetch("timeout".to_string())))
        } else {
            paged_backend(500)(params)
        }
    });

    controller.fetch_page(1, QueryParams::new()).await;
    fail.store(true, std::sync::atomic::Ordering::SeqCst);
    assert_eq!(controller.load_more().await, 0);

    let state = controller.state();
    assert_eq!(state.current_page, 1);
    assert!(state.has_more, "a failed load can be retried");
    assert_eq!(state.data.len(), 50);
    assert!(state.error.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_load_more_keeps_filters() {
    let (controller, calls) = controller_with(ControllerOptions::default(), paged_backend(500));

    controller.filter(QueryParams::new().with("status", "AVAILABLE"));
    tokio::time::sleep(Duration::from_millis(10)).await;
    controller.load_more().await;

    let last = calls.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.get("status"), Some(&json!("AVAILABLE")));
    assert_eq!(last.get("offset"), Some(&json!(50)));
}

#[tokio::test(start_paused = true)]
async fn test_filter_restarts_paging() {
    let (controller, calls) = controller_with(ControllerOptions::default(), paged_backend(500));
    controller.fetch_page(1, QueryParams::new()).await;
    controller.load_more().await;
    controller.load_more().await;
    assert_eq!(controller.state().current_page, 3);

    assert!(controller.filter(QueryParams::new().with("status", "AVAILABLE")));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let state = controller.state();
    assert_eq!(state.data, listings(0..50));
    assert_eq!(state.current_page, 1);
    assert!(state.has_more);

    assert_eq!(controller.load_more().await, 50);

    let last = calls.lock().unwrap().last().cloned().unwrap();
    assert_eq!(
        last,
        QueryParams::new()
            .with("status", "AVAILABLE")
            .with("offset", 50)
            .with("limit", 50)
    );
    let state = controller.state();
    assert_eq!(state.data, listings(0..100), "no record loaded twice");
    assert_eq!(state.current_page, 2);
}

// == Search ==

#[tokio::test(start_paused = true)]
async fn test_search_is_debounced() {
    let (controller, calls) =
        controller_with(ControllerOptions::default(), |_| instant(listings(7..9)));
    controller.fetch(QueryParams::new(), false).await;

    for query in ["t", "to", "tok", "toky", "tokyo"] {
        controller.search(query);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(controller.state().search_query, "tokyo");
    assert_eq!(call_count(&calls), 1, "nothing issued during the burst");

    tokio::time::sleep(Duration::from_millis(400)).await;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], QueryParams::new().with("search", "tokyo"));

    let state = controller.state();
    assert_eq!(state.search_results, listings(7..9));
    assert!(!state.is_searching);
    assert_eq!(state.data, listings(7..9), "main collection came from the first fetch");
}

#[tokio::test(start_paused = true)]
async fn test_search_bypasses_cache() {
    let (controller, calls) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..2)));

    controller.search("harbor");
    tokio::time::sleep(Duration::from_millis(400)).await;
    controller.search("harbor view");
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(call_count(&calls), 2);
    assert!(controller.cache().read().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_blank_search_clears_results() {
    let (controller, calls) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..2)));

    controller.search("house");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(controller.state().search_results.len(), 2);

    controller.search("   ");
    tokio::time::sleep(Duration::from_millis(400)).await;

    let state = controller.state();
    assert!(state.search_results.is_empty());
    assert!(!state.is_searching);
    assert_eq!(call_count(&calls), 1);
}

// == Filter ==

#[tokio::test(start_paused = true)]
async fn test_filter_is_throttled_and_additive() {
    let (controller, calls) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..4)));

    assert!(controller.filter(QueryParams::new().with("type", "HOUSE")));
    assert!(!controller.filter(QueryParams::new().with("rooms", 3)));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(call_count(&calls), 1);
    assert_eq!(
        calls.lock().unwrap()[0],
        QueryParams::new()
            .with("type", "HOUSE")
            .with("offset", 0)
            .with("limit", 50)
    );
    assert_eq!(controller.state().filter_params.len(), 2, "dropped call still merged");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(controller.filter(QueryParams::new().with("type", "APARTMENT")));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let last = calls.lock().unwrap().last().cloned().unwrap();
    assert_eq!(
        last,
        QueryParams::new()
            .with("type", "APARTMENT")
            .with("rooms", 3)
            .with("offset", 0)
            .with("limit", 50)
    );

    let state = controller.state();
    assert_eq!(state.data, listings(0..4));
    assert_eq!(state.total_count, 4);
    assert!(!state.is_filtering);
    assert!(controller.cache().read().await.is_empty());
}

// == Batch Operations ==

#[tokio::test(start_paused = true)]
async fn test_batch_update_patches_matching_records() {
    let options = ControllerOptions::default().with_cache_key("listings");
    let (controller, _) = controller_with(options, |_| instant(listings(0..3)));
    controller.fetch(QueryParams::new(), false).await;

    let applied = controller
        .batch_update(vec![
            BatchUpdate::new(1).set("price", 5),
            BatchUpdate::new(99).set("price", 7),
            BatchUpdate::new(2).set("price", "not a number"),
            BatchUpdate::new(0).set("name", "Renamed"),
        ])
        .await;

    assert_eq!(applied, 2);
    let data = controller.state().data;
    assert_eq!(data[0].name, "Renamed");
    assert_eq!(data[1].price, 5);
    assert_eq!(data[2], listings(2..3)[0], "invalid patch leaves record untouched");

    let cached = controller.cache().write().await.get("listings");
    assert_eq!(cached, Some(data));
}

#[tokio::test(start_paused = true)]
async fn test_batch_update_first_match_only() {
    let (controller, _) = controller_with(ControllerOptions::default(), |_| {
        let mut items = listings(0..2);
        items.push(listings(1..2)[0].clone());
        instant(items)
    });
    controller.fetch(QueryParams::new(), false).await;

    controller
        .batch_update(vec![BatchUpdate::new(1).set("price", 1)])
        .await;

    let data = controller.state().data;
    assert_eq!(data[1].price, 1);
    assert_eq!(data[2].price, 1001);
}

#[tokio::test(start_paused = true)]
async fn test_batch_delete_removes_listed_ids() {
    let (controller, _) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..5)));
    controller.fetch(QueryParams::new(), false).await;

    let removed = controller
        .batch_delete(&[RecordId::from(1), RecordId::from(3), RecordId::from(42)])
        .await;

    assert_eq!(removed, 2);
    let state = controller.state();
    assert_eq!(
        state.data.iter().map(|l| l.id).collect::<Vec<_>>(),
        vec![0, 2, 4]
    );
    assert_eq!(state.total_count, 3);

    let key = derive_key("default", None);
    assert_eq!(controller.cache().write().await.get(&key), Some(state.data));
}

#[tokio::test(start_paused = true)]
async fn test_clear_cache_is_idempotent() {
    let (controller, _) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..2)));
    controller.fetch(QueryParams::new(), true).await;
    controller.fetch(QueryParams::new().with("a", 1), true).await;
    assert_eq!(controller.cache().read().await.len(), 2);

    controller.clear_cache().await;
    assert_eq!(controller.cache().read().await.len(), 0);
    controller.clear_cache().await;
    assert_eq!(controller.cache().read().await.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shared_cache_invalidates_across_controllers() {
    let cache = shared_cache(DEFAULT_TTL);
    let source = |_: QueryParams| async { Ok::<_, DataError>(listings(0..2)) };
    let identity = |l: &Listing| RecordId::from(l.id);
    let first = PagedDataController::new(
        source,
        identity,
        cache.clone(),
        ControllerOptions::default().with_cache_key("a"),
    );
    let second = PagedDataController::new(
        source,
        identity,
        cache.clone(),
        ControllerOptions::default().with_cache_key("b"),
    );

    first.fetch(QueryParams::new(), true).await;
    second.fetch(QueryParams::new(), true).await;
    assert_eq!(cache.read().await.len(), 2);

    first.clear_cache().await;
    assert!(cache.read().await.is_empty());
}

// == Virtual Scroll ==

#[tokio::test(start_paused = true)]
async fn test_visible_items_without_virtual_scroll() {
    let (controller, _) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..40)));
    controller.fetch(QueryParams::new(), false).await;
    controller.update_scroll_position(600.0, 120.0);

    assert_eq!(controller.visible_items().len(), 40);
}

#[tokio::test(start_paused = true)]
async fn test_visible_items_with_virtual_scroll() {
    let options = ControllerOptions::default().with_virtual_scroll(true);
    let (controller, _) = controller_with(options, |_| instant(listings(0..40)));
    controller.fetch(QueryParams::new(), false).await;

    controller.update_scroll_position(120.0, 600.0);
    assert_eq!(controller.visible_range().as_range(), 2..13);

    controller.update_item_height(0.0);
    controller.update_item_height(120.0);
    assert_eq!(controller.visible_range().as_range(), 1..7);
    assert_eq!(controller.visible_items().first().map(|l| l.id), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_unusable_row_height_falls_back_to_default() {
    let options = ControllerOptions {
        item_height: 0.0,
        ..ControllerOptions::default().with_virtual_scroll(true)
    };
    let (controller, _) = controller_with(options, |_| instant(listings(0..40)));
    controller.fetch(QueryParams::new(), false).await;

    controller.update_scroll_position(120.0, 600.0);

    assert_eq!(controller.options().item_height, 60.0);
    assert_eq!(controller.visible_range().as_range(), 2..13);
    assert_eq!(controller.visible_items().len(), 11);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_updates() {
    let (controller, _) =
        controller_with(ControllerOptions::default(), |_| instant(listings(0..3)));
    let mut rx = controller.subscribe();

    controller.fetch(QueryParams::new(), false).await;

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().data.len(), 3);
}

// == Properties ==

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Deleting a set of ids keeps exactly the records whose id is not in the set.
    #[test]
    fn prop_batch_delete_keeps_complement(
        ids in prop::collection::vec(0i64..30, 0..20),
        delete in prop::collection::vec(0i64..40, 0..20),
    ) {
        let records: Vec<Listing> = ids
            .iter()
            .map(|&id| listings(id..id + 1).remove(0))
            .collect();
        let expected: Vec<Listing> = records
            .iter()
            .filter(|r| !delete.contains(&r.id))
            .cloned()
            .collect();
        let delete_ids: Vec<RecordId> = delete.iter().map(|&id| RecordId::from(id)).collect();

        let remaining = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(async move {
                let (controller, _) = controller_with(ControllerOptions::default(), move |_| {
                    instant(records.clone())
                });
                controller.fetch(QueryParams::new(), false).await;
                controller.batch_delete(&delete_ids).await;
                controller.state().data
            });

        prop_assert_eq!(remaining, expected);
    }

    // Updates for ids absent from the collection change nothing.
    #[test]
    fn prop_unmatched_updates_are_noops(
        count in 0i64..20,
        missing in prop::collection::vec(100i64..200, 1..10),
    ) {
        let after = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(async move {
                let (controller, _) = controller_with(ControllerOptions::default(), move |_| {
                    instant(listings(0..count))
                });
                controller.fetch(QueryParams::new(), false).await;
                let updates = missing
                    .iter()
                    .map(|&id| BatchUpdate::new(id).set("price", 0))
                    .collect();
                let applied = controller.batch_update(updates).await;
                (applied, controller.state().data)
            });

        prop_assert_eq!(after.0, 0);
        prop_assert_eq!(after.1, listings(0..count));
    }
}
