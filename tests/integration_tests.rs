//! Integration tests for the public API
//!
//! Tests the full flow: source → combinator → concurrent processor → paginator,
//! plus resume tokens persisted through the checkpoint store.

use pagewise::{
    CheckpointStore, ConcurrentProcessor, Context, Fetched, FetchAndProcess, Item,
    MemorySource, PaginationResult, Paginator, PaginatorConfig,
};
use pretty_assertions::assert_eq;
use rand::Rng;
use std::time::Duration;
use tempfile::tempdir;

type Page = PaginationResult<i64, String>;

fn numbered(range: std::ops::RangeInclusive<i64>) -> MemorySource<i64, String> {
    MemorySource::new(range.map(|k| Item::new(k, format!("Item {k}"))))
}

/// Page through everything, tolerating partial pages from the time budget
async fn drain<S>(paginator: &mut Paginator<i64, String, S>, length: usize) -> Vec<Page>
where
    S: pagewise::Source<i64, String>,
{
    let ctx = Context::new();
    let mut pages = Vec::new();
    for _ in 0..1000 {
        let page = match paginator.paginate(&ctx, length).await {
            Ok(page) => page,
            Err(err) => {
                assert!(err.is_resource_exhausted(), "unexpected error: {err}");
                err.into_parts().0
            }
        };
        let done = !page.has_next;
        pages.push(page);
        if done {
            return pages;
        }
    }
    panic!("pagination did not terminate");
}

fn keys(pages: &[Page]) -> Vec<i64> {
    pages.iter().flat_map(|p| p.keys().copied()).collect()
}

// ============================================================================
// End-to-end Paging
// ============================================================================

#[tokio::test]
async fn test_filtered_walk_returns_every_kept_item_once() {
    let filter = |_ctx: Context, item: Item<i64, String>| async move {
        let jitter = rand::rng().random_range(0..4_u64);
        tokio::time::sleep(Duration::from_millis(jitter)).await;
        (item.key % 3 != 0).then_some(item)
    };
    let source = FetchAndProcess::new(numbered(1..=40), ConcurrentProcessor::new(filter));
    let mut paginator = Paginator::new(source, 0);

    let pages = drain(&mut paginator, 4).await;

    let expected: Vec<i64> = (1..=40).filter(|k| k % 3 != 0).collect();
    assert_eq!(keys(&pages), expected);

    let (last, full) = pages.split_last().unwrap();
    assert!(!last.has_next);
    assert_eq!(last.len(), 3);
    for page in full {
        assert_eq!(page.len(), 4);
        assert!(page.has_next);
    }
    assert_eq!(*paginator.last_key(), 40);
}

#[tokio::test]
async fn test_direct_descending_walk() {
    let source = MemorySource::descending((1..=7).map(|k| Item::new(k, k.to_string())));
    let mut paginator = Paginator::from_fetch(source, i64::MAX);

    let pages = drain(&mut paginator, 3).await;

    assert_eq!(keys(&pages), vec![7, 6, 5, 4, 3, 2, 1]);
    assert_eq!(
        pages.iter().map(|p| p.has_next).collect::<Vec<_>>(),
        vec![true, true, false]
    );
}

#[tokio::test]
async fn test_configured_page_size() {
    let config = PaginatorConfig::from_yaml_str("page_size: 3\nmax_process_time_ms: 1000\n")
        .unwrap();
    let mut paginator = Paginator::from_fetch(numbered(1..=5), 0).with_config(config);
    let ctx = Context::new();

    let first = paginator.next_page(&ctx).await.unwrap();
    assert_eq!(first.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(first.has_next);

    let second = paginator.next_page(&ctx).await.unwrap();
    assert_eq!(second.keys().copied().collect::<Vec<_>>(), vec![4, 5]);
    assert!(!second.has_next);
}

// ============================================================================
// Time Budget
// ============================================================================

#[tokio::test]
async fn test_zero_budget_returns_nothing() {
    let config = PaginatorConfig::from_json_str(r#"{"max_process_time_ms": 0}"#).unwrap();
    let mut paginator = Paginator::from_fetch(numbered(1..=5), 0).with_config(config);

    let err = paginator.paginate(&Context::new(), 2).await.unwrap_err();
    assert!(err.is_resource_exhausted());
    assert!(err.result.is_empty());
    assert_eq!(*paginator.last_key(), 0);
}

#[tokio::test]
async fn test_slow_source_pages_resume_without_gaps() {
    let slow = |_ctx: Context, _limit: usize, cursor: i64| async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        let items = if cursor < 10 {
            vec![Item::new(cursor + 1, format!("Item {}", cursor + 1))]
        } else {
            Vec::new()
        };
        Ok::<_, pagewise::Error>(Fetched::new(items, cursor + 1 < 10))
    };
    let mut paginator =
        Paginator::from_fetch(slow, 0).with_max_process_time(Duration::from_millis(100));

    let err = paginator.paginate(&Context::new(), 10).await.unwrap_err();
    assert!(err.is_resource_exhausted());
    let partial = err.result.len();
    assert!(partial >= 1 && partial < 10, "partial page of {partial}");
    assert_eq!(*paginator.last_key(), partial as i64);

    let rest = drain(&mut paginator, 10).await;
    let mut all: Vec<i64> = (1..=partial as i64).collect();
    all.extend(keys(&rest));
    assert_eq!(all, (1..=10).collect::<Vec<_>>());
}

// ============================================================================
// Resume Tokens
// ============================================================================

#[tokio::test]
async fn test_resume_through_checkpoint_file() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("state.json");
    let ctx = Context::new();

    let keep = |_ctx: Context, item: Item<i64, String>| async move {
        (item.value != "Item 1").then_some(item)
    };

    let first = {
        let source = FetchAndProcess::new(numbered(1..=5), ConcurrentProcessor::new(keep));
        let mut paginator = Paginator::new(source, 0).with_key_encoder();
        paginator.paginate(&ctx, 2).await.unwrap()
    };
    assert_eq!(first.keys().copied().collect::<Vec<_>>(), vec![2, 3]);
    assert!(first.has_next);

    let store = CheckpointStore::new(&state);
    store
        .record_page("numbers", first.len(), first.next.clone())
        .await
        .unwrap();

    let store = CheckpointStore::from_file(&state).unwrap();
    let token = store.get_cursor("numbers").await.unwrap();

    let source = FetchAndProcess::new(numbered(1..=5), ConcurrentProcessor::new(keep));
    let mut resumed: Paginator<i64, String, _> = Paginator::resume(source, &token).unwrap();
    assert_eq!(*resumed.last_key(), 3);

    let second = resumed.paginate(&ctx, 2).await.unwrap();
    assert_eq!(second.keys().copied().collect::<Vec<_>>(), vec![4, 5]);
    assert!(!second.has_next);
    assert!(second.next.is_none());
}

#[tokio::test]
async fn test_resume_rejects_garbage_token() {
    let err = Paginator::<i64, String, _>::resume(pagewise::Direct::new(numbered(1..=3)), "%%%")
        .unwrap_err();
    assert!(err.to_string().contains("Invalid cursor token"));
}
