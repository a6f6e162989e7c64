//! Gallery pagination tests
//!
//! These exercise the workflow against the in-memory backend: idempotent
//! first loads, cursor chaining to the terminal page, the single in-flight
//! guard, search resets, retry after failure and discard of stale pages.

use std::sync::Arc;
use std::time::Duration;

use picshelf_client::domains::gallery::{GalleryWorkflow, LoadError, LoadOutcome, Viewport};
use picshelf_client::infra::services::api::{ApiError, ApiService};
use picshelf_client::infra::testing::{TestApiService, sample_images};
use picshelf_model::{Cursor, ImageSummary};

fn gallery_over(api: &TestApiService, page_size: u32) -> GalleryWorkflow {
    let api: Arc<dyn ApiService> = Arc::new(api.clone());
    GalleryWorkflow::new(api, page_size)
}

/// Waits until the stub has seen `count` listing calls.
async fn wait_for_list_calls(api: &TestApiService, count: usize) {
    for _ in 0..200 {
        if api.list_calls().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!(
        "expected {} list calls, saw {}",
        count,
        api.list_calls().len()
    );
}

#[tokio::test]
async fn first_page_is_idempotent() {
    let api = TestApiService::with_images(30);
    let gallery = gallery_over(&api, 12);

    gallery.load_first_page("").await;
    let first_ids: Vec<_> =
        gallery.images().into_iter().map(|i| i.file_id).collect();
    gallery.load_first_page("").await;
    let second_ids: Vec<_> =
        gallery.images().into_iter().map(|i| i.file_id).collect();

    assert_eq!(first_ids.len(), 12);
    assert_eq!(first_ids, second_ids);
    for call in api.list_calls() {
        assert_eq!(call.cursor, None);
        assert_eq!(call.search, None);
        assert_eq!(call.limit, 12);
    }
}

#[tokio::test]
async fn pages_accumulate_until_terminal() {
    let api = TestApiService::with_images(30);
    let gallery = gallery_over(&api, 12);

    match gallery.load_first_page("").await {
        LoadOutcome::Appended { added, has_more, .. } => {
            assert_eq!(added, 12);
            assert!(has_more);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    gallery.load_next_page().await;
    match gallery.load_next_page().await {
        LoadOutcome::Appended { added, has_more, .. } => {
            assert_eq!(added, 6);
            assert!(!has_more);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let expected: Vec<_> = sample_images(30).into_iter().map(|i| i.file_id).collect();
    let actual: Vec<_> = gallery.images().into_iter().map(|i| i.file_id).collect();
    assert_eq!(actual, expected);

    // Terminal: further triggers are no-ops and issue no request.
    assert_eq!(gallery.load_next_page().await, LoadOutcome::Skipped);
    assert_eq!(api.list_calls().len(), 3);

    // Each request after the first carries the previous page's cursor.
    let calls = api.list_calls();
    assert_eq!(calls[1].cursor, Some(Cursor::new("idx:12")));
    assert_eq!(calls[2].cursor, Some(Cursor::new("idx:24")));
}

#[tokio::test]
async fn empty_listing_ends_immediately() {
    let api = TestApiService::default();
    let gallery = gallery_over(&api, 12);

    gallery.load_first_page("").await;
    assert!(gallery.is_empty());
    assert!(!gallery.has_more());
    assert_eq!(gallery.load_next_page().await, LoadOutcome::Skipped);
}

#[tokio::test]
async fn only_one_request_is_in_flight() {
    let api = TestApiService::with_images(30);
    api.hold_lists();
    let gallery = gallery_over(&api, 12);

    let first = tokio::spawn({
        let gallery = gallery.clone();
        async move { gallery.load_first_page("").await }
    });
    wait_for_list_calls(&api, 1).await;
    assert!(gallery.is_loading());

    // Triggers arriving while the page is pending are dropped.
    for _ in 0..5 {
        assert_eq!(gallery.load_next_page().await, LoadOutcome::Skipped);
    }
    assert_eq!(api.list_calls().len(), 1);

    api.release_lists(1);
    let outcome = first.await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Appended { added: 12, .. }));
    assert!(!gallery.is_loading());
}

#[tokio::test]
async fn search_resets_and_filters() {
    let mut images = sample_images(4);
    images.push(ImageSummary::new("cat-1", "Cat on a mat"));
    images.push(ImageSummary::new("dog-1", "Dog").with_description("ignores the cat"));
    let api = TestApiService::new(images);
    let gallery = gallery_over(&api, 12);

    gallery.load_first_page("").await;
    assert_eq!(gallery.len(), 6);

    gallery.search("  cat ").await;
    let ids: Vec<_> = gallery
        .images()
        .into_iter()
        .map(|i| i.file_id.as_str().to_string())
        .collect();
    assert_eq!(ids, ["cat-1", "dog-1"]);
    assert_eq!(gallery.search_query(), "cat");

    let last = api.list_calls().pop().unwrap();
    assert_eq!(last.search.as_deref(), Some("cat"));
    assert_eq!(last.cursor, None);

    // Clearing the filter restarts from an unfiltered page 1.
    gallery.search("").await;
    assert_eq!(gallery.len(), 6);
    assert_eq!(api.list_calls().pop().unwrap().search, None);
}

#[tokio::test]
async fn failure_keeps_state_and_allows_retry() {
    let api = TestApiService::with_images(30);
    let gallery = gallery_over(&api, 12);
    gallery.load_first_page("").await;

    api.fail_next_list(ApiError::Network("connection reset".into()));
    match gallery.load_next_page().await {
        LoadOutcome::Failed(LoadError::Transport(ApiError::Network(msg))) => {
            assert_eq!(msg, "connection reset");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(gallery.len(), 12);
    assert!(gallery.has_more());
    assert!(!gallery.is_loading());

    gallery.load_next_page().await;
    assert_eq!(gallery.len(), 24);
    let calls = api.list_calls();
    assert_eq!(calls[1].cursor, calls[2].cursor);
}

#[tokio::test]
async fn application_error_is_surfaced_without_appending() {
    let api = TestApiService::with_images(5);
    api.fail_next_list_with_code("500", "database offline");
    let gallery = gallery_over(&api, 12);

    match gallery.load_first_page("").await {
        LoadOutcome::Failed(LoadError::Server(err)) => {
            assert_eq!(err.code, "500");
            assert_eq!(err.message, "database offline");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(gallery.is_empty());
    assert!(gallery.has_more());
}

#[tokio::test]
async fn page_from_superseded_search_is_discarded() {
    let mut images = sample_images(3);
    images.push(ImageSummary::new("cat-1", "Cat"));
    let api = TestApiService::new(images);
    api.hold_lists();
    let gallery = gallery_over(&api, 12);

    let unfiltered = tokio::spawn({
        let gallery = gallery.clone();
        async move { gallery.load_first_page("").await }
    });
    wait_for_list_calls(&api, 1).await;

    // The search arrives while the unfiltered page is still pending.
    assert_eq!(gallery.search("cat").await, LoadOutcome::Deferred);

    api.open_lists();
    let outcome = unfiltered.await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Appended { added: 1, .. }));

    let ids: Vec<_> = gallery
        .images()
        .into_iter()
        .map(|i| i.file_id.as_str().to_string())
        .collect();
    assert_eq!(ids, ["cat-1"]);
    assert_eq!(api.list_calls().len(), 2);
    assert_eq!(api.list_calls()[1].search.as_deref(), Some("cat"));
}

#[tokio::test]
async fn append_reports_scroll_position_to_restore() {
    let api = TestApiService::with_images(30);
    let gallery = gallery_over(&api, 12);
    gallery.load_first_page("").await;

    gallery.record_viewport(Viewport {
        scroll_offset: 900.0,
        viewport_height: 600.0,
        sentinel_top: 1600.0,
    });
    match gallery.load_next_page().await {
        LoadOutcome::Appended { restore_scroll_to, .. } => {
            assert_eq!(restore_scroll_to, Some(900.0));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn per_image_view_flags() {
    let api = TestApiService::with_images(2);
    let gallery = gallery_over(&api, 12);
    gallery.load_first_page("").await;

    let id = gallery.images()[0].file_id.clone();
    assert!(gallery.mark_loaded(&id));
    assert_eq!(gallery.toggle_description(&id), Some(true));
    assert_eq!(gallery.toggle_description(&id), Some(false));

    let image = gallery.find(&id).unwrap();
    assert!(image.loaded);
    assert_eq!(
        gallery.image_url(&id),
        "http://localhost:3030/api/images/img-0000"
    );
}

#[tokio::test]
async fn abandoned_load_still_completes_and_frees_the_slot() {
    let mut images = sample_images(20);
    images.push(ImageSummary::new("cat-1", "Cat"));
    let api = TestApiService::new(images);
    api.hold_lists();
    let gallery = gallery_over(&api, 12);

    // The caller gives up while the page is still pending.
    let waited =
        tokio::time::timeout(Duration::from_millis(20), gallery.load_first_page(""))
            .await;
    assert!(waited.is_err());

    api.open_lists();
    for _ in 0..200 {
        if !gallery.is_loading() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(!gallery.is_loading());
    assert_eq!(gallery.len(), 12);

    assert!(matches!(
        gallery.load_next_page().await,
        LoadOutcome::Appended { added: 9, .. }
    ));
    assert!(matches!(
        gallery.search("cat").await,
        LoadOutcome::Appended { added: 1, .. }
    ));
}

#[tokio::test]
async fn direct_append_leaves_restore_target_for_front_end() {
    let api = TestApiService::with_images(30);
    let gallery = gallery_over(&api, 12);
    gallery.load_first_page("").await;
    assert_eq!(gallery.take_scroll_restore(), Some(0.0));

    gallery.record_viewport(Viewport {
        scroll_offset: 300.0,
        viewport_height: 500.0,
        sentinel_top: 900.0,
    });
    gallery.load_next_page().await;
    assert_eq!(gallery.take_scroll_restore(), Some(300.0));
    assert_eq!(gallery.take_scroll_restore(), None);
}
