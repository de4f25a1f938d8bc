//! Integration Tests: Trending and Discover Feeds
//!
//! Exercises the single-stream composers against in-memory stores.
//!
//! Coverage:
//! - Trending score ordering (double-weighted comments, age term)
//! - Stable page boundaries over one ordered stream
//! - Retrieval-bounded totals
//! - Discover exclusions (viewer, followed authors) and reach bias
//! - Unknown-viewer rejection and empty-universe fast paths
//! - Request metrics labeled by feed type

mod common;

use common::{post_at, InMemoryContentStore, InMemorySocialGraphStore};
use chrono::Utc;
use feed_service::error::AppError;
use feed_service::metrics::feed::FEED_REQUEST_TOTAL;
use feed_service::services::{DiscoverComposer, TrendingComposer};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn trending_prefers_comment_heavy_item_at_equal_age() {
    let now = Utc::now();
    let mut content = InMemoryContentStore::new();

    let liked = post_at(Uuid::new_v4(), 10, 0, 24, now);
    let commented = post_at(Uuid::new_v4(), 2, 5, 24, now);
    content.add_posts([liked.clone(), commented.clone()]);

    let trending = TrendingComposer::new(Arc::new(content), 500);
    let page = trending.compose_at(1, 10, now).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(
        page.items[0].id, commented.id,
        "Five comments should outrank ten likes"
    );
    assert_eq!(page.items[1].id, liked.id);
}

#[tokio::test]
async fn trending_age_term_boosts_older_item_at_equal_engagement() {
    let now = Utc::now();
    let mut content = InMemoryContentStore::new();

    let older = post_at(Uuid::new_v4(), 5, 0, 48, now);
    let fresh = post_at(Uuid::new_v4(), 5, 0, 0, now);
    content.add_posts([older.clone(), fresh.clone()]);

    let trending = TrendingComposer::new(Arc::new(content), 500);
    let page = trending.compose_at(1, 10, now).await.unwrap();

    // The age term is additive, so at equal engagement the older item wins.
    assert_eq!(page.items[0].id, older.id);
    assert_eq!(page.items[1].id, fresh.id);
}

#[tokio::test]
async fn trending_pages_slice_one_ordered_stream() {
    let now = Utc::now();
    let mut content = InMemoryContentStore::new();
    let top = post_at(Uuid::new_v4(), 100, 0, 1, now);
    content.add_post(top.clone());
    for i in 1..25 {
        content.add_post(post_at(Uuid::new_v4(), 100 - i as i64, 0, 1, now));
    }

    let trending = TrendingComposer::new(Arc::new(content), 500);

    let whole = trending.compose_at(1, 25, now).await.unwrap();
    let second = trending.compose_at(2, 10, now).await.unwrap();
    let last = trending.compose_at(3, 10, now).await.unwrap();

    assert_eq!(whole.items[0].id, top.id);
    assert_eq!(
        second.items,
        whole.items[10..20].to_vec(),
        "A page is a plain slice of the ordered stream"
    );
    assert_eq!(second.total_items, 25);
    assert_eq!(second.total_pages, 3);
    assert!(second.has_more);

    assert_eq!(last.items.len(), 5);
    assert!(!last.has_more);
}

#[tokio::test]
async fn trending_totals_cover_the_retrieval_bounded_universe() {
    let now = Utc::now();
    let mut content = InMemoryContentStore::new();
    for i in 0..25 {
        content.add_post(post_at(Uuid::new_v4(), 25 - i, 0, 1, now));
    }

    // Only the 20 most engaged items are in play.
    let trending = TrendingComposer::new(Arc::new(content), 20);
    let page = trending.compose_at(2, 10, now).await.unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_items, 20);
    assert_eq!(page.total_pages, 2);
    assert!(!page.has_more);
}

#[tokio::test]
async fn trending_empty_store_is_an_empty_page() {
    let trending = TrendingComposer::new(Arc::new(InMemoryContentStore::new()), 500);
    let page = trending.compose(1, 10).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);
    assert_eq!(page.total_pages, 0);
    assert!(!page.has_more);
}

#[tokio::test]
async fn discover_excludes_viewer_and_followed_authors() {
    let now = Utc::now();
    let viewer = Uuid::new_v4();
    let followed = Uuid::new_v4();

    let mut content = InMemoryContentStore::new();
    let mut social = InMemorySocialGraphStore::new();
    social.follow(viewer, followed);

    content.add_post(post_at(viewer, 50, 0, 1, now));
    content.add_post(post_at(followed, 50, 0, 1, now));
    let mut stranger_ids = HashSet::new();
    for i in 0..3 {
        let post = post_at(Uuid::new_v4(), 5 - i, 0, 2, now);
        stranger_ids.insert(post.id);
        content.add_post(post);
    }

    let discover = DiscoverComposer::new(Arc::new(content), Arc::new(social), 500);
    let page = discover.compose(viewer, 1, 10).await.unwrap();

    let ids: HashSet<Uuid> = page.items.iter().map(|item| item.id).collect();
    assert_eq!(
        ids, stranger_ids,
        "Discover must only surface authors outside the viewer's graph"
    );
}

#[tokio::test]
async fn discover_favors_authors_with_reach() {
    let now = Utc::now();
    let viewer = Uuid::new_v4();
    let big_author = Uuid::new_v4();
    let small_author = Uuid::new_v4();

    let mut content = InMemoryContentStore::new();
    let mut social = InMemorySocialGraphStore::new();
    social.add_user(viewer);
    for _ in 0..20 {
        social.follow(Uuid::new_v4(), big_author);
    }

    let quiet = post_at(big_author, 1, 0, 2, now);
    let loud = post_at(small_author, 8, 2, 2, now);
    content.add_posts([quiet.clone(), loud.clone()]);

    let discover = DiscoverComposer::new(Arc::new(content), Arc::new(social), 500);
    let page = discover.compose(viewer, 1, 10).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(
        page.items[0].id, quiet.id,
        "Author reach should outweigh raw engagement"
    );
}

#[tokio::test]
async fn discover_with_fully_followed_universe_is_empty() {
    let now = Utc::now();
    let viewer = Uuid::new_v4();
    let followed = Uuid::new_v4();

    let mut content = InMemoryContentStore::new();
    let mut social = InMemorySocialGraphStore::new();
    social.follow(viewer, followed);

    content.add_post(post_at(viewer, 3, 0, 1, now));
    content.add_post(post_at(followed, 7, 1, 2, now));

    let discover = DiscoverComposer::new(Arc::new(content), Arc::new(social), 500);
    let page = discover.compose(viewer, 1, 10).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);
    assert_eq!(page.total_pages, 0);
    assert!(!page.has_more);
}

#[tokio::test]
async fn discover_empty_store_is_an_empty_page() {
    let viewer = Uuid::new_v4();
    let mut social = InMemorySocialGraphStore::new();
    social.add_user(viewer);

    let discover = DiscoverComposer::new(
        Arc::new(InMemoryContentStore::new()),
        Arc::new(social),
        500,
    );
    let page = discover.compose(viewer, 1, 10).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);
    assert_eq!(page.total_pages, 0);
    assert!(!page.has_more);
}

#[tokio::test]
async fn discover_unknown_viewer_is_rejected() {
    let viewer = Uuid::new_v4();
    let discover = DiscoverComposer::new(
        Arc::new(InMemoryContentStore::new()),
        Arc::new(InMemorySocialGraphStore::new()),
        500,
    );

    let err = discover.compose(viewer, 1, 10).await.unwrap_err();
    assert!(matches!(err, AppError::ViewerNotFound(id) if id == viewer));
}

#[tokio::test]
async fn composers_record_requests_by_feed_type() {
    let now = Utc::now();
    let viewer = Uuid::new_v4();

    let mut content = InMemoryContentStore::new();
    content.add_post(post_at(Uuid::new_v4(), 3, 1, 2, now));
    let mut social = InMemorySocialGraphStore::new();
    social.add_user(viewer);

    let content: Arc<InMemoryContentStore> = Arc::new(content);
    let trending = TrendingComposer::new(content.clone(), 500);
    let discover = DiscoverComposer::new(content, Arc::new(social), 500);

    let trending_before = FEED_REQUEST_TOTAL.with_label_values(&["trending"]).get();
    let discover_before = FEED_REQUEST_TOTAL.with_label_values(&["discover"]).get();

    trending.compose_at(1, 10, now).await.unwrap();
    discover.compose(viewer, 1, 10).await.unwrap();

    // The counters are shared across the whole test binary, so only
    // monotone growth is asserted.
    assert!(
        FEED_REQUEST_TOTAL.with_label_values(&["trending"]).get() > trending_before,
        "A trending request must be counted under its feed type"
    );
    assert!(
        FEED_REQUEST_TOTAL.with_label_values(&["discover"]).get() > discover_before,
        "A discover request must be counted under its feed type"
    );
}
