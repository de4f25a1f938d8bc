//! Trending feed: one fully-ordered stream over all public content.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::metrics::feed::{
    FEED_CANDIDATE_COUNT, FEED_REQUEST_DURATION_SECONDS, FEED_REQUEST_TOTAL,
};
use crate::models::{ContentItem, FeedType, RankedPage};
use crate::retrievers::{PopularityRetriever, PopularityScoring};
use crate::services::validate_pagination;
use crate::stores::ContentStore;

pub struct TrendingComposer {
    popularity: PopularityRetriever,
    content: Arc<dyn ContentStore>,
    max_candidates: usize,
}

impl TrendingComposer {
    pub fn new(content: Arc<dyn ContentStore>, max_candidates: usize) -> Self {
        Self {
            popularity: PopularityRetriever::new(content.clone()),
            content,
            max_candidates: max_candidates.max(1),
        }
    }

    /// Compose the trending page at the current instant.
    pub async fn compose(&self, page: u32, page_size: u32) -> Result<RankedPage> {
        self.compose_at(page, page_size, Utc::now()).await
    }

    /// Compose with an explicit evaluation instant for the decayed scores.
    pub async fn compose_at(
        &self,
        page: u32,
        page_size: u32,
        now: DateTime<Utc>,
    ) -> Result<RankedPage> {
        validate_pagination(page, page_size)?;

        let start = Instant::now();
        debug!("Composing trending feed (page {}, size {})", page, page_size);

        if self.content.count_public(&[]).await? == 0 {
            return Ok(finish(RankedPage::empty(page, FeedType::Trending), start));
        }

        // The whole stream is fetched and ordered before slicing so page
        // boundaries stay identical regardless of which page is requested.
        let universe = self
            .popularity
            .retrieve_public(&[], self.max_candidates, PopularityScoring::TimeDecayed, now)
            .await?;
        FEED_CANDIDATE_COUNT
            .with_label_values(&["trending"])
            .observe(universe.len() as f64);

        let items: Vec<ContentItem> = universe.into_iter().map(|c| c.item).collect();
        let ranked = paginate(items, page, page_size, FeedType::Trending);

        Ok(finish(ranked, start))
    }
}

/// Skip/limit slice of an already-ordered stream. Totals cover the
/// retrieval-bounded stream.
pub(crate) fn paginate(
    items: Vec<ContentItem>,
    page: u32,
    page_size: u32,
    feed_type: FeedType,
) -> RankedPage {
    let total = items.len();
    let start_index = ((page as usize - 1) * page_size as usize).min(total);
    let end = (start_index + page_size as usize).min(total);
    let has_more = end < total;
    let page_items = items[start_index..end].to_vec();

    RankedPage::new(page_items, page, page_size, total as u64, has_more, feed_type)
}

/// Record the request duration and count for a composed page, labeled by
/// its feed type. Shared by every composer as the last step before the
/// page is returned.
pub(crate) fn finish(page: RankedPage, start: Instant) -> RankedPage {
    let elapsed = start.elapsed().as_secs_f64();
    FEED_REQUEST_DURATION_SECONDS
        .with_label_values(&[page.feed_type.as_str()])
        .observe(elapsed);
    FEED_REQUEST_TOTAL
        .with_label_values(&[page.feed_type.as_str()])
        .inc();
    page
}
