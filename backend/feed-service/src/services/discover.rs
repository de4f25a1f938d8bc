//! Discover feed: public content beyond the viewer's graph, biased toward
//! well-followed authors to surface accounts worth following.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join_all;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::metrics::feed::FEED_CANDIDATE_COUNT;
use crate::models::{ContentItem, FeedType, RankedPage, ViewerContext};
use crate::services::scoring::{discover_score, rank_ordering};
use crate::services::trending::{finish, paginate};
use crate::services::validate_pagination;
use crate::stores::{CandidateSort, ContentStore, SocialGraphStore};

pub struct DiscoverComposer {
    content: Arc<dyn ContentStore>,
    social: Arc<dyn SocialGraphStore>,
    max_candidates: usize,
}

impl DiscoverComposer {
    pub fn new(
        content: Arc<dyn ContentStore>,
        social: Arc<dyn SocialGraphStore>,
        max_candidates: usize,
    ) -> Self {
        Self {
            content,
            social,
            max_candidates: max_candidates.max(1),
        }
    }

    /// Compose the discover page for `viewer_id`. The score has no time
    /// term, so no evaluation instant is involved.
    pub async fn compose(&self, viewer_id: Uuid, page: u32, page_size: u32) -> Result<RankedPage> {
        validate_pagination(page, page_size)?;

        let start = Instant::now();
        debug!(
            "Composing discover feed for viewer {} (page {}, size {})",
            viewer_id, page, page_size
        );

        if !self.social.user_exists(viewer_id).await? {
            return Err(AppError::ViewerNotFound(viewer_id));
        }
        let following = self.social.following_of(viewer_id).await?;
        let viewer = ViewerContext::new(viewer_id, following);
        let excluded = viewer.recommended_exclusions();

        if self.content.count_public(&excluded).await? == 0 {
            return Ok(finish(RankedPage::empty(page, FeedType::Discover), start));
        }

        let universe = self
            .content
            .find_public_excluding_authors(&excluded, CandidateSort::Engagement, self.max_candidates)
            .await?;
        FEED_CANDIDATE_COUNT
            .with_label_values(&["discover"])
            .observe(universe.len() as f64);

        let follower_counts = self.follower_counts(&universe).await?;

        let mut scored: Vec<(f64, ContentItem)> = universe
            .into_iter()
            .map(|item| {
                let followers = follower_counts.get(&item.author_id).copied().unwrap_or(0);
                (discover_score(&item, followers), item)
            })
            .collect();
        scored.sort_by(|a, b| rank_ordering(a.0, &a.1, b.0, &b.1));
        let items: Vec<ContentItem> = scored.into_iter().map(|(_, item)| item).collect();

        Ok(finish(paginate(items, page, page_size, FeedType::Discover), start))
    }

    /// Follower count per distinct author in the universe, fetched
    /// concurrently.
    async fn follower_counts(&self, universe: &[ContentItem]) -> Result<HashMap<Uuid, i64>> {
        let authors: Vec<Uuid> = universe
            .iter()
            .map(|item| item.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let counts = try_join_all(
            authors
                .iter()
                .map(|&author| self.social.follower_count_of(author)),
        )
        .await?;

        Ok(authors.into_iter().zip(counts).collect())
    }
}
