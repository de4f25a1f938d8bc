use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::CandidateRetriever;
use crate::error::Result;
use crate::models::{Candidate, CandidateSource, ViewerContext};
use crate::services::scoring::{engagement_score, rank_ordering, trending_score};
use crate::stores::{CandidateSort, ContentStore};

/// How the popularity lane scores its candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopularityScoring {
    /// Raw engagement. Used when backfilling the personalized feed.
    RawEngagement,
    /// Engagement with the trending age adjustment.
    TimeDecayed,
}

/// Broad-reach lane: public content ranked by engagement, independent of
/// the viewer's graph. Doubles as the trending stream with decayed scoring.
pub struct PopularityRetriever {
    content: Arc<dyn ContentStore>,
}

impl PopularityRetriever {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }

    /// Up to `limit` public items from authors outside `excluded_authors`,
    /// scored per `scoring` and ranked. `now` fixes the evaluation instant
    /// for the decayed variant.
    pub async fn retrieve_public(
        &self,
        excluded_authors: &[Uuid],
        limit: usize,
        scoring: PopularityScoring,
        now: DateTime<Utc>,
    ) -> Result<Vec<Candidate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let items = self
            .content
            .find_public_excluding_authors(excluded_authors, CandidateSort::Engagement, limit)
            .await?;
        debug!("Retrieved {} popularity candidates", items.len());

        let mut candidates: Vec<Candidate> = items
            .into_iter()
            .map(|item| {
                let score = match scoring {
                    PopularityScoring::RawEngagement => engagement_score(&item),
                    PopularityScoring::TimeDecayed => trending_score(&item, now),
                };
                Candidate {
                    item,
                    source: CandidateSource::Popularity,
                    score,
                }
            })
            .collect();

        // The store hint orders by raw engagement; the decayed variant can
        // reorder within the fetched window.
        candidates.sort_by(|a, b| rank_ordering(a.score, &a.item, b.score, &b.item));

        Ok(candidates)
    }
}

#[async_trait]
impl CandidateRetriever for PopularityRetriever {
    async fn retrieve(&self, viewer: &ViewerContext, limit: usize) -> Result<Vec<Candidate>> {
        let excluded = viewer.recommended_exclusions();
        self.retrieve_public(&excluded, limit, PopularityScoring::RawEngagement, Utc::now())
            .await
    }

    fn source(&self) -> CandidateSource {
        CandidateSource::Popularity
    }
}
