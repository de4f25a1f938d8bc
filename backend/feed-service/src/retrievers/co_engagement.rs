use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::CandidateRetriever;
use crate::error::Result;
use crate::models::{Candidate, CandidateSource, ViewerContext};
use crate::stores::ContentStore;

/// Public content the viewer's network engaged with: items liked by at
/// least one followed identity, from authors the viewer does not already
/// follow. Score = how many followed identities liked the item.
///
/// Items with zero followed likers are excluded at the store query, so this
/// lane never returns low-signal filler.
pub struct CoEngagementRetriever {
    content: Arc<dyn ContentStore>,
}

impl CoEngagementRetriever {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }
}

#[async_trait]
impl CandidateRetriever for CoEngagementRetriever {
    async fn retrieve(&self, viewer: &ViewerContext, limit: usize) -> Result<Vec<Candidate>> {
        if viewer.following.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let likers: Vec<Uuid> = viewer.following.iter().copied().collect();
        let excluded = viewer.recommended_exclusions();
        let co_liked = self
            .content
            .find_public_liked_by(&likers, &excluded, limit)
            .await?;
        debug!(
            "Retrieved {} co-engagement candidates for viewer {}",
            co_liked.len(),
            viewer.viewer_id
        );

        Ok(co_liked
            .into_iter()
            .map(|co| Candidate {
                score: co.followed_likers as f64,
                item: co.item,
                source: CandidateSource::CoEngagement,
            })
            .collect())
    }

    fn source(&self) -> CandidateSource {
        CandidateSource::CoEngagement
    }
}
