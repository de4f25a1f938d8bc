use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::CandidateRetriever;
use crate::error::Result;
use crate::models::{Candidate, CandidateSource, ViewerContext};
use crate::stores::ContentStore;

/// Recent public content authored by identities the viewer follows, newest
/// first. An empty follow set yields an empty stream, not an error.
pub struct GraphRetriever {
    content: Arc<dyn ContentStore>,
}

impl GraphRetriever {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }
}

#[async_trait]
impl CandidateRetriever for GraphRetriever {
    async fn retrieve(&self, viewer: &ViewerContext, limit: usize) -> Result<Vec<Candidate>> {
        if viewer.following.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let authors: Vec<Uuid> = viewer.following.iter().copied().collect();
        let items = self.content.find_public_by_authors(&authors, limit).await?;
        debug!(
            "Retrieved {} graph candidates for viewer {}",
            items.len(),
            viewer.viewer_id
        );

        Ok(items
            .into_iter()
            .map(|item| {
                // Graph candidates keep their recency ordering and are never
                // re-scored against the recommended lanes at sourcing time;
                // the score mirrors the ordering key.
                let score = item.created_at.timestamp() as f64;
                Candidate {
                    item,
                    source: CandidateSource::Graph,
                    score,
                }
            })
            .collect())
    }

    fn source(&self) -> CandidateSource {
        CandidateSource::Graph
    }
}
