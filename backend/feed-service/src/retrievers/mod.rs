//! Candidate retrieval strategies.
//!
//! Each retriever produces a bounded, re-invocable stream of scored
//! candidates from one sourcing strategy. Retrievers never retry store
//! failures and never write; failures surface to the composer.

mod co_engagement;
mod graph;
mod popularity;

pub use co_engagement::CoEngagementRetriever;
pub use graph::GraphRetriever;
pub use popularity::{PopularityRetriever, PopularityScoring};

use crate::error::Result;
use crate::models::{Candidate, CandidateSource, ViewerContext};
use async_trait::async_trait;

#[async_trait]
pub trait CandidateRetriever: Send + Sync {
    /// Up to `limit` feed-eligible candidates for `viewer`, scored by the
    /// strategy's own formula.
    async fn retrieve(&self, viewer: &ViewerContext, limit: usize) -> Result<Vec<Candidate>>;

    /// Provenance tag attached to returned candidates.
    fn source(&self) -> CandidateSource;
}
