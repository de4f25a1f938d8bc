//! Storage abstractions for content and the social graph.
//!
//! Composers and retrievers depend on these traits only; the Postgres
//! implementations live in [`postgres`], and tests swap in in-memory
//! implementations.

mod postgres;
mod schema;

pub use postgres::{PgContentStore, PgSocialGraphStore};
pub use schema::ensure_schema;

use crate::error::Result;
use crate::models::{CoLikedItem, ContentItem};
use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

/// Ordering hint for candidate queries against the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSort {
    /// Newest first (created_at descending)
    Recent,
    /// Highest raw engagement first (likes + double-weighted comments descending)
    Engagement,
}

/// Read access to content items.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Public items authored by any of `authors`, newest first.
    /// Returns an empty vec when `authors` is empty.
    async fn find_public_by_authors(
        &self,
        authors: &[Uuid],
        limit: usize,
    ) -> Result<Vec<ContentItem>>;

    /// Public items from authors outside `excluded_authors`, ordered per
    /// `sort`. An empty exclusion list means the whole public corpus.
    async fn find_public_excluding_authors(
        &self,
        excluded_authors: &[Uuid],
        sort: CandidateSort,
        limit: usize,
    ) -> Result<Vec<ContentItem>>;

    /// Public items liked by at least one of `likers`, excluding items
    /// authored by `excluded_authors`, together with how many of the likers
    /// engaged with each. Ordered by that liker count descending.
    async fn find_public_liked_by(
        &self,
        likers: &[Uuid],
        excluded_authors: &[Uuid],
        limit: usize,
    ) -> Result<Vec<CoLikedItem>>;

    /// Number of public items from authors outside `excluded_authors`.
    async fn count_public(&self, excluded_authors: &[Uuid]) -> Result<u64>;
}

/// Read access to the follow graph.
#[async_trait]
pub trait SocialGraphStore: Send + Sync {
    /// Identities `user_id` follows.
    async fn following_of(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;

    /// Number of identities following `user_id`.
    async fn follower_count_of(&self, user_id: Uuid) -> Result<i64>;

    /// Whether `user_id` is a known identity.
    async fn user_exists(&self, user_id: Uuid) -> Result<bool>;
}
