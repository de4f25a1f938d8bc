//! In-memory store implementations for composer integration tests.
//!
//! These mirror the Postgres query contracts exactly, including ordering
//! (newest first with id as the final tie-break) and the public-visibility
//! filter, so composers behave the same against either backend.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use feed_service::error::{AppError, Result};
use feed_service::models::{CoLikedItem, ContentItem, Visibility};
use feed_service::stores::{CandidateSort, ContentStore, SocialGraphStore};
use std::cmp::Ordering;
use std::collections::HashSet;
use uuid::Uuid;

/// Public post authored `age_hours` before `now`.
#[allow(dead_code)]
pub fn post_at(
    author: Uuid,
    likes: i64,
    comments: i64,
    age_hours: i64,
    now: DateTime<Utc>,
) -> ContentItem {
    ContentItem {
        id: Uuid::new_v4(),
        author_id: author,
        visibility: Visibility::Public,
        like_count: likes,
        comment_count: comments,
        created_at: now - Duration::hours(age_hours),
    }
}

/// Private post authored `age_hours` before `now`.
#[allow(dead_code)]
pub fn private_post_at(author: Uuid, age_hours: i64, now: DateTime<Utc>) -> ContentItem {
    ContentItem {
        visibility: Visibility::Private,
        ..post_at(author, 0, 0, age_hours, now)
    }
}

fn by_recency(a: &ContentItem, b: &ContentItem) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Content store backed by plain vectors.
#[derive(Default)]
pub struct InMemoryContentStore {
    posts: Vec<ContentItem>,
    likes: Vec<(Uuid, Uuid)>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_post(&mut self, post: ContentItem) {
        self.posts.push(post);
    }

    #[allow(dead_code)]
    pub fn add_posts(&mut self, posts: impl IntoIterator<Item = ContentItem>) {
        self.posts.extend(posts);
    }

    /// Record that `user` liked `post_id`.
    #[allow(dead_code)]
    pub fn add_like(&mut self, user: Uuid, post_id: Uuid) {
        self.likes.push((user, post_id));
    }

    fn public_posts(&self) -> impl Iterator<Item = &ContentItem> {
        self.posts.iter().filter(|p| p.visibility.is_public())
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn find_public_by_authors(
        &self,
        authors: &[Uuid],
        limit: usize,
    ) -> Result<Vec<ContentItem>> {
        let mut found: Vec<ContentItem> = self
            .public_posts()
            .filter(|p| authors.contains(&p.author_id))
            .cloned()
            .collect();
        found.sort_by(by_recency);
        found.truncate(limit);
        Ok(found)
    }

    async fn find_public_excluding_authors(
        &self,
        excluded_authors: &[Uuid],
        sort: CandidateSort,
        limit: usize,
    ) -> Result<Vec<ContentItem>> {
        let mut found: Vec<ContentItem> = self
            .public_posts()
            .filter(|p| !excluded_authors.contains(&p.author_id))
            .cloned()
            .collect();
        match sort {
            CandidateSort::Recent => found.sort_by(by_recency),
            CandidateSort::Engagement => {
                let engagement = |p: &ContentItem| p.like_count + 2 * p.comment_count;
                found.sort_by(|a, b| {
                    engagement(b)
                        .cmp(&engagement(a))
                        .then_with(|| by_recency(a, b))
                });
            }
        }
        found.truncate(limit);
        Ok(found)
    }

    async fn find_public_liked_by(
        &self,
        likers: &[Uuid],
        excluded_authors: &[Uuid],
        limit: usize,
    ) -> Result<Vec<CoLikedItem>> {
        let mut found: Vec<CoLikedItem> = self
            .public_posts()
            .filter(|p| !excluded_authors.contains(&p.author_id))
            .filter_map(|p| {
                let followed_likers = self
                    .likes
                    .iter()
                    .filter(|(user, post)| *post == p.id && likers.contains(user))
                    .map(|(user, _)| *user)
                    .collect::<HashSet<_>>()
                    .len() as i64;
                (followed_likers > 0).then(|| CoLikedItem {
                    item: p.clone(),
                    followed_likers,
                })
            })
            .collect();
        found.sort_by(|a, b| {
            b.followed_likers
                .cmp(&a.followed_likers)
                .then_with(|| by_recency(&a.item, &b.item))
        });
        found.truncate(limit);
        Ok(found)
    }

    async fn count_public(&self, excluded_authors: &[Uuid]) -> Result<u64> {
        Ok(self
            .public_posts()
            .filter(|p| !excluded_authors.contains(&p.author_id))
            .count() as u64)
    }
}

/// Social graph store backed by plain vectors.
#[derive(Default)]
pub struct InMemorySocialGraphStore {
    follows: Vec<(Uuid, Uuid)>,
    users: HashSet<Uuid>,
}

impl InMemorySocialGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: Uuid) {
        self.users.insert(user);
    }

    /// Record `follower` -> `followee`. Both identities are registered.
    pub fn follow(&mut self, follower: Uuid, followee: Uuid) {
        self.users.insert(follower);
        self.users.insert(followee);
        self.follows.push((follower, followee));
    }
}

#[async_trait]
impl SocialGraphStore for InMemorySocialGraphStore {
    async fn following_of(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, followee)| *followee)
            .collect())
    }

    async fn follower_count_of(&self, user_id: Uuid) -> Result<i64> {
        Ok(self
            .follows
            .iter()
            .filter(|(_, followee)| *followee == user_id)
            .count() as i64)
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.users.contains(&user_id))
    }
}

/// Content store whose every call fails with `StoreUnavailable`.
#[allow(dead_code)]
pub struct FailingContentStore;

#[async_trait]
impl ContentStore for FailingContentStore {
    async fn find_public_by_authors(
        &self,
        _authors: &[Uuid],
        _limit: usize,
    ) -> Result<Vec<ContentItem>> {
        Err(AppError::StoreUnavailable("content store offline".into()))
    }

    async fn find_public_excluding_authors(
        &self,
        _excluded_authors: &[Uuid],
        _sort: CandidateSort,
        _limit: usize,
    ) -> Result<Vec<ContentItem>> {
        Err(AppError::StoreUnavailable("content store offline".into()))
    }

    async fn find_public_liked_by(
        &self,
        _likers: &[Uuid],
        _excluded_authors: &[Uuid],
        _limit: usize,
    ) -> Result<Vec<CoLikedItem>> {
        Err(AppError::StoreUnavailable("content store offline".into()))
    }

    async fn count_public(&self, _excluded_authors: &[Uuid]) -> Result<u64> {
        Err(AppError::StoreUnavailable("content store offline".into()))
    }
}

/// Social graph store whose every call fails with `StoreUnavailable`.
#[allow(dead_code)]
pub struct FailingSocialGraphStore;

#[async_trait]
impl SocialGraphStore for FailingSocialGraphStore {
    async fn following_of(&self, _user_id: Uuid) -> Result<HashSet<Uuid>> {
        Err(AppError::StoreUnavailable("graph store offline".into()))
    }

    async fn follower_count_of(&self, _user_id: Uuid) -> Result<i64> {
        Err(AppError::StoreUnavailable("graph store offline".into()))
    }

    async fn user_exists(&self, _user_id: Uuid) -> Result<bool> {
        Err(AppError::StoreUnavailable("graph store offline".into()))
    }
}
