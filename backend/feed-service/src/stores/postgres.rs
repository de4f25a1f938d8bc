//! Postgres-backed implementations of the store traits.

use crate::error::Result;
use crate::models::{CoLikedItem, ContentItem, Visibility};
use crate::stores::{CandidateSort, ContentStore, SocialGraphStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// (id, author_id, like_count, comment_count, created_at)
type ItemRow = (Uuid, Uuid, i64, i64, DateTime<Utc>);

// Every query here filters on visibility = 'public', so rows map straight to
// public items.
fn item_from_row(row: ItemRow) -> ContentItem {
    let (id, author_id, like_count, comment_count, created_at) = row;
    ContentItem {
        id,
        author_id,
        visibility: Visibility::Public,
        like_count,
        comment_count,
        created_at,
    }
}

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn find_public_by_authors(
        &self,
        authors: &[Uuid],
        limit: usize,
    ) -> Result<Vec<ContentItem>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, author_id, like_count, comment_count, created_at
            FROM posts
            WHERE author_id = ANY($1)
              AND visibility = 'public'
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(authors)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(item_from_row).collect())
    }

    async fn find_public_excluding_authors(
        &self,
        excluded_authors: &[Uuid],
        sort: CandidateSort,
        limit: usize,
    ) -> Result<Vec<ContentItem>> {
        let query = match sort {
            CandidateSort::Recent => {
                r#"
                SELECT id, author_id, like_count, comment_count, created_at
                FROM posts
                WHERE author_id <> ALL($1)
                  AND visibility = 'public'
                ORDER BY created_at DESC, id DESC
                LIMIT $2
                "#
            }
            CandidateSort::Engagement => {
                r#"
                SELECT id, author_id, like_count, comment_count, created_at
                FROM posts
                WHERE author_id <> ALL($1)
                  AND visibility = 'public'
                ORDER BY like_count + 2 * comment_count DESC, created_at DESC, id DESC
                LIMIT $2
                "#
            }
        };

        let rows = sqlx::query_as::<_, ItemRow>(query)
            .bind(excluded_authors)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(item_from_row).collect())
    }

    async fn find_public_liked_by(
        &self,
        likers: &[Uuid],
        excluded_authors: &[Uuid],
        limit: usize,
    ) -> Result<Vec<CoLikedItem>> {
        if likers.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, Uuid, i64, i64, DateTime<Utc>, i64)>(
            r#"
            SELECT p.id, p.author_id, p.like_count, p.comment_count, p.created_at,
                   COUNT(l.user_id) AS followed_likers
            FROM posts p
            JOIN likes l ON l.post_id = p.id
            WHERE l.user_id = ANY($1)
              AND p.author_id <> ALL($2)
              AND p.visibility = 'public'
            GROUP BY p.id, p.author_id, p.like_count, p.comment_count, p.created_at
            ORDER BY followed_likers DESC, p.created_at DESC, p.id DESC
            LIMIT $3
            "#,
        )
        .bind(likers)
        .bind(excluded_authors)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, author_id, like_count, comment_count, created_at, followed_likers)| {
                CoLikedItem {
                    item: item_from_row((id, author_id, like_count, comment_count, created_at)),
                    followed_likers,
                }
            })
            .collect())
    }

    async fn count_public(&self, excluded_authors: &[Uuid]) -> Result<u64> {
        let (count,) = sqlx::query_as::<_, (i64,)>(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE author_id <> ALL($1)
              AND visibility = 'public'
            "#,
        )
        .bind(excluded_authors)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}

#[derive(Clone)]
pub struct PgSocialGraphStore {
    pool: PgPool,
}

impl PgSocialGraphStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialGraphStore for PgSocialGraphStore {
    async fn following_of(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let rows =
            sqlx::query_as::<_, (Uuid,)>("SELECT followee_id FROM follows WHERE follower_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn follower_count_of(&self, user_id: Uuid) -> Result<i64> {
        let (count,) =
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM follows WHERE followee_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        let (exists,) =
            sqlx::query_as::<_, (bool,)>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
