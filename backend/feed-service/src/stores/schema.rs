use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

/// Ensure the tables backing the feed queries exist.
///
/// Lazily created at service startup to unblock environments where
/// migrations have not been applied yet (e.g. fresh developer machines or
/// CI spins).
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    info!("Ensuring feed service tables exist");

    sqlx::query(USERS_TABLE).execute(pool).await?;
    sqlx::query(POSTS_TABLE).execute(pool).await?;
    sqlx::query(LIKES_TABLE).execute(pool).await?;
    sqlx::query(FOLLOWS_TABLE).execute(pool).await?;

    Ok(())
}

const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const POSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    author_id UUID NOT NULL,
    visibility TEXT NOT NULL DEFAULT 'public',
    like_count BIGINT NOT NULL DEFAULT 0,
    comment_count BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const LIKES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS likes (
    user_id UUID NOT NULL,
    post_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (user_id, post_id)
)
"#;

const FOLLOWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS follows (
    follower_id UUID NOT NULL,
    followee_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (follower_id, followee_id)
)
"#;
