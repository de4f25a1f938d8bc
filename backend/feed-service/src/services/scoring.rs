//! Scoring formulas for candidate ranking.
//!
//! Pure functions over content snapshots. Scores order items within a
//! response and are never persisted.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::warn;

use crate::config::FeedConfig;
use crate::models::ContentItem;

/// Weights for the unified presentation ordering of the personalized feed.
#[derive(Debug, Clone, Copy)]
pub struct RankingWeights {
    pub engagement_weight: f64,
    pub recency_weight: f64,
    pub recency_half_life_hours: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            engagement_weight: 0.3,
            recency_weight: 0.7,
            recency_half_life_hours: 48.0,
        }
    }
}

impl From<&FeedConfig> for RankingWeights {
    fn from(config: &FeedConfig) -> Self {
        Self {
            engagement_weight: config.engagement_weight,
            recency_weight: config.recency_weight,
            recency_half_life_hours: config.recency_half_life_hours.max(f64::MIN_POSITIVE),
        }
    }
}

fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    // Future-dated items count as brand new.
    (now - created_at).num_seconds().max(0) as f64 / 3600.0
}

/// Raw engagement: likes plus double-weighted comments. Commenting is a
/// stronger signal than liking.
pub fn engagement_score(item: &ContentItem) -> f64 {
    (item.like_count + 2 * item.comment_count) as f64
}

/// Half-life decay of content age, bounded to (0, 1]: 1.0 at creation, 0.5
/// after one half-life. Monotonically increasing in the creation timestamp.
pub fn recency_factor(created_at: DateTime<Utc>, now: DateTime<Utc>, half_life_hours: f64) -> f64 {
    0.5_f64.powf(age_hours(created_at, now) / half_life_hours)
}

/// Presentation-order score for the personalized feed:
/// `engagement_weight × engagement + recency_weight × recencyFactor`.
pub fn unified_score(item: &ContentItem, now: DateTime<Utc>, weights: &RankingWeights) -> f64 {
    weights.engagement_weight * engagement_score(item)
        + weights.recency_weight
            * recency_factor(item.created_at, now, weights.recency_half_life_hours)
}

/// Trending score: `0.8 × engagement + 0.2 × ageInDays`.
pub fn trending_score(item: &ContentItem, now: DateTime<Utc>) -> f64 {
    0.8 * engagement_score(item) + 0.2 * (age_hours(item.created_at, now) / 24.0)
}

/// Discover score: `0.4 × likes + 0.3 × comments + 0.3 × authorFollowers`.
/// Rewards content from well-followed authors even at low direct engagement.
pub fn discover_score(item: &ContentItem, author_follower_count: i64) -> f64 {
    0.4 * item.like_count as f64
        + 0.3 * item.comment_count as f64
        + 0.3 * author_follower_count as f64
}

/// Total ordering for ranked presentation: score descending, then newest
/// first, then id descending. NaN scores compare equal (with a warning)
/// instead of panicking, so the tie-break keys keep the order total.
pub fn rank_ordering(
    score_a: f64,
    item_a: &ContentItem,
    score_b: f64,
    item_b: &ContentItem,
) -> Ordering {
    let by_score = match score_b.partial_cmp(&score_a) {
        Some(ord) => ord,
        None => {
            warn!(
                item_a = %item_a.id,
                item_b = %item_b.id,
                score_a,
                score_b,
                "Encountered NaN score while ranking, falling back to recency"
            );
            Ordering::Equal
        }
    };
    by_score
        .then_with(|| item_b.created_at.cmp(&item_a.created_at))
        .then_with(|| item_b.id.cmp(&item_a.id))
}
