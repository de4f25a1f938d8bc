//! Data models for the feed ranking and composition engine.
//!
//! - `ContentItem`: immutable snapshot of a post at retrieval time
//! - `ViewerContext`: per-request viewer identity plus follow set
//! - `Candidate`: a content item tagged with retrieval provenance and score
//! - `RankedPage`: the paginated response envelope for every feed type
//! - `MixRatio`: graph/recommended slot split for the personalized feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

/// Post visibility. Only public items (or the viewer's own) are feed-eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Immutable snapshot of a content item at retrieval time.
///
/// Engagement counters are whatever the store reported when the item was
/// fetched; they may lag live counters and must not be assumed stable across
/// a request's retrieval window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub author_id: Uuid,
    pub visibility: Visibility,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Viewer identity and follow set, constructed fresh per request.
///
/// No ambient/global session state: every composer call receives one of
/// these explicitly.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub viewer_id: Uuid,
    pub following: HashSet<Uuid>,
}

impl ViewerContext {
    pub fn new(viewer_id: Uuid, following: HashSet<Uuid>) -> Self {
        Self {
            viewer_id,
            following,
        }
    }

    pub fn is_following(&self, author_id: Uuid) -> bool {
        self.following.contains(&author_id)
    }

    /// Author ids whose content is never sourced through the recommended
    /// lanes: the viewer plus everyone already followed. Sorted so callers
    /// see a deterministic set.
    pub fn recommended_exclusions(&self) -> Vec<Uuid> {
        let mut excluded: Vec<Uuid> = self.following.iter().copied().collect();
        excluded.push(self.viewer_id);
        excluded.sort();
        excluded.dedup();
        excluded
    }
}

/// Which retrieval strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Graph,
    CoEngagement,
    Popularity,
}

impl CandidateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateSource::Graph => "graph",
            CandidateSource::CoEngagement => "co_engagement",
            CandidateSource::Popularity => "popularity",
        }
    }
}

/// A retrieved content item plus provenance and its strategy-specific score.
///
/// Created during retrieval, consumed during merge, dropped once the
/// response page is built.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub item: ContentItem,
    pub source: CandidateSource,
    pub score: f64,
}

/// A public item together with how many of the viewer's followed identities
/// liked it. Returned by the co-engagement store query.
#[derive(Debug, Clone)]
pub struct CoLikedItem {
    pub item: ContentItem,
    pub followed_likers: i64,
}

/// Slot allocation for one page window of the personalized feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotBudget {
    pub graph: usize,
    pub recommended: usize,
}

/// Target sourcing split between the graph lane and the recommended lanes.
///
/// Fractions must sum to 1.0. The ratio governs *sourcing* only; final
/// presentation order within a page is decided by the unified score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixRatio {
    pub graph: f64,
    pub recommended: f64,
}

impl MixRatio {
    pub fn new(graph: f64, recommended: f64) -> std::result::Result<Self, String> {
        if !(0.0..=1.0).contains(&graph) || !(0.0..=1.0).contains(&recommended) {
            return Err(format!(
                "mix ratio fractions must be within [0, 1], got {}/{}",
                graph, recommended
            ));
        }
        if (graph + recommended - 1.0).abs() > 1e-9 {
            return Err(format!(
                "mix ratio fractions must sum to 1.0, got {}/{}",
                graph, recommended
            ));
        }
        Ok(Self { graph, recommended })
    }

    /// Build from the graph-lane fraction alone.
    pub fn from_graph_fraction(graph: f64) -> std::result::Result<Self, String> {
        Self::new(graph, 1.0 - graph)
    }

    /// Slots for one page window: graph gets `floor(size × graph)`, the
    /// recommended lanes get the remainder.
    pub fn slots(&self, page_size: usize) -> SlotBudget {
        let graph = (page_size as f64 * self.graph).floor() as usize;
        SlotBudget {
            graph,
            recommended: page_size - graph,
        }
    }
}

impl Default for MixRatio {
    fn default() -> Self {
        Self {
            graph: 0.7,
            recommended: 0.3,
        }
    }
}

/// Which composed feed a page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Personalized,
    Trending,
    Discover,
}

impl FeedType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedType::Personalized => "personalized",
            FeedType::Trending => "trending",
            FeedType::Discover => "discover",
        }
    }
}

/// One page of a composed feed.
///
/// Page content is a deterministic function of (viewer, store state, page,
/// page size) at a single evaluation instant; no cross-request state is
/// involved, so identical calls against an unchanged store return identical
/// pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedPage {
    pub items: Vec<ContentItem>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub has_more: bool,
    pub feed_type: FeedType,
}

impl RankedPage {
    pub fn new(
        items: Vec<ContentItem>,
        page: u32,
        page_size: u32,
        total_items: u64,
        has_more: bool,
        feed_type: FeedType,
    ) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_items.div_ceil(page_size as u64) as u32
        };
        Self {
            items,
            page,
            total_pages,
            total_items,
            has_more,
            feed_type,
        }
    }

    pub fn empty(page: u32, feed_type: FeedType) -> Self {
        Self {
            items: Vec::new(),
            page,
            total_pages: 0,
            total_items: 0,
            has_more: false,
            feed_type,
        }
    }
}
