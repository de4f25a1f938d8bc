//! Personalized feed composition.
//!
//! Slot sourcing follows the configured mix ratio: each page window reserves
//! `floor(L × graph_fraction)` slots for followed authors and hands the rest
//! (plus any graph shortfall) to the recommended lanes, co-engagement before
//! popularity; a recommended shortfall falls back to remaining followed
//! supply, so a window only comes up short when every lane is exhausted.
//! Sourcing decides *which* items enter a page; the unified score then
//! decides presentation order within it, so a hot recommended item may
//! display above a quiet followed one.
//!
//! Pagination recomputes the ranked set per request instead of keeping a
//! cursor: for page P all windows 1..=P are re-derived from freshly
//! retrieved pools, skipping identities selected in earlier windows, which
//! makes pages of one parameter set disjoint by construction. One candidate
//! past the requested window is pulled as a lookahead so `has_more` reflects
//! whether anything selectable is actually left.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::config::FeedConfig;
use crate::error::{AppError, Result};
use crate::metrics::feed::FEED_CANDIDATE_COUNT;
use crate::models::{Candidate, ContentItem, FeedType, MixRatio, RankedPage, ViewerContext};
use crate::retrievers::CandidateRetriever;
use crate::services::scoring::{rank_ordering, unified_score, RankingWeights};
use crate::services::trending::finish;
use crate::services::validate_pagination;
use crate::stores::SocialGraphStore;

#[derive(Debug, Clone)]
pub struct FeedComposerConfig {
    pub mix_ratio: MixRatio,
    pub weights: RankingWeights,
    pub max_candidates: usize,
    pub candidate_prefetch_multiplier: usize,
}

impl Default for FeedComposerConfig {
    fn default() -> Self {
        Self {
            mix_ratio: MixRatio::default(),
            weights: RankingWeights::default(),
            max_candidates: 500,
            candidate_prefetch_multiplier: 5,
        }
    }
}

impl From<&FeedConfig> for FeedComposerConfig {
    fn from(config: &FeedConfig) -> Self {
        let graph = config.graph_fraction.clamp(0.0, 1.0);
        FeedComposerConfig {
            mix_ratio: MixRatio {
                graph,
                recommended: 1.0 - graph,
            },
            weights: RankingWeights::from(config),
            max_candidates: config.max_candidates.max(1),
            candidate_prefetch_multiplier: config.candidate_prefetch_multiplier.max(1),
        }
    }
}

pub struct FeedComposer {
    graph: Arc<dyn CandidateRetriever>,
    co_engagement: Arc<dyn CandidateRetriever>,
    popularity: Arc<dyn CandidateRetriever>,
    social: Arc<dyn SocialGraphStore>,
    config: FeedComposerConfig,
}

impl FeedComposer {
    pub fn new(
        graph: Arc<dyn CandidateRetriever>,
        co_engagement: Arc<dyn CandidateRetriever>,
        popularity: Arc<dyn CandidateRetriever>,
        social: Arc<dyn SocialGraphStore>,
        config: FeedComposerConfig,
    ) -> Self {
        Self {
            graph,
            co_engagement,
            popularity,
            social,
            config,
        }
    }

    /// Compose the personalized feed page for `viewer_id` at the current
    /// instant.
    pub async fn compose(&self, viewer_id: Uuid, page: u32, page_size: u32) -> Result<RankedPage> {
        self.compose_at(viewer_id, page, page_size, Utc::now()).await
    }

    /// Compose with an explicit evaluation instant. Two calls with the same
    /// arguments against an unchanged store return identical pages.
    pub async fn compose_at(
        &self,
        viewer_id: Uuid,
        page: u32,
        page_size: u32,
        now: DateTime<Utc>,
    ) -> Result<RankedPage> {
        validate_pagination(page, page_size)?;

        let start = Instant::now();
        debug!(
            "Composing personalized feed for viewer {} (page {}, size {})",
            viewer_id, page, page_size
        );

        if !self.social.user_exists(viewer_id).await? {
            return Err(AppError::ViewerNotFound(viewer_id));
        }
        let following = self.social.following_of(viewer_id).await?;
        let viewer = ViewerContext::new(viewer_id, following);

        let page = page as usize;
        let page_size = page_size as usize;

        // Enough for every window up to the requested page plus the
        // has_more lookahead, overfetched to absorb dedupe losses.
        let wanted = page * page_size + 1;
        let fetch_limit = wanted
            .max(page_size * self.config.candidate_prefetch_multiplier)
            .min(self.config.max_candidates);

        // One retrieval pass per request; a failed lane fails the whole
        // composition rather than silently degrading the mix.
        let (graph_result, co_result, pop_result) = tokio::join!(
            self.graph.retrieve(&viewer, fetch_limit),
            self.co_engagement.retrieve(&viewer, fetch_limit),
            self.popularity.retrieve(&viewer, fetch_limit),
        );
        let graph_pool = graph_result?;
        let co_pool = co_result?;
        let popularity_pool = pop_result?;

        FEED_CANDIDATE_COUNT
            .with_label_values(&["graph"])
            .observe(graph_pool.len() as f64);
        FEED_CANDIDATE_COUNT
            .with_label_values(&["co_engagement"])
            .observe(co_pool.len() as f64);
        FEED_CANDIDATE_COUNT
            .with_label_values(&["popularity"])
            .observe(popularity_pool.len() as f64);

        let selection = select_windows(
            &self.config.mix_ratio,
            graph_pool,
            co_pool,
            popularity_pool,
            page,
            page_size,
        );

        let mut scored: Vec<(f64, ContentItem)> = selection
            .window
            .into_iter()
            .map(|candidate| {
                (
                    unified_score(&candidate.item, now, &self.config.weights),
                    candidate.item,
                )
            })
            .collect();
        scored.sort_by(|a, b| rank_ordering(a.0, &a.1, b.0, &b.1));
        let items: Vec<ContentItem> = scored.into_iter().map(|(_, item)| item).collect();

        let has_more = selection.assembled > page * page_size;
        let ranked = RankedPage::new(
            items,
            page as u32,
            page_size as u32,
            selection.assembled as u64,
            has_more,
            FeedType::Personalized,
        );

        Ok(finish(ranked, start))
    }
}

/// The requested page window plus how many candidates all windows and the
/// lookahead assembled. Totals are over this retrieval-bounded universe.
struct WindowSelection {
    window: Vec<Candidate>,
    assembled: usize,
}

/// Fill page windows 1..=`page` from the retrieval pools.
///
/// Every window gets the same slot budget; identities selected in any
/// earlier window (or earlier lane of the same window) are skipped, so
/// windows are disjoint and an item appears at most once overall. Unfilled
/// graph budget moves to the recommended lanes and unfilled recommended
/// budget falls back to the graph stream, so a window smaller than the page
/// size means all three pools are exhausted.
fn select_windows(
    mix: &MixRatio,
    graph_pool: Vec<Candidate>,
    co_pool: Vec<Candidate>,
    popularity_pool: Vec<Candidate>,
    page: usize,
    page_size: usize,
) -> WindowSelection {
    let slots = mix.slots(page_size);
    let mut graph_stream = graph_pool.into_iter();
    let mut co_stream = co_pool.into_iter();
    let mut popularity_stream = popularity_pool.into_iter();

    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut assembled = 0usize;
    let mut window = Vec::new();

    for current in 1..=page {
        let mut selected = Vec::with_capacity(page_size);

        let graph_taken = fill_slots(&mut graph_stream, &mut seen, slots.graph, &mut selected);
        // Graph shortfall rolls into the recommended budget so the window
        // still aims for a full page.
        let recommended_budget = slots.recommended + (slots.graph - graph_taken);
        let co_taken = fill_slots(&mut co_stream, &mut seen, recommended_budget, &mut selected);
        fill_slots(
            &mut popularity_stream,
            &mut seen,
            recommended_budget - co_taken,
            &mut selected,
        );
        // A recommended shortfall falls back to the graph stream; after
        // this pass a short window means every lane is exhausted.
        let unfilled = page_size - selected.len();
        fill_slots(&mut graph_stream, &mut seen, unfilled, &mut selected);

        assembled += selected.len();
        let exhausted = selected.is_empty();
        if current == page {
            window = selected;
        }
        if exhausted {
            break;
        }
    }

    // Pull one candidate past the requested page so has_more reflects
    // whether anything selectable is actually left.
    let mut lookahead = Vec::with_capacity(1);
    let mut lookahead_taken = fill_slots(&mut graph_stream, &mut seen, 1, &mut lookahead);
    if lookahead_taken == 0 {
        lookahead_taken = fill_slots(&mut co_stream, &mut seen, 1, &mut lookahead);
    }
    if lookahead_taken == 0 {
        lookahead_taken = fill_slots(&mut popularity_stream, &mut seen, 1, &mut lookahead);
    }
    assembled += lookahead_taken;

    WindowSelection { window, assembled }
}

/// Move up to `budget` not-yet-seen candidates from `stream` into `out`.
/// Returns how many were taken.
fn fill_slots(
    stream: &mut std::vec::IntoIter<Candidate>,
    seen: &mut HashSet<Uuid>,
    budget: usize,
    out: &mut Vec<Candidate>,
) -> usize {
    let mut taken = 0;
    while taken < budget {
        match stream.next() {
            Some(candidate) => {
                if seen.insert(candidate.item.id) {
                    out.push(candidate);
                    taken += 1;
                }
            }
            None => break,
        }
    }
    taken
}
