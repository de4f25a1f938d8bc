//! Feed composition services.
//!
//! The composers orchestrate retrieval, scoring, dedupe, and pagination.
//! [`feed::FeedComposer`] builds the personalized feed from all three
//! retrieval lanes; [`trending::TrendingComposer`] and
//! [`discover::DiscoverComposer`] are single-stream variants sharing the
//! same scoring and pagination contract.

pub mod discover;
pub mod feed;
pub mod scoring;
pub mod trending;

pub use discover::DiscoverComposer;
pub use feed::{FeedComposer, FeedComposerConfig};
pub use trending::TrendingComposer;

use crate::error::{AppError, Result};

/// Reject bad paging parameters before any store call.
pub(crate) fn validate_pagination(page: u32, page_size: u32) -> Result<()> {
    if page < 1 {
        return Err(AppError::InvalidPagination(format!(
            "page must be >= 1, got {}",
            page
        )));
    }
    if page_size == 0 {
        return Err(AppError::InvalidPagination(
            "page_size must be > 0".to_string(),
        ));
    }
    Ok(())
}
