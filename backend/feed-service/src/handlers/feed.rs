use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::{DiscoverComposer, FeedComposer, TrendingComposer};

const USER_ID_HEADER: &str = "x-user-id";
const MAX_PAGE_SIZE: u32 = 100;

/// Shared handler state: one composer per feed type.
pub struct FeedHandlerState {
    pub personalized: Arc<FeedComposer>,
    pub trending: Arc<TrendingComposer>,
    pub discover: Arc<DiscoverComposer>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQueryParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl FeedQueryParams {
    /// Requested size capped at the service maximum. Zero is passed through
    /// so the composers reject it as invalid pagination.
    fn capped_page_size(&self) -> u32 {
        self.page_size.min(MAX_PAGE_SIZE)
    }
}

/// Personalized feed for the viewer identified by the gateway header.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    tag = "Feed",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Personalized feed page", body = crate::models::RankedPage),
        (status = 400, description = "Invalid pagination"),
        (status = 401, description = "Missing or malformed x-user-id header"),
        (status = 404, description = "Viewer not found"),
        (status = 503, description = "Backing store unavailable")
    )
)]
pub async fn get_personalized_feed(
    query: web::Query<FeedQueryParams>,
    http_req: HttpRequest,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let viewer_id = extract_viewer_id(&http_req)?;
    debug!(
        "Feed request: viewer={} page={} page_size={}",
        viewer_id, query.page, query.page_size
    );

    let page = state
        .personalized
        .compose(viewer_id, query.page, query.capped_page_size())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Trending feed over all public content; no viewer context involved.
#[utoipa::path(
    get,
    path = "/api/v1/feed/trending",
    tag = "Feed",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Trending feed page", body = crate::models::RankedPage),
        (status = 400, description = "Invalid pagination"),
        (status = 503, description = "Backing store unavailable")
    )
)]
pub async fn get_trending_feed(
    query: web::Query<FeedQueryParams>,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    debug!(
        "Trending request: page={} page_size={}",
        query.page, query.page_size
    );

    let page = state
        .trending
        .compose(query.page, query.capped_page_size())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Discover feed for the viewer identified by the gateway header.
#[utoipa::path(
    get,
    path = "/api/v1/feed/discover",
    tag = "Feed",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("page_size" = Option<u32>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Discover feed page", body = crate::models::RankedPage),
        (status = 400, description = "Invalid pagination"),
        (status = 401, description = "Missing or malformed x-user-id header"),
        (status = 404, description = "Viewer not found"),
        (status = 503, description = "Backing store unavailable")
    )
)]
pub async fn get_discover_feed(
    query: web::Query<FeedQueryParams>,
    http_req: HttpRequest,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let viewer_id = extract_viewer_id(&http_req)?;
    debug!(
        "Discover request: viewer={} page={} page_size={}",
        viewer_id, query.page, query.page_size
    );

    let page = state
        .discover
        .compose(viewer_id, query.page, query.capped_page_size())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

fn extract_viewer_id(req: &HttpRequest) -> Result<Uuid> {
    let header_value = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".into()))?;

    let value = header_value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid x-user-id header".into()))?;

    Uuid::parse_str(value)
        .map_err(|_| AppError::Unauthorized("Invalid x-user-id header value".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn page_size_is_capped_not_floored() {
        let oversized = FeedQueryParams {
            page: 1,
            page_size: 500,
        };
        assert_eq!(oversized.capped_page_size(), 100);

        // Zero must survive the cap so the composer can reject it.
        let zero = FeedQueryParams {
            page: 1,
            page_size: 0,
        };
        assert_eq!(zero.capped_page_size(), 0);
    }

    #[test]
    fn viewer_id_header_extraction() {
        let viewer = Uuid::new_v4();
        let ok = TestRequest::default()
            .insert_header((USER_ID_HEADER, viewer.to_string()))
            .to_http_request();
        assert_eq!(extract_viewer_id(&ok).unwrap(), viewer);

        let missing = TestRequest::default().to_http_request();
        assert!(matches!(
            extract_viewer_id(&missing),
            Err(AppError::Unauthorized(_))
        ));

        let malformed = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        assert!(matches!(
            extract_viewer_id(&malformed),
            Err(AppError::Unauthorized(_))
        ));
    }
}
