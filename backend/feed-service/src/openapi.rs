use utoipa::OpenApi;

use crate::models::{ContentItem, FeedType, RankedPage, Visibility};

/// OpenAPI document covering the feed endpoints.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meridian Feed Service API",
        version = "1.0.0",
        description = "Feed ranking and composition service. Builds personalized, trending, and discover feeds by merging graph, co-engagement, and popularity retrieval with per-strategy scoring, dedupe, and stable pagination.",
        contact(
            name = "Meridian Team",
            email = "team@meridian.dev"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8084", description = "Development server")
    ),
    paths(
        crate::handlers::feed::get_personalized_feed,
        crate::handlers::feed::get_trending_feed,
        crate::handlers::feed::get_discover_feed
    ),
    components(schemas(RankedPage, ContentItem, FeedType, Visibility)),
    tags(
        (name = "Feed", description = "Composed feed endpoints")
    )
)]
pub struct ApiDoc;
