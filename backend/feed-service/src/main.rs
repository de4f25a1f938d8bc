/// Feed Service - HTTP Server
///
/// Serves the composed feeds for the Meridian platform: the personalized
/// home feed plus the trending and discover streams. Content and the social
/// graph live in PostgreSQL; viewer identity arrives from the gateway via
/// the `x-user-id` header.
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use chrono::Utc;
use feed_service::handlers::feed::{
    get_discover_feed, get_personalized_feed, get_trending_feed, FeedHandlerState,
};
use feed_service::openapi::ApiDoc;
use feed_service::retrievers::{
    CandidateRetriever, CoEngagementRetriever, GraphRetriever, PopularityRetriever,
};
use feed_service::services::{
    DiscoverComposer, FeedComposer, FeedComposerConfig, TrendingComposer,
};
use feed_service::stores::{
    ensure_schema, ContentStore, PgContentStore, PgSocialGraphStore, SocialGraphStore,
};
use feed_service::Config;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "feed-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "feed-service"
        })),
    }
}

async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let pg_result = state.check_postgres().await;
    let pg_latency = Some(start.elapsed().as_millis() as u64);
    let ready = pg_result.is_ok();
    let postgres_check = match pg_result {
        Ok(_) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "PostgreSQL connection successful".to_string(),
            latency_ms: pg_latency,
        },
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("PostgreSQL connection failed: {}", e),
            latency_ms: pg_latency,
        },
    };
    checks.insert("postgresql".to_string(), postgres_check);

    let response = ReadinessResponse {
        ready,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

async fn openapi_json(
    doc: web::Data<utoipa::openapi::OpenApi>,
) -> feed_service::Result<HttpResponse> {
    let body = serde_json::to_string(&*doc)?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {}", e);
            eprintln!("ERROR: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    ensure_schema(&db_pool).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to ensure feed schema: {e}"),
        )
    })?;

    tracing::info!("Connected to database");

    let content: Arc<dyn ContentStore> = Arc::new(PgContentStore::new(db_pool.clone()));
    let social: Arc<dyn SocialGraphStore> = Arc::new(PgSocialGraphStore::new(db_pool.clone()));

    let graph: Arc<dyn CandidateRetriever> = Arc::new(GraphRetriever::new(content.clone()));
    let co_engagement: Arc<dyn CandidateRetriever> =
        Arc::new(CoEngagementRetriever::new(content.clone()));
    let popularity: Arc<dyn CandidateRetriever> =
        Arc::new(PopularityRetriever::new(content.clone()));

    let feed_state = web::Data::new(FeedHandlerState {
        personalized: Arc::new(FeedComposer::new(
            graph,
            co_engagement,
            popularity,
            social.clone(),
            FeedComposerConfig::from(&config.feed),
        )),
        trending: Arc::new(TrendingComposer::new(
            content.clone(),
            config.feed.max_candidates,
        )),
        discover: Arc::new(DiscoverComposer::new(
            content.clone(),
            social.clone(),
            config.feed.max_candidates,
        )),
    });

    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let openapi_doc = ApiDoc::openapi();

        App::new()
            .app_data(web::Data::new(openapi_doc.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api/v1/openapi.json", openapi_doc),
            )
            .route("/api/v1/openapi.json", web::get().to(openapi_json))
            .app_data(feed_state.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(feed_service::metrics::serve_metrics),
            )
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/ready", web::get().to(readiness_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1/feed")
                    .route("", web::get().to(get_personalized_feed))
                    .route("/trending", web::get().to(get_trending_feed))
                    .route("/discover", web::get().to(get_discover_feed)),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await
}
