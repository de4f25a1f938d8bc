/// Configuration management for Feed Service
///
/// This module handles loading and managing configuration from environment
/// variables.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Feed composition configuration
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Feed composition configuration (mix ratio, ranking weights, candidate
/// limits)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Fraction of each page sourced from followed authors
    pub graph_fraction: f64,
    /// Weight of the engagement term in the unified score
    pub engagement_weight: f64,
    /// Weight of the recency term in the unified score
    pub recency_weight: f64,
    /// Hours for the recency factor to halve
    pub recency_half_life_hours: f64,
    /// Hard cap on candidates fetched per retrieval lane
    pub max_candidates: usize,
    /// Overfetch factor applied to the requested window
    pub candidate_prefetch_multiplier: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("FEED_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("FEED_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8084),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/meridian".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            feed: FeedConfig {
                graph_fraction: parse_env_or_default("FEED_GRAPH_FRACTION", 0.7)?,
                engagement_weight: parse_env_or_default("FEED_ENGAGEMENT_WEIGHT", 0.3)?,
                recency_weight: parse_env_or_default("FEED_RECENCY_WEIGHT", 0.7)?,
                recency_half_life_hours: parse_env_or_default("FEED_RECENCY_HALF_LIFE_HOURS", 48.0)?,
                max_candidates: std::env::var("FEED_MAX_CANDIDATES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500),
                candidate_prefetch_multiplier: std::env::var("FEED_CANDIDATE_PREFETCH_MULTIPLIER")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.feed.graph_fraction) {
            return Err(format!(
                "FEED_GRAPH_FRACTION must be within [0, 1], got {}",
                self.feed.graph_fraction
            ));
        }
        if self.feed.recency_half_life_hours <= 0.0 {
            return Err(format!(
                "FEED_RECENCY_HALF_LIFE_HOURS must be positive, got {}",
                self.feed.recency_half_life_hours
            ));
        }
        if self.feed.candidate_prefetch_multiplier == 0 {
            return Err("FEED_CANDIDATE_PREFETCH_MULTIPLIER must be at least 1".to_string());
        }
        Ok(())
    }
}

fn parse_env_or_default(key: &str, default: f64) -> Result<f64, String> {
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
