/// Feed Service Library
///
/// Builds the composed feeds for the Meridian social platform: the
/// personalized home feed (graph, co-engagement, and popularity sourcing
/// under a configurable mix ratio), plus the trending and discover streams.
///
/// # Modules
///
/// - `handlers`: Feed HTTP request handlers
/// - `models`: Content, viewer, candidate, and page types
/// - `services`: Composers and scoring formulas
/// - `retrievers`: Candidate sourcing strategies
/// - `stores`: Content and social graph store traits plus Postgres backends
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod openapi;
pub mod retrievers;
pub mod services;
pub mod stores;

pub use config::Config;
pub use error::{AppError, Result};
