//! HTTP handlers for the feed API.

pub mod feed;

pub use feed::FeedHandlerState;
