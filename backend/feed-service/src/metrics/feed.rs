use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    /// Duration of feed composition by feed type (personalized, trending, discover).
    pub static ref FEED_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "feed_request_duration_seconds",
        "Feed request duration segmented by feed type",
        &["feed_type"]
    )
    .expect("failed to register feed_request_duration_seconds");

    /// Total feed requests processed by feed type.
    pub static ref FEED_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_request_total",
        "Total feed requests segmented by feed type",
        &["feed_type"]
    )
    .expect("failed to register feed_request_total");

    /// Count of candidates retrieved per sourcing strategy.
    pub static ref FEED_CANDIDATE_COUNT: HistogramVec = register_histogram_vec!(
        "feed_candidate_count",
        "Number of feed candidates retrieved segmented by source",
        &["source"]
    )
    .expect("failed to register feed_candidate_count");
}
