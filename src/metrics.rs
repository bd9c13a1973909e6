use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, register_counter, register_counter_vec, register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: CounterVec = register_counter_vec!(
        "visits_requests_total",
        "Total number of visit API requests",
        &["method"]
    )
    .unwrap();
    pub static ref INCREMENTS: Counter =
        register_counter!("visits_increments_total", "Successful counter increments").unwrap();
    pub static ref REJECTIONS: CounterVec = register_counter_vec!(
        "visits_rejections_total",
        "Increment attempts refused by policy",
        &["reason"]
    )
    .unwrap();
    pub static ref STORE_ERRORS: Counter = register_counter!(
        "visits_store_errors_total",
        "Requests failed by the counter store"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "visits_request_latency_seconds",
        "Visit API latency in seconds"
    )
    .unwrap();
}
