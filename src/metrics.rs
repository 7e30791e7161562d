use lazy_static::lazy_static;
use prometheus::{register_histogram, register_int_counter, Histogram, IntCounter};
use std::time::Instant;
use tracing::debug;

lazy_static! {
    pub static ref QUERY_COUNTER: IntCounter = register_int_counter!(
        "plugin_queries_total",
        "Total number of monitoring query attempts"
    ).unwrap();

    pub static ref QUERY_FAILURES: IntCounter = register_int_counter!(
        "plugin_query_failures_total",
        "Total number of failed monitoring query attempts"
    ).unwrap();

    pub static ref QUERY_DURATION: Histogram = register_histogram!(
        "plugin_query_duration_seconds",
        "Monitoring query round trip in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    pub static ref LINES_EMITTED: IntCounter = register_int_counter!(
        "plugin_lines_emitted_total",
        "Total number of metric lines written"
    ).unwrap();
}

/// Counts one query attempt and observes its duration on drop.
pub struct QueryTimer {
    start: Instant,
}

impl QueryTimer {
    pub fn new() -> Self {
        QUERY_COUNTER.inc();
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for QueryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        QUERY_DURATION.observe(self.start.elapsed().as_secs_f64());
    }
}

pub fn record_query_failure() {
    QUERY_FAILURES.inc();
}

pub fn record_lines_emitted(count: usize) {
    LINES_EMITTED.inc_by(count as u64);
}

pub fn log_summary() {
    debug!(
        "queries={} failures={} lines={} query_seconds={:.3}",
        QUERY_COUNTER.get(),
        QUERY_FAILURES.get(),
        LINES_EMITTED.get(),
        QUERY_DURATION.get_sample_sum()
    );
}
