//! Metrics declaration and initialization.
//!
//! Available with the `metrics` feature. Every recording site in the crate is
//! compiled out when the feature is disabled.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Fetch registry metrics

    /// Track number of fetches started.
    pub static ref FETCHES_STARTED: &'static str = {
        metrics::describe_counter!(
            "stream_override_fetches_started_total",
            "Total number of replacement fetches started."
        );
        "stream_override_fetches_started_total"
    };
    /// Track number of fetch requests deduplicated (skipped).
    pub static ref FETCHES_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "stream_override_fetches_deduplicated_total",
            "Total number of fetch requests skipped because a fetch already existed."
        );
        "stream_override_fetches_deduplicated_total"
    };
    /// Track number of failed or timed out fetches.
    pub static ref FETCHES_FAILED: &'static str = {
        metrics::describe_counter!(
            "stream_override_fetches_failed_total",
            "Total number of fetches that completed without a payload."
        );
        "stream_override_fetches_failed_total"
    };
    /// Histogram of fetch duration.
    pub static ref FETCH_DURATION: &'static str = {
        metrics::describe_histogram!(
            "stream_override_fetch_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of replacement fetches in seconds."
        );
        "stream_override_fetch_duration_seconds"
    };

    // Coordinator metrics

    /// Track number of reads served with replacement data.
    pub static ref OVERRIDE_HITS: &'static str = {
        metrics::describe_counter!(
            "stream_override_hits_total",
            "Total number of reads served with replacement streaming data."
        );
        "stream_override_hits_total"
    };
    /// Track number of reads that fell back to the original data.
    pub static ref OVERRIDE_MISSES: &'static str = {
        metrics::describe_counter!(
            "stream_override_misses_total",
            "Total number of reads that kept the original streaming data."
        );
        "stream_override_misses_total"
    };
    /// Track number of incomplete reads on latency-sensitive threads.
    pub static ref PREMATURE_READS: &'static str = {
        metrics::describe_counter!(
            "stream_override_premature_reads_total",
            "Total number of reads of an incomplete fetch on a latency-sensitive thread."
        );
        "stream_override_premature_reads_total"
    };
    /// Track number of request bodies suppressed.
    pub static ref BODIES_SUPPRESSED: &'static str = {
        metrics::describe_counter!(
            "stream_override_bodies_suppressed_total",
            "Total number of playback request bodies removed."
        );
        "stream_override_bodies_suppressed_total"
    };
    /// Track number of errors absorbed at an operation boundary.
    pub static ref OPERATION_ERRORS: &'static str = {
        metrics::describe_counter!(
            "stream_override_operation_errors_total",
            "Total number of errors converted to pass-through results."
        );
        "stream_override_operation_errors_total"
    };
}

/// Record a read of the override bytes.
///
/// When the `metrics` feature is disabled, this function is a no-op
/// and will be eliminated by the compiler.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_override_read(hit: bool) {
    let counter = if hit { *OVERRIDE_HITS } else { *OVERRIDE_MISSES };
    metrics::counter!(counter).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_override_read(_hit: bool) {}

/// Record an error absorbed by an operation, labelled with the operation name.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_operation_error(operation: &'static str) {
    metrics::counter!(*OPERATION_ERRORS, "operation" => operation).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_operation_error(_operation: &'static str) {}
