//! Prometheus Metrics Module
//!
//! Exposes gateway metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Ticks**: tick events received and dropped (unknown instrument)
//! - **Records**: records written to / dropped by the transmission channel
//! - **Session**: submit and protocol error counts, interested instruments
//! - **Latency**: tick dispatch duration
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::domain::record::RecordKind;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let builder = PrometheusBuilder::new();
            let handle = builder
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "feed_gateway_ticks_total",
        "Total tick events received from the feed"
    );
    describe_counter!(
        "feed_gateway_ticks_unknown_instrument_total",
        "Tick events dropped because the directory could not resolve the symbol"
    );

    describe_counter!(
        "feed_gateway_records_written_total",
        "Records accepted by the transmission channel, weighted by receiver count"
    );
    describe_counter!(
        "feed_gateway_records_dropped_total",
        "Records the transmission channel could not accept"
    );

    describe_counter!(
        "feed_gateway_protocol_errors_total",
        "Non-zero vendor error codes received from the feed"
    );

    describe_gauge!(
        "feed_gateway_interested_instruments",
        "Instruments in the current interest set"
    );

    describe_histogram!(
        "feed_gateway_tick_dispatch_seconds",
        "Time to normalize and dispatch one tick event"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a tick event received from the feed.
pub fn record_tick_received() {
    counter!("feed_gateway_ticks_total").increment(1);
}

/// Record a tick dropped because its symbol did not resolve.
pub fn record_unknown_instrument() {
    counter!("feed_gateway_ticks_unknown_instrument_total").increment(1);
}

/// Record a successful channel write.
pub fn record_written(kind: RecordKind, receivers: u64) {
    counter!(
        "feed_gateway_records_written_total",
        "kind" => kind.as_str()
    )
    .increment(receivers.max(1));
}

/// Record a failed channel write.
pub fn record_dropped(kind: RecordKind) {
    counter!(
        "feed_gateway_records_dropped_total",
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// Record a non-zero vendor error code.
pub fn record_protocol_error(kind: &'static str) {
    counter!(
        "feed_gateway_protocol_errors_total",
        "kind" => kind
    )
    .increment(1);
}

/// Update the interested instrument gauge.
pub fn set_interested_instruments(count: f64) {
    gauge!("feed_gateway_interested_instruments").set(count);
}

/// Record the duration of one tick dispatch.
pub fn record_dispatch_duration(duration: Duration) {
    histogram!("feed_gateway_tick_dispatch_seconds").record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================
