//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bot_commands_total` (counter): dispatched commands by room
//! - `bot_dispatch_failures_total` (counter): command chains that returned an error
//! - `bot_replies_sent_total` (counter): replies handed to the chat writer
//! - `bot_outbound_failures_total` (counter): queued jobs that panicked
//! - `bot_queue_pending` (gauge): jobs waiting for capacity
//! - `bot_chat_reconnects_total` (counter): chat reconnect attempts
//! - `bot_viewers` (gauge): viewer sockets by room
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to start metrics endpoint"),
    }
}

pub fn record_command(room: &str) {
    metrics::counter!("bot_commands_total", "room" => room.to_string()).increment(1);
}

pub fn record_dispatch_failure() {
    metrics::counter!("bot_dispatch_failures_total").increment(1);
}

pub fn record_reply_sent() {
    metrics::counter!("bot_replies_sent_total").increment(1);
}

pub fn record_outbound_failure() {
    metrics::counter!("bot_outbound_failures_total").increment(1);
}

pub fn record_queue_pending(pending: usize) {
    metrics::gauge!("bot_queue_pending").set(pending as f64);
}

pub fn record_chat_reconnect() {
    metrics::counter!("bot_chat_reconnects_total").increment(1);
}

pub fn record_viewers(room: &str, viewers: usize) {
    metrics::gauge!("bot_viewers", "room" => room.to_string()).set(viewers as f64);
}
