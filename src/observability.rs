use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reservations accepted.
pub const BOOKINGS_CREATED_TOTAL: &str = "skybook_bookings_created_total";

/// Counter: reservations cancelled by their owner.
pub const BOOKINGS_CANCELLED_TOTAL: &str = "skybook_bookings_cancelled_total";

/// Counter: creates rejected because the window was already taken.
pub const BOOKING_CONFLICTS_TOTAL: &str = "skybook_booking_conflicts_total";

/// Counter: administrative status transitions.
pub const STATUS_OVERRIDES_TOTAL: &str = "skybook_status_overrides_total";

// ── Reminder sweep metrics ──────────────────────────────────────

/// Counter: reminders delivered. Labels: kind.
pub const REMINDERS_SENT_TOTAL: &str = "skybook_reminders_sent_total";

/// Counter: reminder attempts that failed or timed out. Labels: kind.
pub const REMINDER_FAILURES_TOTAL: &str = "skybook_reminder_failures_total";

/// Histogram: wall time of one sweep in seconds. Labels: kind.
pub const SWEEP_DURATION_SECONDS: &str = "skybook_sweep_duration_seconds";

/// Install the fmt tracing subscriber. Call once from the embedding
/// process; tests and libraries that already have one skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}

/// Install the Prometheus metrics exporter on the given port. No-op if
/// port is None.
pub fn init_metrics(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
