use opentelemetry::{KeyValue, metrics::Counter};
use std::sync::LazyLock;

static SITE_EVENTS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    logfire::u64_counter("folio_site_events")
        .with_description("Portfolio site tracked events")
        .with_unit("event")
        .build()
});

static ANALYTICS_WRITE_FAILURES: LazyLock<Counter<u64>> = LazyLock::new(|| {
    logfire::u64_counter("folio_site_analytics_write_failures")
        .with_description("Counter increments dropped because the store failed")
        .with_unit("attempt")
        .build()
});

pub fn incr_site_event_statds(event_name: &str, environment: &str) {
    SITE_EVENTS.add(
        1,
        &[
            KeyValue::new("event_name", event_name.to_string()),
            KeyValue::new("environment", environment.to_string()),
        ],
    );
}

pub fn incr_analytics_write_failure_statds(document: &str) {
    ANALYTICS_WRITE_FAILURES.add(1, &[KeyValue::new("document", document.to_string())]);
}
