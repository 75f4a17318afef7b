use crate::{metric, models::analytics::EventParams};

/// Forwards tracked events to Logfire as log records plus a counter.
#[derive(Clone, Default)]
pub struct LogfireSink;

impl crate::services::MetricsSink for LogfireSink {
    fn log_event(&self, name: &str, params: &EventParams) {
        let environment = params
            .get("environment")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");

        metric::incr_site_event_statds(name, environment);

        logfire::info!(
            "site event {name}: {params}",
            name = name.to_string(),
            params = serde_json::Value::Object(params.clone()).to_string()
        );
    }
}
