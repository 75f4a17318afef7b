pub mod metrics_sink;

use crate::models::analytics::EventParams;
use std::sync::Arc;

/// Third party collector for tracked events.
///
/// Calls are fire-and-forget: implementations swallow their own failures.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsSink: Send + Sync {
    fn log_event(&self, name: &str, params: &EventParams);
}

pub type ImplMetricsSink = Arc<dyn MetricsSink>;
