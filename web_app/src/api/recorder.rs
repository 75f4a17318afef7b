//! # Event Recorder
//!
//! Write side of the site analytics. Every visit or tracked event becomes a
//! fixed set of counter increments applied through one
//! [`SiteRepo::merge_increment`](crate::repo::SiteRepo::merge_increment)
//! call, so the global key and its environment mirror always move together.
//!
//! Analytics is fail-open: nothing here returns an error to the caller. A
//! failed write is logged and the visit or event is lost.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use crate::{
    api::keys,
    consts, metric,
    models::analytics::{
        CounterDoc, CounterMapping, Environment, ErrorReport, EventParams, NavigationContext,
        Scope,
    },
    repo, services,
};

#[derive(Clone)]
pub struct EventRecorder {
    repo: repo::ImplSiteRepo,
    sink: Option<services::ImplMetricsSink>,
    environment: Environment,
}

/// An event name with its parameters, ready to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub name: String,
    pub params: EventParams,
}

impl TrackedEvent {
    pub fn new(name: &str, params: EventParams) -> Self {
        Self {
            name: name.to_string(),
            params,
        }
    }

    fn with_param(name: &str, key: &str, value: &str) -> Self {
        let mut params = EventParams::new();
        params.insert(key.to_string(), Value::String(value.to_string()));
        Self::new(name, params)
    }

    pub fn page_view(page_name: &str) -> Self {
        Self::with_param("page_view", "page_name", page_name)
    }

    pub fn project_click(project_id: &str) -> Self {
        Self::with_param("project_click", "project_id", project_id)
    }

    pub fn resume_download() -> Self {
        Self::new("resume_download", EventParams::new())
    }

    pub fn contact_click(method: &str) -> Self {
        Self::with_param("contact_click", "method", method)
    }
}

/// Increments for the global scope and the mirror of `environment`.
fn scoped_increments<const N: usize>(
    environment: Environment,
    keys_for: impl Fn(Scope) -> [String; N],
) -> CounterMapping {
    keys_for(Scope::All)
        .into_iter()
        .chain(keys_for(Scope::from(environment)))
        .map(|key| (key, 1))
        .collect()
}

impl EventRecorder {
    /// `environment` is decided once at startup and fixed for the recorder's lifetime.
    pub fn new(
        repo: repo::ImplSiteRepo,
        sink: Option<services::ImplMetricsSink>,
        environment: Environment,
    ) -> Self {
        Self {
            repo,
            sink,
            environment,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Counts one visit for today (UTC). Repeated calls are repeated visits.
    pub async fn record_visit(&self) {
        self.record_visit_on(Utc::now().date_naive()).await
    }

    pub async fn record_visit_on(&self, date: NaiveDate) {
        let increments =
            scoped_increments(self.environment, |scope| keys::visit_keys(scope, date));

        self.apply(CounterDoc::Visits, &increments).await;
    }

    /// Counts a tracked event and forwards it to the metrics sink.
    ///
    /// Events raised from the Admin console are dropped entirely.
    pub async fn record_event(&self, context: NavigationContext, event: &TrackedEvent) {
        self.record_event_at(context, event, Utc::now()).await
    }

    /// [`record_event`](Self::record_event) with an explicit clock.
    ///
    /// # Arguments
    /// * `context` - Where the visitor was; `Admin` drops the event
    /// * `event` - Event name and its params
    /// * `now` - Timestamp forwarded to the metrics sink
    ///
    /// # Process
    /// 1. Forward name and enriched params to the metrics sink, if any
    /// 2. Increment detail, event count and total, globally and for the environment
    pub async fn record_event_at(
        &self,
        context: NavigationContext,
        event: &TrackedEvent,
        now: DateTime<Utc>,
    ) {
        if context == NavigationContext::Admin {
            return;
        }

        if event.name.trim().is_empty() {
            log::warn!("analytics event without a name ignored");
            return;
        }

        self.forward_to_sink(&event.name, &event.params, now);

        let detail = keys::resolve_detail(&event.params);
        let increments = scoped_increments(self.environment, |scope| {
            keys::event_keys(scope, &event.name, &detail)
        });

        self.apply(CounterDoc::Events, &increments).await;
    }

    /// Reports a client side failure to the metrics sink. No counters change.
    pub fn record_error(&self, report: &ErrorReport) {
        let stack = report.stack.as_deref().unwrap_or("N/A");
        log::error!(
            "[Analytics] client error tracked (fatal={}): {}",
            report.fatal,
            report.description
        );

        if let Some(sink) = &self.sink {
            let mut params = EventParams::new();
            params.insert(
                "description".into(),
                Value::String(report.description.clone()),
            );
            params.insert("fatal".into(), Value::Bool(report.fatal));
            params.insert("stack".into(), Value::String(stack.to_string()));

            sink.log_event(consts::EXCEPTION_EVENT_NAME, &params);
        }
    }

    /// Runs [`record_visit`](Self::record_visit) on the runtime without waiting for it.
    pub fn spawn_visit(&self) {
        let recorder = self.clone();
        ntex::rt::spawn(async move { recorder.record_visit().await });
    }

    /// Runs [`record_event`](Self::record_event) on the runtime without waiting for it.
    ///
    /// Two spawned events carry no ordering guarantee between them.
    pub fn spawn_event(&self, context: NavigationContext, event: TrackedEvent) {
        let recorder = self.clone();
        ntex::rt::spawn(async move { recorder.record_event(context, &event).await });
    }

    fn forward_to_sink(&self, name: &str, params: &EventParams, now: DateTime<Utc>) {
        let Some(sink) = &self.sink else {
            return;
        };

        let mut enriched = params.clone();
        enriched.insert("platform".into(), Value::String(consts::PLATFORM_TAG.into()));
        enriched.insert(
            "environment".into(),
            Value::String(self.environment.to_string()),
        );
        enriched.insert(
            "timestamp".into(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        sink.log_event(name, &enriched);
    }

    async fn apply(&self, doc: CounterDoc, increments: &CounterMapping) {
        if let Err(e) = self.repo.merge_increment(doc, increments).await {
            log::warn!("analytics recording failed for {doc}: {e}");
            metric::incr_analytics_write_failure_statds(doc.doc_id());
        }
    }
}
