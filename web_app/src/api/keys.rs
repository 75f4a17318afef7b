//! Counter key naming.
//!
//! The recorder and the dashboard never talk to each other; the key names
//! below are the only thing they share. Every key is `<prefix><body>` where
//! the prefix comes from [`Scope::prefix`] and the body from [`CounterKind`].

use chrono::NaiveDate;

use crate::{
    consts,
    models::analytics::{EventParams, Scope},
};

pub const TOTAL_HITS: &str = "totalHits";
pub const DAILY_PREFIX: &str = "daily_";
pub const EVENT_COUNT_PREFIX: &str = "count_";
pub const TOTAL_INTERACTIONS: &str = "total_interactions";
pub const DEFAULT_DETAIL: &str = "total";

/// Parameters checked, in order, for the detail of an event.
pub const DETAIL_PARAMS: [&str; 3] = ["button", "section_id", "method"];

#[derive(Debug, Clone, PartialEq)]
pub enum CounterKind<'a> {
    TotalHits,
    Daily(NaiveDate),
    EventDetail { event: &'a str, detail: &'a str },
    EventCount(&'a str),
    TotalInteractions,
}

pub fn build_key(scope: Scope, kind: &CounterKind) -> String {
    let prefix = scope.prefix();
    match kind {
        CounterKind::TotalHits => format!("{prefix}{TOTAL_HITS}"),
        CounterKind::Daily(date) => format!("{prefix}{DAILY_PREFIX}{}", format_date(*date)),
        CounterKind::EventDetail { event, detail } => format!("{prefix}{event}_{detail}"),
        CounterKind::EventCount(event) => format!("{prefix}{EVENT_COUNT_PREFIX}{event}"),
        CounterKind::TotalInteractions => format!("{prefix}{TOTAL_INTERACTIONS}"),
    }
}

/// ISO-8601 calendar date; lexicographic order equals chronological order.
pub fn format_date(date: NaiveDate) -> String {
    date.format(consts::COUNTER_DATE_FORMAT).to_string()
}

/// Prefix shared by all daily visit keys of a scope.
pub fn daily_prefix(scope: Scope) -> String {
    format!("{}{DAILY_PREFIX}", scope.prefix())
}

/// Picks the secondary dimension of an event.
///
/// The first of [`DETAIL_PARAMS`] holding a non-null, non-empty value wins;
/// when none does the detail is [`DEFAULT_DETAIL`].
pub fn resolve_detail(params: &EventParams) -> String {
    DETAIL_PARAMS
        .iter()
        .find_map(|name| params.get(*name).and_then(param_as_text))
        .unwrap_or_else(|| DEFAULT_DETAIL.to_string())
}

fn param_as_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Keys one tracked event increments: detail, event count and grand total.
pub fn event_keys(scope: Scope, event: &str, detail: &str) -> [String; 3] {
    [
        build_key(scope, &CounterKind::EventDetail { event, detail }),
        build_key(scope, &CounterKind::EventCount(event)),
        build_key(scope, &CounterKind::TotalInteractions),
    ]
}

/// Keys one visit increments.
pub fn visit_keys(scope: Scope, date: NaiveDate) -> [String; 2] {
    [
        build_key(scope, &CounterKind::TotalHits),
        build_key(scope, &CounterKind::Daily(date)),
    ]
}
