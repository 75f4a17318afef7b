use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::consts;

/// Persisted counter document: field name -> counter.
///
/// A `BTreeMap` keeps reads deterministic, so two aggregations over the same
/// snapshot always walk keys in the same order.
pub type CounterMapping = BTreeMap<String, i64>;

/// Free form parameters attached to a tracked event.
pub type EventParams = serde_json::Map<String, serde_json::Value>;

/// Partition a process writes its counters to.
#[derive(Debug, Display, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Environment {
    #[display("local")]
    #[serde(rename = "local")]
    Local,
    #[display("prod")]
    #[serde(rename = "prod")]
    Prod,
}

impl Environment {
    pub fn from_is_local(is_local: bool) -> Self {
        if is_local {
            return Environment::Local;
        }
        Environment::Prod
    }
}

/// Partition selector used when reading counters back.
#[derive(Debug, Display, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Scope {
    #[display("local")]
    #[serde(rename = "local")]
    Local,
    #[default]
    #[display("prod")]
    #[serde(rename = "prod")]
    Prod,
    #[display("all")]
    #[serde(rename = "all")]
    All,
}

impl Scope {
    /// Key prefix of the scope: empty for `All`, `"<env>_"` otherwise.
    pub fn prefix(&self) -> String {
        match self {
            Scope::All => String::new(),
            env => format!("{env}_"),
        }
    }
}

impl From<Environment> for Scope {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Local => Scope::Local,
            Environment::Prod => Scope::Prod,
        }
    }
}

/// The two counter documents of the `site_analytics` collection.
#[derive(Debug, Display, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum CounterDoc {
    #[display("visits")]
    #[serde(rename = "visits")]
    Visits,
    #[display("events")]
    #[serde(rename = "events")]
    Events,
}

impl CounterDoc {
    pub fn collection(&self) -> &'static str {
        consts::ANALYTICS_COLLECTION
    }

    pub fn doc_id(&self) -> &'static str {
        match self {
            CounterDoc::Visits => consts::VISITS_DOC_ID,
            CounterDoc::Events => consts::EVENTS_DOC_ID,
        }
    }
}

/// Where the visitor was when the event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationContext {
    #[default]
    Portfolio,
    Admin,
}

impl NavigationContext {
    pub fn from_location_hash(hash: Option<&str>) -> Self {
        match hash {
            Some(h) if h.trim() == consts::ADMIN_LOCATION_HASH => NavigationContext::Admin,
            _ => NavigationContext::Portfolio,
        }
    }
}

/// Client side failure forwarded to the metrics sink.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ErrorReport {
    pub description: String,
    pub stack: Option<String>,
    #[serde(default)]
    pub fatal: bool,
}

/// Both counter documents as read at one point in time.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AnalyticsSnapshot {
    pub visits: CounterMapping,
    pub events: CounterMapping,
    pub taken_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_prefix() {
        assert_eq!(Scope::All.prefix(), "");
        assert_eq!(Scope::Local.prefix(), "local_");
        assert_eq!(Scope::Prod.prefix(), "prod_");
    }

    #[test]
    fn test_scope_from_environment() {
        assert_eq!(Scope::from(Environment::Local), Scope::Local);
        assert_eq!(Scope::from(Environment::Prod), Scope::Prod);
    }

    #[test]
    fn test_scope_deserialization() {
        let scope: Scope = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(scope, Scope::All);
        assert!(serde_json::from_str::<Scope>("\"staging\"").is_err());
    }

    #[test]
    fn test_navigation_context_from_hash() {
        assert_eq!(
            NavigationContext::from_location_hash(Some("#admin")),
            NavigationContext::Admin
        );
        assert_eq!(
            NavigationContext::from_location_hash(Some("#skills")),
            NavigationContext::Portfolio
        );
        assert_eq!(
            NavigationContext::from_location_hash(None),
            NavigationContext::Portfolio
        );
    }

    #[test]
    fn test_counter_doc_address() {
        assert_eq!(CounterDoc::Visits.collection(), "site_analytics");
        assert_eq!(CounterDoc::Visits.doc_id(), "visits");
        assert_eq!(CounterDoc::Events.doc_id(), "events");
    }
}
