pub mod sqlite;
pub mod sqlite_queries;

use crate::models::{
    analytics::{CounterDoc, CounterMapping},
    content::ContentDocument,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiteRepo: Send + Sync {
    /// Adds every delta to its field of `doc` in one atomic step.
    ///
    /// Missing documents and fields start at zero. Concurrent callers never
    /// lose increments.
    async fn merge_increment(
        &self,
        doc: CounterDoc,
        increments: &CounterMapping,
    ) -> anyhow::Result<()>;

    /// Reads a counter document; an absent document is an empty mapping.
    async fn read_document(&self, doc: CounterDoc) -> anyhow::Result<CounterMapping>;

    /// Notifies every counter document written after the call.
    fn subscribe(&self) -> broadcast::Receiver<CounterDoc>;

    async fn list_content(&self, collection: &str) -> anyhow::Result<Vec<ContentDocument>>;

    async fn get_content(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> anyhow::Result<Option<ContentDocument>>;

    /// Merges top level `fields` into the document, creating it if absent.
    async fn merge_content(
        &self,
        collection: &str,
        doc_id: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> anyhow::Result<ContentDocument>;

    async fn delete_content(&self, collection: &str, doc_id: &str) -> anyhow::Result<()>;
}

pub type ImplSiteRepo = Arc<dyn SiteRepo>;
