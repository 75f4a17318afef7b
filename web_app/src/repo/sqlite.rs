use crate::{
    consts,
    models::{
        analytics::{CounterDoc, CounterMapping},
        content::ContentDocument,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, Row, SqlitePool, sqlite::SqliteRow};
use tokio::sync::broadcast;

use super::{SiteRepo, sqlite_queries};

/// Pending change notifications kept per subscriber before it lags.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct SqlxSqliteRepo {
    pub db_pool: SqlitePool,
    changes: broadcast::Sender<CounterDoc>,
}

impl SqlxSqliteRepo {
    pub fn new(db_pool: SqlitePool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { db_pool, changes }
    }

    /// Creates the tables when missing; safe to run on every start.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::raw_sql(sqlite_queries::QUERY_CREATE_TABLES)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }
}

impl FromRow<'_, SqliteRow> for ContentDocument {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let body: String = row.try_get("body")?;
        let mut fields =
            serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&body)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        fields.remove("id");

        Ok(Self {
            id: row.try_get("doc_id")?,
            fields,
            updated_at: row.try_get("updated_at").ok(),
        })
    }
}

/// Sort position taken from the `order` field, numeric or numeric text.
fn sort_order_of(fields: &serde_json::Map<String, serde_json::Value>) -> i64 {
    match fields.get(consts::ORDER_FIELD) {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

#[async_trait]
impl SiteRepo for SqlxSqliteRepo {
    async fn merge_increment(
        &self,
        doc: CounterDoc,
        increments: &CounterMapping,
    ) -> anyhow::Result<()> {
        if increments.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let mut transaction = self
            .db_pool
            .begin_with(sqlite_queries::QUERY_BEGIN_WRITE)
            .await?;

        for (field, delta) in increments {
            sqlx::query(sqlite_queries::QUERY_INCREMENT_COUNTER_FIELD)
                .bind(doc.collection())
                .bind(doc.doc_id())
                .bind(field)
                .bind(delta)
                .bind(now)
                .execute(&mut *transaction)
                .await?;
        }

        transaction.commit().await?;

        // no subscribers is fine
        let _ = self.changes.send(doc);
        Ok(())
    }

    async fn read_document(&self, doc: CounterDoc) -> anyhow::Result<CounterMapping> {
        let rows = sqlx::query_as::<_, (String, i64)>(sqlite_queries::QUERY_GET_COUNTER_DOCUMENT)
            .bind(doc.collection())
            .bind(doc.doc_id())
            .fetch_all(&self.db_pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<CounterDoc> {
        self.changes.subscribe()
    }

    async fn list_content(&self, collection: &str) -> anyhow::Result<Vec<ContentDocument>> {
        Ok(
            sqlx::query_as::<_, ContentDocument>(sqlite_queries::QUERY_LIST_CONTENT_DOCUMENTS)
                .bind(collection)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn get_content(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> anyhow::Result<Option<ContentDocument>> {
        Ok(
            sqlx::query_as::<_, ContentDocument>(sqlite_queries::QUERY_GET_CONTENT_DOCUMENT)
                .bind(collection)
                .bind(doc_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn merge_content(
        &self,
        collection: &str,
        doc_id: &str,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> anyhow::Result<ContentDocument> {
        let mut transaction = self
            .db_pool
            .begin_with(sqlite_queries::QUERY_BEGIN_WRITE)
            .await?;

        let mut merged =
            sqlx::query_as::<_, ContentDocument>(sqlite_queries::QUERY_GET_CONTENT_DOCUMENT)
                .bind(collection)
                .bind(doc_id)
                .fetch_optional(&mut *transaction)
                .await?
                .map(|doc| doc.fields)
                .unwrap_or_default();

        for (key, value) in fields {
            if key != "id" {
                merged.insert(key.clone(), value.clone());
            }
        }

        let now = Utc::now();
        sqlx::query(sqlite_queries::QUERY_UPSERT_CONTENT_DOCUMENT)
            .bind(collection)
            .bind(doc_id)
            .bind(serde_json::to_string(&merged)?)
            .bind(sort_order_of(&merged))
            .bind(now)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        Ok(ContentDocument {
            id: doc_id.to_string(),
            fields: merged,
            updated_at: Some(now),
        })
    }

    async fn delete_content(&self, collection: &str, doc_id: &str) -> anyhow::Result<()> {
        Ok(
            sqlx::query(sqlite_queries::QUERY_DELETE_CONTENT_DOCUMENT)
                .bind(collection)
                .bind(doc_id)
                .execute(&self.db_pool)
                .await
                .map(|_| ())?,
        )
    }
}

/// In-memory repo with the schema applied, for tests.
#[cfg(test)]
pub(crate) async fn memory_repo() -> SqlxSqliteRepo {
    // a single connection, every pooled connection would get its own database
    let db_pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let repo = SqlxSqliteRepo::new(db_pool);
    repo.ensure_schema().await.unwrap();
    repo
}
