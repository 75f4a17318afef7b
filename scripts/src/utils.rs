use crate::config;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use std::str::FromStr;

pub async fn run_migrations(db_pool: &sqlx::SqlitePool, file_name: &str) -> anyhow::Result<()> {
    let mut tera = tera::Tera::new("../migrations/**/*.sql")?;
    tera.autoescape_on(vec![".sql"]);

    let create_tables_query = tera.render(file_name, &tera::Context::new())?;

    sqlx::raw_sql(&create_tables_query).execute(db_pool).await?;
    Ok(())
}

/// Counter fields of a `site_analytics` document, sorted by field name.
pub async fn read_counters(
    db_pool: &sqlx::SqlitePool,
    doc_id: &str,
    prefix: &str,
) -> anyhow::Result<Vec<(String, i64)>> {
    Ok(sqlx::query_as(
        r#"
SELECT field,value
FROM counter_field
WHERE collection='site_analytics' AND doc_id=$1 AND field LIKE $2 || '%'
ORDER BY field ASC;
"#,
    )
    .bind(doc_id)
    .bind(prefix)
    .fetch_all(db_pool)
    .await?)
}

pub async fn setup_sqlite_db_pool(encrypted: bool) -> anyhow::Result<SqlitePool> {
    if encrypted {
        return Ok(SqlitePool::connect_with(
            SqliteConnectOptions::from_str(&config::APP_CONFIG.db_host)?
                .pragma("key", &config::APP_CONFIG.db_pass_encrypt)
                .pragma("cipher_page_size", "1024")
                .pragma("kdf_iter", "64000")
                .pragma("cipher_hmac_algorithm", "HMAC_SHA1")
                .pragma("cipher_kdf_algorithm", "PBKDF2_HMAC_SHA1")
                .journal_mode(SqliteJournalMode::Delete),
        )
        .await?);
    }

    Ok(SqlitePool::connect_with(
        SqliteConnectOptions::from_str(&config::APP_CONFIG.db_host)?.create_if_missing(true),
    )
    .await?)
}
