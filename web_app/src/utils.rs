//! Helper functions used while wiring the server in `main`.

use crate::config;
use anyhow::Context;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use std::str::FromStr;

/// Connection options for the site database.
///
/// # Arguments
/// * `db_host` - sqlx SQLite url, e.g. `sqlite:data/site.db`
/// * `encryption_key` - SQLCipher key; `None` opens a plain WAL database
pub fn sqlite_connect_options(
    db_host: &str,
    encryption_key: Option<&str>,
) -> anyhow::Result<SqliteConnectOptions> {
    let options = SqliteConnectOptions::from_str(db_host)?.create_if_missing(true);

    let Some(key) = encryption_key else {
        return Ok(options.journal_mode(SqliteJournalMode::Wal));
    };

    Ok(options
        .pragma("key", key.to_string())
        .pragma("cipher_page_size", "1024")
        .pragma("kdf_iter", "64000")
        .pragma("cipher_hmac_algorithm", "HMAC_SHA1")
        .pragma("cipher_kdf_algorithm", "PBKDF2_HMAC_SHA1")
        .journal_mode(SqliteJournalMode::Delete))
}

/// Opens the site database; `encrypted` turns on SQLCipher with the configured key.
pub async fn setup_sqlite_db_pool(encrypted: bool) -> anyhow::Result<SqlitePool> {
    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;

    let key = encrypted.then_some(app_config.db_pass_encrypt.as_str());

    Ok(SqlitePool::connect_with(sqlite_connect_options(&app_config.db_host, key)?).await?)
}
