//! Maintenance CLI for the portfolio site database.
//!
//! Runs from the `scripts/` directory so migration files resolve under
//! `../migrations`.

pub mod action;
pub mod config;
pub mod utils;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    action::AppArgs::parse().run().await
}
