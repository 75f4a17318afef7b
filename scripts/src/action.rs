use clap::{Args, Parser, Subcommand};

use crate::{config, utils};

#[derive(Args, Debug, Clone)]
pub struct RunMigrationsArgs {
    #[arg(short, long)]
    file: String,
}

#[derive(Args, Debug, Clone)]
pub struct ShowCountersArgs {
    /// Counter document: `visits` or `events`
    #[arg(short, long, default_value = "visits")]
    doc: String,

    /// Only fields starting with this prefix, e.g. `prod_daily_`
    #[arg(short, long, default_value = "")]
    prefix: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    RunMigrations(RunMigrationsArgs),
    ShowCounters(ShowCountersArgs),
}

/// Maintenance tasks for the portfolio site database
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let db_pool = utils::setup_sqlite_db_pool(config::APP_CONFIG.is_prod()).await?;

        match &self.action {
            Action::RunMigrations(RunMigrationsArgs { file }) => {
                utils::run_migrations(&db_pool, file).await
            }
            Action::ShowCounters(ShowCountersArgs { doc, prefix }) => {
                for (field, value) in utils::read_counters(&db_pool, doc, prefix).await? {
                    println!("{field}\t{value}");
                }
                Ok(())
            }
        }
    }
}
