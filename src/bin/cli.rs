//! Social Crawler CLI
//!
//! Local execution entry point. Tables live under `{storage_dir}/sheets`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use crawler::{
    error::Result,
    models::{Config, Credentials, RAPIDAPI_KEY_ENV, VK_ACCESS_TOKEN_ENV},
    pipeline::{JobContext, JobReport, JobRunner},
    storage::LocalTableStore,
};

/// Social Crawler - engagement metrics collector
#[derive(Parser, Debug)]
#[command(
    name = "social-crawler",
    version,
    about = "Collects Instagram, VK, YouTube and TikTok metrics into tables"
)]
struct Cli {
    /// Path to storage directory containing config and tables
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch metrics for the content URLs listed in a sheet
    Urls {
        #[arg(long)]
        spreadsheet: String,

        #[arg(long)]
        sheet: String,

        /// Only rows ticked in the parsing column
        #[arg(long)]
        selected: bool,
    },

    /// Fetch the latest content of the accounts listed in a sheet
    Accounts {
        #[arg(long)]
        spreadsheet: String,

        #[arg(long)]
        sheet: String,

        /// Only rows ticked in the parsing column
        #[arg(long)]
        selected: bool,
    },

    /// Fetch one account and print its rows as JSON
    Account {
        /// Account URL
        url: String,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }

        let credentials = Credentials::from_env();
        if credentials.rapidapi_key.is_none() {
            log::warn!("{} is not set, RapidAPI providers will fail", RAPIDAPI_KEY_ENV);
        }
        if credentials.vk_access_token.is_none() {
            log::warn!("{} is not set, VK single clips will fail", VK_ACCESS_TOKEN_ENV);
        }

        log::info!("All validations passed!");
        return Ok(());
    }

    config.validate()?;
    let store = Arc::new(LocalTableStore::new(&cli.storage_dir));
    let ctx = JobContext::new(config, &Credentials::from_env(), store)?;
    let runner = JobRunner::new(ctx);

    match cli.command {
        Command::Urls {
            spreadsheet,
            sheet,
            selected,
        } => {
            if let JobReport::Urls(outcome) = runner.submit_urls(selected, &sheet, &spreadsheet).wait().await? {
                log::info!(
                    "Urls complete: rows={}, placeholders={}, skipped={}, written={}",
                    outcome.rows.len(),
                    outcome.placeholders,
                    outcome.skipped,
                    outcome.written
                );
            }
        }

        Command::Accounts {
            spreadsheet,
            sheet,
            selected,
        } => {
            if let JobReport::Accounts(outcome) = runner
                .submit_accounts(selected, &sheet, &spreadsheet)
                .wait()
                .await?
            {
                log::info!(
                    "Accounts complete: accounts={}, rows={}, skipped={}, truncated={}",
                    outcome.processed,
                    outcome.rows_written,
                    outcome.skipped,
                    outcome.truncated
                );
            }
        }

        Command::Account { url } => {
            let rows = runner.parse_account(&url).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
            log::info!("Collected {} rows for {}", rows.len(), url);
        }

        Command::Validate => {}
    }

    Ok(())
}
