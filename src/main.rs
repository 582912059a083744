//! Linksync main entry point
//!
//! This is the command-line interface for the link export and health check
//! pipelines.

use anyhow::Context;
use clap::{Parser, Subcommand};
use linksync::config::{
    load_config_with_hash, Config, ExportOverrides, HealthCheckOverrides, LinkTextPolicy,
};
use linksync::export::{sync_links, ExportOptions};
use linksync::healthcheck::{HealthCheckOptions, HealthChecker};
use linksync::probe::ReqwestProbe;
use linksync::source::open_source;
use linksync::store::{RetryPolicy, SheetsStore};
use linksync::RateLimiter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Linksync: rate-limited link export and health checking
///
/// Linksync copies external links from a SQLite source into a spreadsheet,
/// then probes each link over HTTP and records its status, while keeping
/// spreadsheet API callouts under a per-minute limit.
#[derive(Parser, Debug)]
#[command(name = "linksync")]
#[command(version)]
#[command(about = "Rate-limited link export and health checking", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export all links to the spreadsheet and import the new ones
    SyncLinks {
        /// Source rows read per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Maximum source rows processed (0 = unlimited)
        #[arg(long)]
        max_links: Option<u64>,

        /// Maximum spreadsheet callouts per minute
        #[arg(long)]
        rate_limit: Option<u32>,

        /// Keep the exported rows and continue after this link id
        #[arg(long, value_name = "ID")]
        resume_after: Option<i64>,

        /// When to look up link text: never, always, first-occurrence
        #[arg(long, value_name = "POLICY")]
        link_text: Option<LinkTextPolicy>,
    },

    /// Probe the links due for a check and record their status
    HealthcheckLinks {
        /// Maximum run time in seconds
        #[arg(long)]
        runtime: Option<u64>,

        /// Maximum links probed (0 = unlimited)
        #[arg(long)]
        max_links: Option<u64>,

        /// Status updates written per batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Queue rows read per page
        #[arg(long)]
        query_size: Option<u64>,

        /// Maximum spreadsheet callouts per minute
        #[arg(long)]
        rate_limit: Option<u32>,

        /// Probe timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Proxy URL for all probes
        #[arg(long)]
        proxy: Option<String>,

        /// User agent sent with probes
        #[arg(long)]
        user_agent: Option<String>,

        /// Protocol never probed (repeatable; replaces the configured list)
        #[arg(long = "exclude-protocol", value_name = "PROTOCOL")]
        exclude_protocols: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let result = match cli.command {
        Command::SyncLinks {
            chunk_size,
            max_links,
            rate_limit,
            resume_after,
            link_text,
        } => {
            let overrides = ExportOverrides {
                chunk_size,
                max_links,
                rate_limit,
                link_text,
            };
            match overrides.apply(&mut config) {
                Ok(()) => handle_sync_links(&config, resume_after).await,
                Err(e) => Err(e.into()),
            }
        }
        Command::HealthcheckLinks {
            runtime,
            max_links,
            batch_size,
            query_size,
            rate_limit,
            timeout,
            proxy,
            user_agent,
            exclude_protocols,
        } => {
            let overrides = HealthCheckOverrides {
                runtime,
                max_links,
                batch_size,
                query_size,
                rate_limit,
                timeout,
                proxy,
                user_agent,
                excluded_protocols: exclude_protocols,
            };
            match overrides.apply(&mut config) {
                Ok(()) => handle_healthcheck_links(&config).await,
                Err(e) => Err(e.into()),
            }
        }
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linksync=info,warn"),
            1 => EnvFilter::new("linksync=debug,info"),
            2 => EnvFilter::new("linksync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the spreadsheet store from the `[store]` section
fn build_store(config: &Config) -> anyhow::Result<SheetsStore> {
    let access_token = config.store.access_token()?;
    let client = reqwest::Client::builder()
        .gzip(true)
        .brotli(true)
        .build()
        .context("Failed to build spreadsheet API client")?;

    let retry = RetryPolicy {
        max_retries: config.store.max_retries,
        initial_delay: Duration::from_millis(config.store.retry_delay_ms),
    };

    Ok(SheetsStore::new(
        client,
        &config.store.api_base,
        &config.store.spreadsheet_id,
        &access_token,
        retry,
    ))
}

/// Handles `sync-links`: exports all links, then imports the new ones
async fn handle_sync_links(config: &Config, resume_after: Option<i64>) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let source = open_source(Path::new(&config.source.database_path))
        .with_context(|| format!("Failed to open source {}", config.source.database_path))?;
    let mut limiter = RateLimiter::new(config.store.rate_limit);

    let options = ExportOptions {
        resume_after,
        ..ExportOptions::from_config(&config.export)
    };

    tracing::info!(
        "Syncing links (chunk size {}, link text {}, rate limit {}/min)",
        options.chunk_size,
        options.link_text,
        config.store.rate_limit
    );

    let report = sync_links(
        &source,
        &store,
        &config.sheets,
        &config.http.excluded_protocols,
        &mut limiter,
        &options,
    )
    .await?;

    tracing::info!(
        "Done. {} links exported, {} new links imported, {:.1} sec. paused for rate limit",
        report.export.appended,
        report.import.count(),
        limiter.total_paused().as_secs_f64()
    );

    Ok(())
}

/// Handles `healthcheck-links`: probes due links and records the results
async fn handle_healthcheck_links(config: &Config) -> anyhow::Result<()> {
    let store = build_store(config)?;
    let probe = ReqwestProbe::from_config(&config.http).context("Failed to build probe client")?;
    let mut limiter = RateLimiter::new(config.store.rate_limit);

    let today = chrono::Local::now().date_naive();
    let options = HealthCheckOptions::from_config(&config.healthcheck, today);

    tracing::info!(
        "Checking links for up to {} sec. (batch size {}, query size {})",
        config.healthcheck.runtime,
        options.batch_size,
        options.query_size
    );

    let mut checker = HealthChecker::new(
        &store,
        &probe,
        &config.sheets,
        &config.http.excluded_protocols,
    );
    let report = checker.run(&mut limiter, &options).await?;

    tracing::info!(
        "Done. {} links checked, {} status rows written ({:?})",
        report.probed,
        report.rows_written,
        report.stop
    );

    Ok(())
}
