use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use calaccess_candidates::config::{Config, ConfigOverrides};
use calaccess_candidates::fetch::{CachedFetcher, HttpFetcher, PageCache, PageFetcher};
use calaccess_candidates::models::{ScrapedCandidate, ScrapedElection};
use calaccess_candidates::output::csv::{candidates_to_csv, elections_to_csv, summary_to_csv};
use calaccess_candidates::output::json::render_json;
use calaccess_candidates::output::table::{
    render_candidates_table, render_elections_table, render_summary_table,
};
use calaccess_candidates::pipeline::{
    build_results, process_results, FailedPage, ProcessSummary, RunOptions,
};
use calaccess_candidates::store::{CandidateFilter, RecordStore, SqliteStore};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "calaccess-candidates",
    about = "Scrape CAL-ACCESS candidate listings into elections, offices and candidates"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    db: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Repeat for more detail (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Scrape {
        /// Log and continue past election pages that fail to fetch or parse.
        #[arg(long)]
        skip_failed: bool,
        /// Print scraped results as JSON without touching the database.
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        no_cache: bool,
        /// Refetch every page and overwrite cached copies.
        #[arg(long)]
        force: bool,
        #[arg(long)]
        pace_ms: Option<u64>,
    },
    Elections,
    Candidates {
        #[arg(long)]
        office: Option<String>,
        #[arg(long)]
        election_id: Option<i64>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Serialize)]
struct ScrapeReport<'a> {
    summary: ProcessSummary,
    failed: &'a [FailedPage],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let (pace_ms, disable_cache) = match &cli.command {
        Commands::Scrape {
            pace_ms, no_cache, ..
        } => (*pace_ms, *no_cache),
        _ => (None, false),
    };
    config.apply_overrides(ConfigOverrides {
        db_path: cli.db.clone(),
        pace_ms,
        disable_cache,
    });

    match &cli.command {
        Commands::Config { init, show } => {
            if *init {
                Config::write_template(&config_path)?;
                println!("Wrote config template to {}", config_path.display());
            }
            if *show || !*init {
                println!("{}", render_json(&config)?);
            }
        }
        Commands::Scrape {
            skip_failed,
            dry_run,
            force,
            ..
        } => run_scrape(&config, cli.output, *skip_failed, *dry_run, *force).await?,
        Commands::Elections => {
            let store = SqliteStore::open(&config.resolved_db_path())?;
            print_elections(&store.list_elections()?, cli.output)?;
        }
        Commands::Candidates {
            office,
            election_id,
        } => {
            let store = SqliteStore::open(&config.resolved_db_path())?;
            let candidates = store.list_candidates(&CandidateFilter {
                office_name: office.clone(),
                election_id: *election_id,
            })?;
            print_candidates(&candidates, cli.output)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,calaccess_candidates={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_fetcher(config: &Config, force: bool) -> Result<Box<dyn PageFetcher>> {
    let http = HttpFetcher::new(&config.http)?;
    if !config.cache.enabled {
        return Ok(Box::new(http));
    }
    let cache = PageCache::new(config.resolved_cache_dir());
    info!("caching pages in {}", cache.dir().display());
    Ok(Box::new(CachedFetcher::new(http, cache, force)))
}

async fn run_scrape(
    config: &Config,
    format: OutputFormat,
    skip_failed: bool,
    dry_run: bool,
    force: bool,
) -> Result<()> {
    let fetcher = build_fetcher(config, force)?;
    let options = RunOptions {
        pace: Duration::from_millis(config.source.pace_ms),
        skip_failed,
    };
    let run = build_results(
        fetcher.as_ref(),
        &config.listing_url()?,
        &config.base_url()?,
        &options,
    )
    .await?;
    if !run.failed.is_empty() {
        warn!("{} election pages were skipped", run.failed.len());
    }

    if dry_run {
        println!("{}", render_json(&run)?);
        return Ok(());
    }

    let store = SqliteStore::open(&config.resolved_db_path())?;
    let summary = process_results(&store, &run.results)?;
    match format {
        OutputFormat::Table => {
            println!("{}", render_summary_table(&summary, &run.failed));
            println!("Processed {} elections", summary.elections);
        }
        OutputFormat::Json => println!(
            "{}",
            render_json(&ScrapeReport {
                summary,
                failed: &run.failed,
            })?
        ),
        OutputFormat::Csv => print!("{}", summary_to_csv(&summary, &run.failed)?),
    }
    info!("processed {} elections", summary.elections);
    Ok(())
}

fn print_elections(elections: &[ScrapedElection], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_elections_table(elections)),
        OutputFormat::Json => println!("{}", render_json(elections)?),
        OutputFormat::Csv => println!("{}", elections_to_csv(elections)?),
    }
    Ok(())
}

fn print_candidates(candidates: &[ScrapedCandidate], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_candidates_table(candidates)),
        OutputFormat::Json => println!("{}", render_json(candidates)?),
        OutputFormat::Csv => println!("{}", candidates_to_csv(candidates)?),
    }
    Ok(())
}
