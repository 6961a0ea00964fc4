//! TrendRadar CLI
//!
//! Local execution entry point: store fetched batches and report on them.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use trendradar::{
    error::Result,
    models::{Config, KeywordRules, ReportMode},
    pipeline,
    storage::{LocalStorage, SnapshotStorage},
    utils::{format_rank_display, time},
};

/// TrendRadar - Trending List Aggregator
#[derive(Parser, Debug)]
#[command(
    name = "trendradar",
    version,
    about = "Keyword-grouped trend reports from ranked list snapshots"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a fetch result as today's next batch
    Ingest {
        /// JSON file shaped as source -> title -> {ranks, url, mobileUrl}
        fetch: PathBuf,

        /// Source ids that failed to fetch (comma separated)
        #[arg(long, value_delimiter = ',')]
        failed: Vec<String>,

        /// Batch label (HH-MM); defaults to the current time
        #[arg(long)]
        label: Option<String>,
    },

    /// Aggregate a day's batches into a trend report
    Analyze {
        /// Report mode (daily, incremental, current, llm_analysis)
        #[arg(long)]
        mode: Option<ReportMode>,

        /// Day to analyze (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Print the report as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and keyword rules
    Validate,

    /// Show today's batches
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn resolve_date(config: &Config, date: Option<&str>) -> Result<chrono::NaiveDate> {
    match date {
        Some(date) => time::parse_day(date),
        None => Ok(time::now_at(config.report.utc_offset_hours)?.date_naive()),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("TrendRadar starting...");

    let mut config = Config::load_for_run(&cli.config)?;
    let storage = LocalStorage::new(&config.paths.output_dir);

    match cli.command {
        Command::Ingest {
            fetch,
            failed,
            label,
        } => {
            let now = time::now_at(config.report.utc_offset_hours)?;
            let label = label.unwrap_or_else(|| time::batch_label(&now));
            let fetched = pipeline::load_fetch_result(&fetch).await?;
            pipeline::run_ingest(
                &config,
                &storage,
                now.date_naive(),
                &label,
                &fetched,
                &failed,
            )
            .await?;
        }

        Command::Analyze { mode, date, json } => {
            if let Some(mode) = mode {
                config.report.mode = mode;
            }
            let date = resolve_date(&config, date.as_deref())?;
            let rules = KeywordRules::load(config.frequency_words_path(Path::new(".")))?;

            let report = pipeline::run_analysis(&config, &rules, &storage, date, None).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if !report.has_content() {
                log::info!("Nothing to report for {}", date);
            } else {
                for stat in report.stats.iter().filter(|s| s.count > 0) {
                    log::info!("{} ({} titles, {:.2}%)", stat.word, stat.count, stat.percentage);
                    for item in &stat.titles {
                        let rank = format_rank_display(
                            &item.identity.ranks,
                            config.report.rank_threshold,
                        )
                        .map(|r| r.text)
                        .unwrap_or_default();
                        log::info!(
                            "    [{}] {} {} {}{}",
                            item.source_name,
                            item.identity.title,
                            rank,
                            item.time_display,
                            if item.is_new { " NEW" } else { "" }
                        );
                    }
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK ({} platforms)", config.platforms.len());

            let rules_path = config.frequency_words_path(Path::new("."));
            let rules = KeywordRules::load(&rules_path)?;
            if rules.is_empty() {
                log::warn!("No keyword groups in {}, every title will match", rules_path.display());
            } else {
                log::info!("✓ Keyword rules OK ({} groups)", rules.groups.len());
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            let today = resolve_date(&config, None)?;
            log::info!("Output directory: {}", storage.root_dir().display());
            let mode = config.report.mode;
            log::info!("Mode: {} ({})", mode, mode.label());
            log::info!(
                "Realtime reports: {}, day summary: {}",
                if mode.sends_realtime() { "yes" } else { "no" },
                if mode.generates_summary() {
                    mode.summary_mode().to_string()
                } else {
                    "none".to_string()
                }
            );

            let labels = storage.list_labels(today).await?;
            if labels.is_empty() {
                log::info!("No batches for {} yet.", today);
            } else {
                log::info!("Batches for {}: {}", today, labels.join(", "));
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
