mod chart;
mod report;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use stitchline_core::input::{parse_trunk_filter, resolve_metrics};
use stitchline_core::model::staff::{SalaryRates, StaffRecords};
use stitchline_core::model::trunk::Trunk;
use stitchline_core::repository::read_json_array;
use stitchline_core::service::trunk_service::{filter_trunks, trunk_records, trunk_totals};
use stitchline_core::time::parse_month_period;
use tracing::debug;
use stitchline_core::{
    AppConfig, BucketOrder, Dataset, FileConfigRepository, FileRecordRepository, Granularity,
    Report, ReportQuery, ReportUseCase, SalaryService, TimeSeriesAggregator,
};

#[derive(Parser)]
#[command(name = "stitchline")]
#[command(about = "Attendance, stitching and salary reports for the production floor", long_about = None)]
struct Cli {
    /// Data directory holding config.json (default: $STITCHLINE_HOME or ~/.stitchline)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ReportArgs {
    /// JSON file with the records, as saved from the backend
    file: PathBuf,
    /// attendance, stitching, salary, trunks or records
    #[arg(short, long, default_value = "records")]
    dataset: Dataset,
    #[arg(short, long)]
    year: Option<i32>,
    /// Month 1-12; needs --year
    #[arg(short, long)]
    month: Option<u32>,
    /// daily, weekly or monthly (default from config)
    #[arg(short, long)]
    granularity: Option<Granularity>,
    /// Metric to aggregate; repeatable, prefixes and aliases accepted
    #[arg(long = "metric")]
    metrics: Vec<String>,
    /// Metric that gets a consistency ratio
    #[arg(long)]
    primary: Option<String>,
    /// Sort buckets by label text like the old dashboards
    #[arg(long)]
    lexicographic: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Bucket records by day/week/month and print totals
    Report {
        #[command(flatten)]
        args: ReportArgs,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Interactive bar chart of the buckets
    Chart {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Monthly salaries (usage: salary staff.json --month 2024-03)
    Salary {
        /// JSON array of staff with their daily records
        file: PathBuf,
        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,
        #[arg(long)]
        rate_per_piece: Option<f64>,
        #[arg(long)]
        rate_per_shift: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// List trunks (usage: trunks trunks.json dispatched:yes status:partial)
    Trunks {
        file: PathBuf,
        /// Filters as key:value (dispatched:yes|no|all, status:completed|partial|pending|all)
        #[arg(trailing_var_arg = true)]
        filters: Vec<String>,
        /// Bucket payments by received date instead of listing trunks
        #[arg(long)]
        by: Option<Granularity>,
        #[arg(long)]
        json: bool,
    },
    /// Show the active configuration, or write the defaults with --init
    Config {
        #[arg(long)]
        init: bool,
    },
}

fn init_logging() {
    let log_env = std::env::var("STITCHLINE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config_repo = FileConfigRepository::new(cli.home.clone())?;
    let config = config_repo.load()?;

    match cli.command {
        Commands::Report { args, json } => {
            let (repo, query, aggregator) = prepare_report(&args, &config)?;
            let report = ReportUseCase::new(&repo, aggregator).run(&query)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report::show_report(args.dataset, &report);
            }
        }
        Commands::Chart { args } => {
            let (repo, query, aggregator) = prepare_report(&args, &config)?;
            chart::run(&repo, query, aggregator)?;
        }
        Commands::Salary { file, month, rate_per_piece, rate_per_shift, json } => {
            let (year, month_num) = match month {
                Some(m) => parse_month_period(&m)?,
                None => {
                    let today = Local::now().date_naive();
                    (today.year(), today.month())
                }
            };
            let rates = SalaryRates {
                rate_per_piece: rate_per_piece.unwrap_or(config.rates.rate_per_piece),
                rate_per_shift: rate_per_shift.unwrap_or(config.rates.rate_per_shift),
            };
            let staff: Vec<StaffRecords> = read_json_array(&file)?;
            let service = SalaryService::new(TimeSeriesAggregator::new(config.bucket_order));
            let summary = service.compute(&staff, year, month_num, rates)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                report::show_salary(&summary);
            }
        }
        Commands::Trunks { file, filters, by, json } => {
            let filter = parse_trunk_filter(&filters)?;
            let trunks: Vec<Trunk> = read_json_array(&file)?;
            let selected = filter_trunks(&trunks, &filter);

            if let Some(granularity) = by {
                let records = trunk_records(&selected)?;
                let query = ReportQuery::new(granularity, Dataset::Trunks.default_metrics());
                let aggregator = TimeSeriesAggregator::new(config.bucket_order);
                let buckets = aggregator.aggregate(&records, granularity, &query.metrics)?;
                let summary = aggregator.summarize(&buckets, &query.metrics, None)?;
                let report = Report { query, buckets, summary };
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    report::show_report(Dataset::Trunks, &report);
                }
                return Ok(());
            }

            let totals = trunk_totals(&selected);
            if json {
                println!("{}", serde_json::to_string_pretty(&selected)?);
            } else {
                report::show_trunks(&selected, &totals);
            }
        }
        Commands::Config { init } => {
            if init {
                config_repo.save(&config)?;
                println!("Config written to {}", config_repo.config_path().display());
            } else {
                println!("# {}", config_repo.config_path().display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }
    Ok(())
}

/// Turns command-line selections plus config defaults into a report query.
fn prepare_report(
    args: &ReportArgs,
    config: &AppConfig,
) -> Result<(FileRecordRepository, ReportQuery, TimeSeriesAggregator)> {
    if !args.file.exists() {
        return Err(anyhow!("No such file: {}", args.file.display()));
    }
    let repo = FileRecordRepository::new(&args.file, args.dataset);
    let known = args.dataset.default_metrics();

    let metrics = if args.metrics.is_empty() {
        known.clone()
    } else {
        resolve_metrics(&args.metrics, &known, config).context("Invalid --metric")?
    };
    if metrics.is_empty() {
        return Err(anyhow!("At least one --metric is required for the {} dataset", args.dataset));
    }

    let primary = match &args.primary {
        Some(p) => Some(resolve_metrics(&[p.clone()], &metrics, config).context("Invalid --primary")?.remove(0)),
        None => args
            .dataset
            .default_primary()
            .filter(|p| metrics.iter().any(|m| m.as_str() == *p))
            .map(str::to_string),
    };

    let granularity = args.granularity.unwrap_or(config.granularity);
    let mut query = ReportQuery::new(granularity, metrics);
    query.year = args.year;
    query.month = args.month;
    query.primary = primary;

    debug!(dataset = %args.dataset, ?granularity, metrics = ?query.metrics, "report query");

    let order = if args.lexicographic {
        BucketOrder::Lexicographic
    } else {
        config.bucket_order
    };

    Ok((repo, query, TimeSeriesAggregator::new(order)))
}
