//! Command-line interface components.

use crate::config::{CompressionAlgorithm, OrdersConfig, SinkFormat, TransformOptions};
use crate::generator::{Channel, OrderGenerator};
use crate::models::ProcessingStats;
use crate::processor::OrdersProcessor;
use crate::transform::LineTransformer;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "order-transform")]
#[command(about = "Transform raw sales order CSV lines into typed records for bulk loading")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (per-line skip reasons)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform a single line, or every line of stdin, to JSON records
    Transform(TransformArgs),
    /// Load raw order files into a Parquet or NDJSON output
    Convert(ConvertArgs),
    /// Generate synthetic raw order files per sales channel
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Raw CSV line; reads stdin line by line when omitted
    #[arg(value_name = "LINE")]
    pub line: Option<String>,

    /// Also validate order_date and status
    #[arg(long)]
    pub strict: bool,

    /// Print the reason for skipped lines to stderr
    #[arg(long)]
    pub explain: bool,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Raw order file, or directory of daily drops
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// Output file (defaults to orders.parquet / orders.ndjson beside the input)
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Output format (parquet, ndjson)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long)]
    pub compression: Option<String>,

    /// Glob pattern for raw files, relative to an input directory
    #[arg(long)]
    pub pattern: Option<String>,

    /// Also validate order_date and status
    #[arg(long)]
    pub strict: bool,

    /// Maximum files transformed concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Transform everything but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

impl ConvertArgs {
    /// Merge the config file (if any) with command-line overrides
    pub fn to_config(&self) -> Result<OrdersConfig> {
        let mut config = match &self.config {
            Some(path) => OrdersConfig::from_toml_file(path)?,
            None => OrdersConfig::default(),
        };

        if let Some(format) = &self.format {
            config = config.with_format(format.parse::<SinkFormat>()?);
        }
        if let Some(compression) = &self.compression {
            config = config.with_compression(compression.parse::<CompressionAlgorithm>()?);
        }
        if let Some(pattern) = &self.pattern {
            config = config.with_file_pattern(pattern.clone());
        }
        if let Some(jobs) = self.jobs {
            config = config.with_max_concurrent_files(jobs);
        }
        if self.strict {
            config = config.with_strict_validation();
        }
        if self.dry_run {
            config = config.with_dry_run();
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Root directory for the daily drop folders
    #[arg(short, long, default_value = "local_data/globalshop-raw")]
    pub output_path: PathBuf,

    /// Channels to generate
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = Channel::ALL
    )]
    pub channels: Vec<Channel>,

    /// First simulated day (YYYY-MM-DD)
    #[arg(long, default_value = "2025-04-01")]
    pub start_date: NaiveDate,

    /// Number of simulated days
    #[arg(long, default_value_t = 5)]
    pub days: u32,

    /// Baseline orders per day (defaults to each channel's own volume)
    #[arg(long)]
    pub orders_per_day: Option<usize>,

    /// RNG seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Set up structured logging on stderr
pub fn setup_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("order_transform={}", log_level)));

    if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Dispatch to the selected subcommand
pub async fn run(args: Args, cancellation: CancellationToken) -> Result<()> {
    match args.command {
        Commands::Transform(transform_args) => run_transform(transform_args),
        Commands::Convert(convert_args) => run_convert(convert_args, cancellation).await,
        Commands::Generate(generate_args) => run_generate(generate_args).await,
    }
}

fn run_transform(args: TransformArgs) -> Result<()> {
    let options = if args.strict {
        TransformOptions::strict()
    } else {
        TransformOptions::default()
    };
    let transformer = LineTransformer::with_options(options);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.line {
        Some(line) => emit_line(&transformer, line, args.explain, &mut out)?,
        None => {
            let stdin = io::stdin();
            let mut buf = Vec::new();
            let mut reader = stdin.lock();
            let mut line_number = 0usize;
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    break;
                }
                line_number += 1;
                if buf.ends_with(b"\n") {
                    buf.pop();
                }
                let line = std::str::from_utf8(&buf)
                    .with_context(|| format!("stdin line {} is not valid UTF-8", line_number))?;
                emit_line(&transformer, line, args.explain, &mut out)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn emit_line(
    transformer: &LineTransformer,
    line: &str,
    explain: bool,
    out: &mut impl Write,
) -> Result<()> {
    if explain {
        match transformer.transform_with_reason(line) {
            Ok(record) => writeln!(out, "{}", serde_json::to_string(&record)?)?,
            Err(reason) => eprintln!("skipped: {}", reason),
        }
    } else if let Some(json) = transformer.transform_to_json(line)? {
        writeln!(out, "{}", json)?;
    }
    Ok(())
}

async fn run_convert(args: ConvertArgs, cancellation: CancellationToken) -> Result<()> {
    let config = args.to_config()?;
    let mut processor = OrdersProcessor::new(args.input_path.clone(), args.output_path.clone(), config)?
        .with_cancellation(cancellation);

    let stats = processor
        .process()
        .await
        .with_context(|| format!("Failed to convert {}", args.input_path.display()))?;

    report_stats(&stats);
    Ok(())
}

async fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut total_orders = 0usize;
    let mut total_files = 0usize;

    for channel in &args.channels {
        let mut generator = OrderGenerator::new(*channel, args.seed)?;
        let orders_per_day = args
            .orders_per_day
            .unwrap_or_else(|| channel.default_orders_per_day());
        let output_path = args.output_path.clone();
        let start_date = args.start_date;
        let days = args.days;

        println!(
            "{} {} orders into {}",
            "Generating".bright_yellow(),
            channel.to_string().bright_cyan(),
            output_path.display()
        );

        let stats = tokio::task::spawn_blocking(move || {
            generator.write_days(&output_path, start_date, days, orders_per_day)
        })
        .await
        .context("Generator task failed")??;

        total_orders += stats.orders_written;
        total_files += stats.files_written;
    }

    println!(
        "{} {} orders in {} files",
        "Generated".bright_green().bold(),
        total_orders.to_string().bright_white().bold(),
        total_files.to_string().bright_white().bold()
    );
    Ok(())
}

/// Print a coloured summary of a conversion run
pub fn report_stats(stats: &ProcessingStats) {
    println!();
    println!("{}", "Ingestion summary".bright_green().bold());
    println!("  {} {}", "Files processed:".bright_cyan(), stats.files_processed);
    if stats.files_failed > 0 {
        println!("  {} {}", "Files failed:".bright_red(), stats.files_failed);
    }
    println!("  {} {}", "Lines read:".bright_cyan(), stats.lines_read);
    println!(
        "  {} {}",
        "Records emitted:".bright_cyan(),
        stats.records_emitted.to_string().bright_white().bold()
    );
    println!(
        "  {} {} (header {}, arity {}, numeric {}, date {}, status {})",
        "Lines skipped:".bright_cyan(),
        stats.skips.total(),
        stats.skips.header_rows,
        stats.skips.arity_mismatches,
        stats.skips.numeric_failures,
        stats.skips.invalid_dates,
        stats.skips.unknown_statuses
    );
    match &stats.output_path {
        Some(path) => println!("  {} {}", "Output:".bright_cyan(), path.display()),
        None => println!("  {} {}", "Output:".bright_cyan(), "none (dry run)".yellow()),
    }
    println!("  {} {} ms", "Elapsed:".bright_cyan(), stats.processing_time_ms);
}
