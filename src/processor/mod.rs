//! Ingestion driver for raw order files.
//!
//! Orchestrates the line-by-line load: discover raw files, stream each one
//! through the line transform on a blocking task, then hand all records to
//! the configured sink.

pub mod discovery;
pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{discovery::FileDiscovery, streaming::StreamingProcessor, writer::OrdersWriter};

use crate::config::{OrdersConfig, SinkFormat};
use crate::constants::{DEFAULT_NDJSON_OUTPUT, DEFAULT_PARQUET_OUTPUT};
use crate::error::{OrdersError, Result};
use crate::models::{FileOutcome, OrderRecord, ProcessingStats};
use crate::transform::LineTransformer;

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Main processor for order file ingestion
#[derive(Debug)]
pub struct OrdersProcessor {
    input_path: PathBuf,
    output_path: PathBuf,
    config: OrdersConfig,
    file_discovery: FileDiscovery,
    streaming_processor: StreamingProcessor,
    writer: OrdersWriter,
    cancellation: CancellationToken,
}

impl OrdersProcessor {
    /// Create a new processor.
    ///
    /// Without an explicit output path, output goes next to the input:
    /// `<input dir>/orders.parquet` (or `orders.ndjson`).
    pub fn new(
        input_path: PathBuf,
        output_path: Option<PathBuf>,
        config: OrdersConfig,
    ) -> Result<Self> {
        if !input_path.exists() {
            return Err(OrdersError::InputNotFound { path: input_path });
        }
        config.validate()?;

        let output_path =
            output_path.unwrap_or_else(|| default_output_path(&input_path, config.sink.format));

        let transformer = LineTransformer::with_options(config.transform.clone());

        Ok(Self {
            input_path: input_path.clone(),
            output_path: output_path.clone(),
            file_discovery: FileDiscovery::new(input_path, config.file_pattern.clone()),
            streaming_processor: StreamingProcessor::new(transformer),
            writer: OrdersWriter::new(output_path, config.sink.clone()),
            config,
            cancellation: CancellationToken::new(),
        })
    }

    /// Stop between files when this token is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Main processing entry point
    pub async fn process(&mut self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!("{}", "Starting order ingestion".bright_green().bold());
        println!("  {} {}", "Input:".bright_cyan(), self.input_path.display());
        if self.config.dry_run {
            println!("  {} {}", "Output:".bright_cyan(), "dry run, nothing written".yellow());
        } else {
            println!("  {} {}", "Output:".bright_cyan(), self.output_path.display());
        }

        // Step 1: Discover raw files
        let files = self.file_discovery.discover_csv_files()?;
        println!(
            "  {} {} order files in {} partitions",
            "Found".bright_green(),
            files.len().to_string().bright_white().bold(),
            self.file_discovery.partition_count().to_string().bright_white().bold()
        );

        // Step 2: Transform every file
        let outcomes = self.transform_files(&files).await?;

        let mut stats = ProcessingStats::default();
        let mut records = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(outcome) => {
                    stats.absorb(&outcome);
                    records.extend(outcome.records);
                }
                Err(e) => {
                    warn!("Skipping file after error: {}", e);
                    stats.files_failed += 1;
                }
            }
        }

        // Step 3: Write output
        if self.config.dry_run {
            info!("Dry run: {} records not written", records.len());
        } else {
            let written = self.write_records(records).await?;
            debug!("Sink accepted {} rows", written);
            stats.output_path = Some(self.output_path.clone());
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        info!(
            "Ingestion finished: {} files, {} records, {} skipped lines",
            stats.files_processed,
            stats.records_emitted,
            stats.skips.total()
        );

        Ok(stats)
    }

    /// Stream files through the transform with bounded concurrency.
    ///
    /// Outcomes come back in discovery order regardless of completion order.
    async fn transform_files(&self, files: &[PathBuf]) -> Result<Vec<Result<FileOutcome>>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Transforming files");

        let concurrency = self.config.max_concurrent_files.min(files.len()).max(1);
        debug!("Transforming {} files with concurrency {}", files.len(), concurrency);

        let mut indexed = stream::iter(files.iter().cloned().enumerate())
            .map(|(index, path)| {
                let processor = self.streaming_processor.clone();
                async move {
                    let task_path = path.clone();
                    let result = task::spawn_blocking(move || processor.process_file(&task_path))
                        .await
                        .map_err(|e| OrdersError::ProcessingFailed {
                            path,
                            reason: format!("Transform task failed: {}", e),
                        })
                        .and_then(|r| r);
                    (index, result)
                }
            })
            .buffer_unordered(concurrency);

        let mut results = Vec::with_capacity(files.len());
        while let Some(item) = indexed.next().await {
            if self.cancellation.is_cancelled() {
                pb.abandon_with_message("Cancelled");
                return Err(OrdersError::Interrupted {
                    reason: "Cancelled during file processing".to_string(),
                });
            }
            pb.inc(1);
            results.push(item);
        }
        pb.finish_with_message("All files transformed");

        results.sort_by_key(|(index, _)| *index);
        Ok(results.into_iter().map(|(_, result)| result).collect())
    }

    async fn write_records(&self, records: Vec<OrderRecord>) -> Result<usize> {
        let writer = self.writer.clone();
        task::spawn_blocking(move || writer.write(&records))
            .await
            .map_err(|e| OrdersError::ProcessingFailed {
                path: self.output_path.clone(),
                reason: format!("Writer task failed: {}", e),
            })?
    }
}

/// Output file placed beside the input
pub fn default_output_path(input_path: &Path, format: SinkFormat) -> PathBuf {
    let dir = if input_path.is_file() {
        input_path.parent().unwrap_or_else(|| Path::new("."))
    } else {
        input_path
    };
    let file_name = match format {
        SinkFormat::Parquet => DEFAULT_PARQUET_OUTPUT,
        SinkFormat::Ndjson => DEFAULT_NDJSON_OUTPUT,
    };
    dir.join(file_name)
}
