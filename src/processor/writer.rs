//! Output writing module for transformed orders
//!
//! Writes records either as a Parquet file laid out like the destination
//! table, or as newline-delimited JSON objects.

use crate::config::{SinkConfig, SinkFormat};
use crate::error::{OrdersError, Result};
use crate::models::OrderRecord;
use crate::schema::records_to_dataframe;

use polars::prelude::{IntoLazy, ParquetWriter as PolarsParquetWriter, SortMultipleOptions, col};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Record sink for the ingestion driver
#[derive(Debug, Clone)]
pub struct OrdersWriter {
    output_path: PathBuf,
    config: SinkConfig,
}

impl OrdersWriter {
    /// Create a new writer
    pub fn new(output_path: PathBuf, config: SinkConfig) -> Self {
        Self {
            output_path,
            config,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write all records, returning the number of rows written
    pub fn write(&self, records: &[OrderRecord]) -> Result<usize> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        match self.config.format {
            SinkFormat::Parquet => self.write_parquet(records),
            SinkFormat::Ndjson => self.write_ndjson(records),
        }
    }

    fn write_parquet(&self, records: &[OrderRecord]) -> Result<usize> {
        let df = records_to_dataframe(records)?;

        let mut df = if self.config.sort_by_date {
            debug!("Sorting {} rows by order_date, order_id", df.height());
            df.lazy()
                .sort_by_exprs(
                    [col("order_date"), col("order_id")],
                    SortMultipleOptions::default(),
                )
                .collect()?
        } else {
            df
        };

        let file = File::create(&self.output_path)?;
        PolarsParquetWriter::new(file)
            .with_compression(self.config.compression_algorithm.to_polars_compression())
            .with_statistics(self.config.statistics_options())
            .with_row_group_size(Some(self.config.row_group_size))
            .finish(&mut df)
            .map_err(|e| OrdersError::ProcessingFailed {
                path: self.output_path.clone(),
                reason: format!("Failed to write parquet: {}", e),
            })?;

        debug!(
            "Wrote {} rows to {} ({:?})",
            df.height(),
            self.output_path.display(),
            self.config.compression_algorithm
        );
        Ok(df.height())
    }

    fn write_ndjson(&self, records: &[OrderRecord]) -> Result<usize> {
        let file = File::create(&self.output_path)?;
        let mut writer = BufWriter::new(file);

        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        debug!(
            "Wrote {} JSON records to {}",
            records.len(),
            self.output_path.display()
        );
        Ok(records.len())
    }
}
