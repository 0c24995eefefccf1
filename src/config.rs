//! Configuration management and validation.
//!
//! Provides the transform options, sink settings and driver knobs used by
//! the ingestion pipeline. Everything has a default; a TOML file may
//! override any subset of fields.

use crate::constants::{
    DEFAULT_ALLOWED_STATUSES, DEFAULT_FILE_PATTERN, DEFAULT_ROW_GROUP_SIZE,
};
use crate::error::{OrdersError, Result};
use polars::prelude::{ParquetCompression, StatisticsOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Options applied by the line transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Also reject lines whose `order_date` is not a calendar date or whose
    /// `status` is outside `allowed_statuses`. Off by default.
    pub strict: bool,

    /// Accepted statuses in strict mode (exact, case-sensitive match)
    pub allowed_statuses: Vec<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            strict: false,
            allowed_statuses: DEFAULT_ALLOWED_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl TransformOptions {
    /// Strict options with the default status set
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Output format of the ingestion driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// Columnar file following the destination table schema
    Parquet,
    /// One JSON object per line
    Ndjson,
}

impl FromStr for SinkFormat {
    type Err = OrdersError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "parquet" => Ok(SinkFormat::Parquet),
            "ndjson" | "jsonl" | "json" => Ok(SinkFormat::Ndjson),
            other => Err(OrdersError::Configuration {
                message: format!("Unknown output format '{}' (expected parquet or ndjson)", other),
            }),
        }
    }
}

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = OrdersError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(OrdersError::Configuration {
                message: format!(
                    "Unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }
}

/// Sink settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub format: SinkFormat,

    pub compression_algorithm: CompressionAlgorithm,

    /// Rows per Parquet row group
    pub row_group_size: usize,

    /// Enable column statistics for query pruning
    pub enable_statistics: bool,

    /// Sort by order_date then order_id before writing
    pub sort_by_date: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            format: SinkFormat::Parquet,
            compression_algorithm: CompressionAlgorithm::Snappy,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            enable_statistics: true,
            sort_by_date: true,
        }
    }
}

impl SinkConfig {
    pub fn statistics_options(&self) -> StatisticsOptions {
        if self.enable_statistics {
            StatisticsOptions::full()
        } else {
            StatisticsOptions::empty()
        }
    }
}

/// Top-level configuration for the ingestion driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    pub transform: TransformOptions,

    pub sink: SinkConfig,

    /// Glob pattern, relative to an input directory, selecting raw files
    pub file_pattern: String,

    /// Maximum concurrent file processing
    pub max_concurrent_files: usize,

    /// Transform everything but write nothing
    pub dry_run: bool,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            transform: TransformOptions::default(),
            sink: SinkConfig::default(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            max_concurrent_files: num_cpus::get().max(1),
            dry_run: false,
        }
    }
}

impl OrdersConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| OrdersError::Configuration {
            message: format!("Cannot read config file {}: {}", path.display(), e),
        })?;

        let config: OrdersConfig =
            toml::from_str(&raw).map_err(|e| OrdersError::Configuration {
                message: format!("Invalid config file {}: {}", path.display(), e),
            })?;

        debug!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(OrdersError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        if self.sink.row_group_size == 0 {
            return Err(OrdersError::Configuration {
                message: "row_group_size must be at least 1".to_string(),
            });
        }
        if self.file_pattern.trim().is_empty() {
            return Err(OrdersError::Configuration {
                message: "file_pattern must not be empty".to_string(),
            });
        }
        if self.transform.strict && self.transform.allowed_statuses.is_empty() {
            return Err(OrdersError::Configuration {
                message: "strict mode needs at least one allowed status".to_string(),
            });
        }
        Ok(())
    }

    /// Enable strict date and status validation
    pub fn with_strict_validation(mut self) -> Self {
        self.transform.strict = true;
        self
    }

    /// Replace the accepted status set
    pub fn with_allowed_statuses(mut self, statuses: Vec<String>) -> Self {
        self.transform.allowed_statuses = statuses;
        self
    }

    /// Set output format
    pub fn with_format(mut self, format: SinkFormat) -> Self {
        self.sink.format = format;
        self
    }

    /// Set parquet compression
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.sink.compression_algorithm = compression;
        self
    }

    /// Set the file selection pattern
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Enable dry-run mode
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = OrdersConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.transform.strict);
        assert_eq!(config.transform.allowed_statuses, vec!["PAID", "CANCELLED"]);
        assert_eq!(config.sink.format, SinkFormat::Parquet);
        assert!(config.max_concurrent_files >= 1);
    }

    #[test]
    fn test_builder_methods() {
        let config = OrdersConfig::default()
            .with_strict_validation()
            .with_format(SinkFormat::Ndjson)
            .with_compression(CompressionAlgorithm::Zstd)
            .with_max_concurrent_files(2)
            .with_file_pattern("*/WEB_*.csv")
            .with_dry_run();

        assert!(config.transform.strict);
        assert_eq!(config.sink.format, SinkFormat::Ndjson);
        assert_eq!(config.sink.compression_algorithm, CompressionAlgorithm::Zstd);
        assert_eq!(config.max_concurrent_files, 2);
        assert_eq!(config.file_pattern, "*/WEB_*.csv");
        assert!(config.dry_run);
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = OrdersConfig::default().with_max_concurrent_files(0);
        assert!(matches!(
            config.validate(),
            Err(OrdersError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_strict_without_statuses() {
        let config = OrdersConfig::default()
            .with_strict_validation()
            .with_allowed_statuses(Vec::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compression_parsing() {
        assert_eq!(
            "SNAPPY".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Snappy
        );
        assert_eq!(
            "none".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Uncompressed
        );
        assert!("brotli".parse::<CompressionAlgorithm>().is_err());
        assert!(matches!(
            CompressionAlgorithm::Zstd.to_polars_compression(),
            ParquetCompression::Zstd(None)
        ));
    }

    #[test]
    fn test_sink_format_parsing() {
        assert_eq!("parquet".parse::<SinkFormat>().unwrap(), SinkFormat::Parquet);
        assert_eq!("jsonl".parse::<SinkFormat>().unwrap(), SinkFormat::Ndjson);
        assert!("avro".parse::<SinkFormat>().is_err());
    }

    #[test]
    fn test_partial_toml_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("orders.toml");
        std::fs::write(
            &path,
            r#"
max_concurrent_files = 3

[transform]
strict = true

[sink]
format = "ndjson"
compression_algorithm = "zstd"
"#,
        )
        .unwrap();

        let config = OrdersConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.max_concurrent_files, 3);
        assert!(config.transform.strict);
        assert_eq!(config.transform.allowed_statuses, vec!["PAID", "CANCELLED"]);
        assert_eq!(config.sink.format, SinkFormat::Ndjson);
        assert_eq!(config.sink.compression_algorithm, CompressionAlgorithm::Zstd);
        assert_eq!(config.sink.row_group_size, DEFAULT_ROW_GROUP_SIZE);
        assert_eq!(config.file_pattern, DEFAULT_FILE_PATTERN);
    }

    #[test]
    fn test_invalid_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "max_concurrent_files = \"many\"").unwrap();

        let result = OrdersConfig::from_toml_file(&path);
        assert!(matches!(result, Err(OrdersError::Configuration { .. })));
    }
}
