//! File discovery module for raw order drops
//!
//! Handles locating raw order CSV files under an input path and counting
//! the distinct daily partitions they belong to.

use crate::error::{OrdersError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File discovery component for raw order files
#[derive(Debug)]
pub struct FileDiscovery {
    input_path: PathBuf,
    pattern: String,
    partition_count: usize,
}

impl FileDiscovery {
    /// Create a new file discovery instance
    pub fn new(input_path: PathBuf, pattern: impl Into<String>) -> Self {
        Self {
            input_path,
            pattern: pattern.into(),
            partition_count: 0,
        }
    }

    /// Number of distinct parent directories seen by the last discovery
    pub fn partition_count(&self) -> usize {
        self.partition_count
    }

    /// Discover raw order files
    ///
    /// A file path is used as-is. A directory is searched with the glob
    /// pattern relative to it; raw drops are laid out like:
    /// ```text
    /// input/
    ///   2025-04-01/
    ///     MOB_orders.csv
    ///     PART_orders.csv
    ///   2025-04-02/
    ///     MOB_orders.csv
    /// ```
    /// Results are sorted so runs are reproducible.
    pub fn discover_csv_files(&mut self) -> Result<Vec<PathBuf>> {
        if !self.input_path.exists() {
            return Err(OrdersError::InputNotFound {
                path: self.input_path.clone(),
            });
        }

        let mut files = if self.input_path.is_file() {
            vec![self.input_path.clone()]
        } else {
            self.glob_directory()?
        };
        files.sort();

        let partitions: HashSet<&Path> = files.iter().filter_map(|f| f.parent()).collect();
        self.partition_count = partitions.len();

        debug!(
            "Found {} order files in {} partitions under {}",
            files.len(),
            self.partition_count,
            self.input_path.display()
        );

        Ok(files)
    }

    fn glob_directory(&self) -> Result<Vec<PathBuf>> {
        let root = glob::Pattern::escape(&self.input_path.to_string_lossy());
        let full_pattern = format!("{}/{}", root, self.pattern);
        debug!("Searching for order files with pattern: {}", full_pattern);

        let entries = glob::glob(&full_pattern).map_err(|e| OrdersError::InvalidPattern {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| OrdersError::Io(e.into_error()))?;
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}
