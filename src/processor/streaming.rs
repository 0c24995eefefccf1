//! Line streaming for raw order files
//!
//! Reads one file line by line and pushes every line through the
//! [`LineTransformer`]. Skipped lines are counted per reason and logged at
//! debug level; they never fail the file.

use crate::error::{OrdersError, Result};
use crate::models::FileOutcome;
use crate::transform::LineTransformer;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Streaming processor for raw order files
#[derive(Debug, Clone)]
pub struct StreamingProcessor {
    transformer: LineTransformer,
}

impl StreamingProcessor {
    pub fn new(transformer: LineTransformer) -> Self {
        Self { transformer }
    }

    /// Transform every line of a file.
    ///
    /// Fails only on I/O problems or a line that is not valid UTF-8.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let file = File::open(path)?;
        self.process_reader(path, BufReader::new(file))
    }

    /// Transform every line of an already opened reader
    pub fn process_reader<R: BufRead>(&self, path: &Path, reader: R) -> Result<FileOutcome> {
        let mut outcome = FileOutcome {
            path: path.to_path_buf(),
            ..Default::default()
        };

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line.map_err(|e| OrdersError::ProcessingFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to read line {}: {}", line_number, e),
            })?;
            outcome.lines_read += 1;

            match self.transformer.transform_with_reason(&line) {
                Ok(record) => outcome.records.push(record),
                Err(reason) => {
                    debug!(
                        file = %path.display(),
                        line = line_number,
                        %reason,
                        "Skipped line"
                    );
                    outcome.skips.record(&reason);
                }
            }
        }

        debug!(
            "Processed {}: {} lines, {} records, {} skipped",
            path.display(),
            outcome.lines_read,
            outcome.records.len(),
            outcome.skips.total()
        );

        Ok(outcome)
    }
}
