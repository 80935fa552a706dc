//! Result sink: append-only persistence of output records.
//!
//! Two serialization modes are supported. JSON-lines streams one record per
//! line and flushes after every write, so a crash loses at most the
//! in-flight record. Whole-array JSON buffers until the run completes and
//! then writes the array atomically in input order.

use shared::{OutputRecord, ScrapeError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output serialization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Whole-array JSON, buffered until completion
    Json,
    /// JSON-lines, one record per line, truly streaming
    JsonLines,
}

impl OutputFormat {
    /// Infer the format from a file extension (".json" means whole-array)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::JsonLines,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::JsonLines),
            _ => Err(ScrapeError::Config(format!(
                "unknown output format '{}', expected 'json' or 'jsonl'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
        }
    }
}

/// Append-only sink writing one OutputRecord per call
pub struct ResultSink {
    path: PathBuf,
    format: OutputFormat,
    /// Open writer in JSON-lines mode
    writer: Option<BufWriter<File>>,
    /// Buffered records in whole-array mode
    buffered: Vec<OutputRecord>,
    written: usize,
}

impl ResultSink {
    /// Create a sink at the given path, creating parent directories
    ///
    /// JSON-lines mode opens (and truncates) the file immediately;
    /// whole-array mode defers all file I/O to [`ResultSink::finish`].
    pub fn create(path: impl Into<PathBuf>, format: OutputFormat) -> Result<Self, ScrapeError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let writer = match format {
            OutputFormat::JsonLines => Some(BufWriter::new(File::create(&path)?)),
            OutputFormat::Json => None,
        };

        debug!(path = %path.display(), format = %format, "Result sink opened");

        Ok(Self {
            path,
            format,
            writer,
            buffered: Vec::new(),
            written: 0,
        })
    }

    /// Write one record, flushing immediately in JSON-lines mode
    pub fn write(&mut self, record: &OutputRecord) -> Result<(), ScrapeError> {
        match self.format {
            OutputFormat::JsonLines => {
                let line = serde_json::to_string(record).map_err(std::io::Error::from)?;
                // writer is always Some in JsonLines mode
                if let Some(writer) = self.writer.as_mut() {
                    writeln!(writer, "{}", line)?;
                    writer.flush()?;
                }
            }
            OutputFormat::Json => {
                self.buffered.push(record.clone());
            }
        }

        self.written += 1;
        Ok(())
    }

    /// Number of records written so far
    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Finalize the sink and return the number of records persisted
    ///
    /// In whole-array mode this sorts the buffered records into input order
    /// and writes the array atomically through a temp-file rename.
    pub fn finish(mut self, input_order: &[u32]) -> Result<usize, ScrapeError> {
        match self.format {
            OutputFormat::JsonLines => {
                if let Some(writer) = self.writer.as_mut() {
                    writer.flush()?;
                }
            }
            OutputFormat::Json => {
                let positions: HashMap<u32, usize> = input_order
                    .iter()
                    .enumerate()
                    .map(|(idx, &id)| (id, idx))
                    .collect();

                self.buffered.sort_by_key(|record| {
                    positions.get(&record.mal_id()).copied().unwrap_or(usize::MAX)
                });

                let content =
                    serde_json::to_string_pretty(&self.buffered).map_err(std::io::Error::from)?;

                let tmp_path = self.path.with_extension("json.tmp");
                std::fs::write(&tmp_path, content)?;
                std::fs::rename(&tmp_path, &self.path)?;
            }
        }

        info!(
            path = %self.path.display(),
            records = self.written,
            "Result sink finalized"
        );

        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::FetchErrorKind;
    use tempfile::TempDir;

    fn failure_record(mal_id: u32) -> OutputRecord {
        OutputRecord::failure(
            mal_id,
            1,
            FetchErrorKind::NotFound,
            "status 404".to_string(),
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "jsonl".parse::<OutputFormat>().unwrap(),
            OutputFormat::JsonLines
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/data.json")),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out/data.jsonl")),
            OutputFormat::JsonLines
        );
    }

    #[test]
    fn test_jsonl_each_line_valid_json() -> shared::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("out.jsonl");

        let mut sink = ResultSink::create(&path, OutputFormat::JsonLines)?;
        sink.write(&failure_record(1))?;
        sink.write(&failure_record(2))?;
        let written = sink.finish(&[1, 2])?;
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line)?;
            assert_eq!(value["status"], "failure");
        }

        Ok(())
    }

    #[test]
    fn test_jsonl_flushes_after_each_write() -> shared::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("out.jsonl");

        let mut sink = ResultSink::create(&path, OutputFormat::JsonLines)?;
        sink.write(&failure_record(1))?;

        // Visible on disk before finish
        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content.lines().count(), 1);

        sink.finish(&[1])?;
        Ok(())
    }

    #[test]
    fn test_jsonl_truncation_stays_parseable() -> shared::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("out.jsonl");

        let mut sink = ResultSink::create(&path, OutputFormat::JsonLines)?;
        for id in 1..=3 {
            sink.write(&failure_record(id))?;
        }
        sink.finish(&[1, 2, 3])?;

        // Truncate after the second complete line
        let content = std::fs::read_to_string(&path)?;
        let keep: String = content.lines().take(2).map(|l| format!("{}\n", l)).collect();
        std::fs::write(&path, &keep)?;

        let reread = std::fs::read_to_string(&path)?;
        let records: Vec<OutputRecord> = reread
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(records.len(), 2);

        Ok(())
    }

    #[test]
    fn test_json_array_written_in_input_order() -> shared::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("out.json");

        let mut sink = ResultSink::create(&path, OutputFormat::Json)?;
        // Completion order differs from input order
        sink.write(&failure_record(58259))?;
        sink.write(&failure_record(52034))?;

        // Nothing on disk until finish
        assert!(!path.exists());

        sink.finish(&[52034, 58259])?;

        let content = std::fs::read_to_string(&path)?;
        let records: Vec<OutputRecord> = serde_json::from_str(&content)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].mal_id(), 52034);
        assert_eq!(records[1].mal_id(), 58259);

        Ok(())
    }

    #[test]
    fn test_creates_parent_directories() -> shared::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested/dir/out.jsonl");

        let mut sink = ResultSink::create(&path, OutputFormat::JsonLines)?;
        sink.write(&failure_record(1))?;
        sink.finish(&[1])?;

        assert!(path.exists());
        Ok(())
    }
}
