//! JSON and JSON Lines output for reports and dry-run plans.

use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Serializes reports to any writer.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer. `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write one value followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        let pretty = self.pretty && self.format == OutputFormat::Json;
        self.emit(item, pretty)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a sequence: a JSON array, or one line per item for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                self.emit(items, self.pretty)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    fn emit<T: Serialize + ?Sized>(&mut self, value: &T, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut self.writer, value).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, value).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
