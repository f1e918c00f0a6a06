//! Append-only collection of finished games and its text export.

use crate::pgn::GameRecord;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Destination for exported text. Implementations must append, never truncate.
pub trait ExportSink {
    fn append_text(&mut self, text: &str) -> std::io::Result<()>;
}

/// Appends to a file on disk, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExportSink for FileSink {
    fn append_text(&mut self, text: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())?;
        file.flush()
    }
}

impl ExportSink for String {
    fn append_text(&mut self, text: &str) -> std::io::Result<()> {
        self.push_str(text);
        Ok(())
    }
}

/// Every game of a run, in completion order.
#[derive(Debug, Clone, Default)]
pub struct TournamentLog {
    records: Vec<GameRecord>,
}

impl TournamentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: GameRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    /// Renders every record in append order, each followed by a blank line.
    pub fn to_text(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{}\n\n", record))
            .collect()
    }

    /// Appends the whole log to `sink` in a single write.
    pub fn export<S: ExportSink>(&self, sink: &mut S) -> std::io::Result<()> {
        sink.append_text(&self.to_text())
    }
}
