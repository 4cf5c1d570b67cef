// src/eventlog.rs
//! Bounded, timestamped in-memory event log

use crate::{error::Result, trim::TrimPolicy};
use chrono::Local;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

/// Human-readable `[HH:mm:ss] <event>` lines shared between the pipeline,
/// host-service adapters and the display. Every entry is mirrored to
/// `tracing`.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
    policy: TrimPolicy,
}

impl EventLog {
    pub fn new(policy: TrimPolicy) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::with_capacity(policy.cap + 1))),
            policy,
        }
    }

    pub fn info(&self, event: impl AsRef<str>) {
        let event = event.as_ref();
        tracing::info!("{}", event);
        self.push(event);
    }

    pub fn warn(&self, event: impl AsRef<str>) {
        let event = event.as_ref();
        tracing::warn!("{}", event);
        self.push(event);
    }

    pub fn error(&self, event: impl AsRef<str>) {
        let event = event.as_ref();
        tracing::error!("{}", event);
        self.push(event);
    }

    fn push(&self, event: &str) {
        let line = format!("[{}] {}", Local::now().format("%H:%M:%S"), event);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push(line);
        self.policy.apply(&mut entries);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The newest `count` entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let start = entries.len().saturating_sub(count);
        entries[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the log to `dir/gps_log_YYYYMMDD_HHMMSS.txt`, one entry per line.
    /// The in-memory log is left untouched whether or not the write succeeds.
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let file_name = format!("gps_log_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(file_name);
        let entries = self.entries();

        std::fs::create_dir_all(dir)?;
        let mut writer = BufWriter::new(File::create(&path)?);
        for entry in &entries {
            writeln!(writer, "{}", entry)?;
        }
        writer.flush()?;

        tracing::info!("Saved {} log entries to {}", entries.len(), path.display());
        Ok(path)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(TrimPolicy::new(200, 150))
    }
}
