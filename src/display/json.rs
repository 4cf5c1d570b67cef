// src/display/json.rs
//! One JSON object per published snapshot

use super::SnapshotObserver;
use crate::snapshot::Snapshot;
use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

pub struct JsonLinesObserver<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonLinesObserver<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> crate::Result<()> {
        let line = serde_json::to_string(snapshot)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> SnapshotObserver for JsonLinesObserver<W> {
    fn on_publish(&self, snapshot: &Snapshot) {
        if let Err(e) = self.write_snapshot(snapshot) {
            tracing::warn!("Failed to write snapshot: {}", e);
        }
    }
}
