// src/display/mod.rs
//! Display-side consumers of the published snapshot

pub mod json;
pub mod terminal;

use crate::snapshot::Snapshot;

/// Notified by the publisher after every publish, outside the snapshot lock
pub trait SnapshotObserver: Send + Sync {
    fn on_publish(&self, snapshot: &Snapshot);
}

pub use json::JsonLinesObserver;
pub use terminal::TerminalDisplay;
