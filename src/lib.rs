// src/lib.rs
//! GNSS Diagnostics Library
//!
//! Decodes raw NMEA 0183 output (GGA, RMC, GSV, GSA) on a background parser
//! thread, merges it with cellular signal events, and publishes a consistent
//! snapshot for display on a fixed cadence.

pub mod config;
pub mod display;
pub mod error;
pub mod eventlog;
pub mod gps;
pub mod logging;
pub mod pipeline;
pub mod services;
pub mod signal;
pub mod snapshot;
pub mod source;
pub mod trim;

// Re-export main types for convenience
pub use config::{DiagConfig, SourceKind};
pub use error::{DiagError, Result};
pub use eventlog::EventLog;
pub use gps::{FieldValue, SatelliteRecord};
pub use pipeline::{IngestHandle, Pipeline, SignalHandle};
pub use services::{LocationService, LocationStatus, TelephonyService, TelephonyStatus};
pub use snapshot::{Snapshot, SnapshotHandle};
