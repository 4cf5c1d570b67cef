// src/snapshot.rs
//! Display-facing state, replaced wholesale on every publish

use crate::{
    gps::{FieldValue, SatelliteRecord},
    services::{LocationStatus, SubscriberIdentity, TelephonyStatus},
    signal::{CellIdentity, SignalFields},
};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub latitude: FieldValue,
    pub longitude: FieldValue,
    pub altitude: FieldValue,
    pub speed: FieldValue,

    pub satellite_count: u32,
    pub used_satellites: u32,
    pub hdop: FieldValue,
    /// Bounded copy of the satellite registry, oldest sighting first
    pub satellites: Vec<SatelliteRecord>,

    pub signal: SignalFields,
    pub cell: CellIdentity,
    pub identity: SubscriberIdentity,

    pub location_status: LocationStatus,
    pub telephony_status: TelephonyStatus,
    /// Most recent GGA/RMC sentence echoed by the ingest path
    pub last_fix_sentence: Option<String>,

    pub published_at: Option<DateTime<Local>>,
    pub sequence: u64,
}

impl Snapshot {
    pub fn satellites_with_signal(&self) -> usize {
        self.satellites.iter().filter(|s| s.has_signal()).count()
    }

    /// Satellites ordered by SNR, strongest first; unknown SNR sorts last
    pub fn satellites_by_snr(&self) -> Vec<&SatelliteRecord> {
        let mut sorted: Vec<_> = self.satellites.iter().collect();
        sorted.sort_by_key(|s| std::cmp::Reverse(s.snr_db().unwrap_or(-999)));
        sorted
    }
}

/// Shared read access to the published snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotHandle {
    inner: Arc<RwLock<Snapshot>>,
}

impl SnapshotHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the current snapshot
    pub fn read(&self) -> Snapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `update` under a single write-lock scope
    pub(crate) fn replace_with<F>(&self, update: F) -> Snapshot
    where
        F: FnOnce(&mut Snapshot),
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut guard);
        guard.clone()
    }
}
