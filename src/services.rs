// src/services.rs
//! Host location/telephony services and how the pipeline attaches to them
//!
//! The host platform is abstracted as two traits. Attaching never fails: every
//! outcome becomes a status value for the display and a log entry.

use crate::{
    error::{DiagError, Result},
    eventlog::EventLog,
    pipeline::{IngestHandle, SignalHandle},
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gps,
    Network,
}

/// Source of raw NMEA sentences
pub trait LocationService: Send + Sync {
    fn is_provider_enabled(&self, provider: Provider) -> Result<bool>;

    /// Start delivering sentences into `ingest` until the pipeline stops
    fn register_nmea_listener(&self, ingest: IngestHandle) -> Result<()>;
}

/// Source of cellular signal events and subscriber identity
pub trait TelephonyService: Send + Sync {
    fn operator_name(&self) -> Result<Option<String>>;

    /// MCC followed by MNC, e.g. `46000`
    fn operator_code(&self) -> Result<Option<String>>;

    fn subscriber_id(&self) -> Result<Option<String>>;

    fn line_number(&self) -> Result<Option<String>>;

    fn register_signal_listener(&self, signal: SignalHandle) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum LocationStatus {
    #[default]
    Checking,
    GpsEnabled,
    NetworkEnabled,
    Disabled,
    NeedsPermission,
    Unavailable,
    /// The source stopped delivering sentences
    FeedEnded(String),
    Failed(String),
}

impl fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationStatus::Checking => f.write_str("checking..."),
            LocationStatus::GpsEnabled => f.write_str("GPS enabled"),
            LocationStatus::NetworkEnabled => f.write_str("network location enabled"),
            LocationStatus::Disabled => f.write_str("location services disabled"),
            LocationStatus::NeedsPermission => f.write_str("needs permission"),
            LocationStatus::Unavailable => f.write_str("location service unavailable"),
            LocationStatus::FeedEnded(reason) => write!(f, "NMEA feed ended: {}", reason),
            LocationStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum TelephonyStatus {
    #[default]
    Checking,
    Listening,
    NeedsPermission,
    Unavailable,
    Failed(String),
}

impl fmt::Display for TelephonyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelephonyStatus::Checking => f.write_str("checking..."),
            TelephonyStatus::Listening => f.write_str("listening"),
            TelephonyStatus::NeedsPermission => f.write_str("needs permission"),
            TelephonyStatus::Unavailable => f.write_str("telephony service unavailable"),
            TelephonyStatus::Failed(reason) => write!(f, "start failed: {}", reason),
        }
    }
}

/// Result of reading one identity field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum ProbeValue {
    #[default]
    Unknown,
    Known(String),
    PermissionDenied,
    ReadFailed,
}

impl ProbeValue {
    fn from_read(read: Result<Option<String>>) -> Self {
        match read {
            Ok(Some(value)) if !value.is_empty() => ProbeValue::Known(value),
            Ok(_) => ProbeValue::Unknown,
            Err(e) if e.is_permission_denied() => ProbeValue::PermissionDenied,
            Err(_) => ProbeValue::ReadFailed,
        }
    }
}

impl fmt::Display for ProbeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeValue::Unknown => f.write_str("unknown"),
            ProbeValue::Known(v) => f.write_str(v),
            ProbeValue::PermissionDenied => f.write_str("permission denied"),
            ProbeValue::ReadFailed => f.write_str("read failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SubscriberIdentity {
    pub operator_name: ProbeValue,
    pub mcc: ProbeValue,
    pub mnc: ProbeValue,
    pub subscriber_id: ProbeValue,
    pub line_number: ProbeValue,
}

impl SubscriberIdentity {
    pub fn read(service: &dyn TelephonyService, log: &EventLog) -> Self {
        let (mcc, mnc) = match service.operator_code() {
            Ok(Some(code)) => split_operator_code(&code),
            Ok(None) => (ProbeValue::Unknown, ProbeValue::Unknown),
            Err(e) => {
                log.warn(format!("MCC/MNC read failed: {}", e));
                let failed = ProbeValue::from_read(Err(e));
                (failed.clone(), failed)
            }
        };

        let identity = Self {
            operator_name: read_logged("operator name", service.operator_name(), log),
            mcc,
            mnc,
            subscriber_id: read_logged("subscriber id", service.subscriber_id(), log),
            line_number: read_logged("line number", service.line_number(), log),
        };

        log.info(format!(
            "Telephony identity read - operator: {}, MCC/MNC: {}/{}",
            identity.operator_name, identity.mcc, identity.mnc
        ));
        identity
    }
}

fn read_logged(field: &str, read: Result<Option<String>>, log: &EventLog) -> ProbeValue {
    if let Err(e) = &read {
        log.warn(format!("{} read failed: {}", field, e));
    }
    ProbeValue::from_read(read)
}

/// Split an operator code into MCC (3 digits) and MNC (the rest)
pub fn split_operator_code(code: &str) -> (ProbeValue, ProbeValue) {
    if code.len() < 5 || !code.is_char_boundary(3) {
        return (ProbeValue::Unknown, ProbeValue::Unknown);
    }
    let (mcc, mnc) = code.split_at(3);
    (ProbeValue::Known(mcc.to_string()), ProbeValue::Known(mnc.to_string()))
}

/// Attach a location service to the ingest queue.
///
/// Without permission or without a service, registration is skipped.
pub fn connect_location(
    service: Option<&dyn LocationService>,
    permission_granted: bool,
    ingest: IngestHandle,
    log: &EventLog,
) -> LocationStatus {
    let status = match (permission_granted, service) {
        (false, _) => {
            log.warn("Location permission not granted, NMEA listener not registered");
            LocationStatus::NeedsPermission
        }
        (true, None) => {
            log.warn("Location service unavailable");
            LocationStatus::Unavailable
        }
        (true, Some(service)) => return register_location(service, ingest, log),
    };
    ingest.set_location_status(status.clone());
    status
}

fn register_location(
    service: &dyn LocationService,
    ingest: IngestHandle,
    log: &EventLog,
) -> LocationStatus {
    let gps_enabled = provider_enabled(service, Provider::Gps, log);
    let network_enabled = provider_enabled(service, Provider::Network, log);
    log.info(format!(
        "Location providers - GPS: {}, network: {}",
        gps_enabled, network_enabled
    ));

    let status = match (gps_enabled, network_enabled) {
        (false, false) => {
            log.warn("Location services disabled");
            ingest.set_location_status(LocationStatus::Disabled);
            return LocationStatus::Disabled;
        }
        (true, _) => LocationStatus::GpsEnabled,
        (false, true) => LocationStatus::NetworkEnabled,
    };

    // Recorded before registering, so a feed that ends at once is not overwritten
    ingest.set_location_status(status.clone());
    match service.register_nmea_listener(ingest.clone()) {
        Ok(()) => {
            log.info("NMEA listener started");
            status
        }
        Err(e) => {
            log.error(format!("NMEA listener failed to start: {}", e));
            let failed = LocationStatus::Failed(e.to_string());
            ingest.set_location_status(failed.clone());
            failed
        }
    }
}

fn provider_enabled(service: &dyn LocationService, provider: Provider, log: &EventLog) -> bool {
    service.is_provider_enabled(provider).unwrap_or_else(|e| {
        log.warn(format!("Checking {:?} provider failed: {}", provider, e));
        false
    })
}

/// Attach a telephony service: read identity, then register for signal events.
pub fn connect_telephony(
    service: Option<&dyn TelephonyService>,
    permission_granted: bool,
    signal: SignalHandle,
    log: &EventLog,
) -> (TelephonyStatus, SubscriberIdentity) {
    let service = match (permission_granted, service) {
        (false, _) => {
            log.warn("Phone permission not granted, signal listener not registered");
            return (TelephonyStatus::NeedsPermission, SubscriberIdentity::default());
        }
        (true, None) => {
            log.warn("Telephony service unavailable");
            return (TelephonyStatus::Unavailable, SubscriberIdentity::default());
        }
        (true, Some(service)) => service,
    };

    let identity = SubscriberIdentity::read(service, log);

    let status = match service.register_signal_listener(signal) {
        Ok(()) => {
            log.info("Signal listener started");
            TelephonyStatus::Listening
        }
        Err(DiagError::PermissionDenied(reason)) => {
            log.error(format!("Signal listener failed to start: permission denied ({})", reason));
            TelephonyStatus::NeedsPermission
        }
        Err(e) => {
            log.error(format!("Signal listener failed to start: {}", e));
            TelephonyStatus::Failed(e.to_string())
        }
    };
    (status, identity)
}
