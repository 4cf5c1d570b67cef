// src/gps/mod.rs
//! NMEA decoding and satellite bookkeeping

pub mod coord;
pub mod data;
pub mod nmea;
pub mod registry;

pub use data::{
    Constellation, FieldValue, LocationFields, SatelliteCountFields, SatelliteRecord,
    SentenceUpdate, SignalQuality,
};
pub use registry::SatelliteRegistry;
