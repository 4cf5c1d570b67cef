// src/gps/data.rs
//! GNSS data structures shared by the parser, staging buffers and snapshot

use serde::Serialize;
use std::fmt;

/// A decoded display field.
///
/// `Unknown` means the sentence did not carry the field; `ParseError` means it
/// was present but malformed. The two render differently and must stay apart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    Unknown,
    ParseError,
    Value(String),
}

impl FieldValue {
    /// Blank wire fields become `Unknown`
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            FieldValue::Unknown
        } else {
            FieldValue::Value(field.to_string())
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldValue::Unknown)
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            FieldValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Overwrite `self` with `other` unless `other` is `Unknown`
    pub fn merge_from(&mut self, other: &FieldValue) {
        if other.is_known() {
            *self = other.clone();
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unknown => f.pad("unknown"),
            FieldValue::ParseError => f.pad("parse error"),
            FieldValue::Value(v) => f.pad(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Constellation {
    Gps,
    Glonass,
    Galileo,
    BeiDou,
    Unknown,
}

impl Constellation {
    /// Map a two-letter NMEA talker id to its constellation
    pub fn from_talker(talker: &str) -> Self {
        match talker {
            "GP" => Constellation::Gps,
            "GL" => Constellation::Glonass,
            "GA" => Constellation::Galileo,
            "GB" | "BD" => Constellation::BeiDou,
            _ => Constellation::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Constellation::Gps => "GPS",
            Constellation::Glonass => "GLONASS",
            Constellation::Galileo => "Galileo",
            Constellation::BeiDou => "BeiDou",
            Constellation::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Constellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalQuality {
    Strong,
    Fair,
    Weak,
    Unknown,
}

/// One satellite as last reported in a GSV sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SatelliteRecord {
    pub prn: String,
    pub elevation: FieldValue,
    pub azimuth: FieldValue,
    pub snr: FieldValue,
    pub constellation: Constellation,
}

impl SatelliteRecord {
    /// Two records describe the same satellite iff PRN and constellation match
    pub fn same_satellite(&self, other: &SatelliteRecord) -> bool {
        self.prn == other.prn && self.constellation == other.constellation
    }

    /// SNR in dB when it is a plain integer
    pub fn snr_db(&self) -> Option<i32> {
        self.snr.as_value().and_then(|v| v.parse().ok())
    }

    pub fn has_signal(&self) -> bool {
        self.snr_db().map_or(false, |snr| snr > 0)
    }

    pub fn signal_quality(&self) -> SignalQuality {
        match self.snr_db() {
            Some(snr) if snr >= 35 => SignalQuality::Strong,
            Some(snr) if snr >= 25 => SignalQuality::Fair,
            Some(snr) if snr > 0 => SignalQuality::Weak,
            _ => SignalQuality::Unknown,
        }
    }
}

/// Position fields decoded from GGA/RMC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationFields {
    pub latitude: FieldValue,
    pub longitude: FieldValue,
    pub altitude: FieldValue,
    pub speed: FieldValue,
}

impl LocationFields {
    /// Partial update: fields the update does not know are left alone
    pub fn merge(&mut self, update: &LocationFields) {
        self.latitude.merge_from(&update.latitude);
        self.longitude.merge_from(&update.longitude);
        self.altitude.merge_from(&update.altitude);
        self.speed.merge_from(&update.speed);
    }
}

/// Satellite totals and dilution of precision decoded from GGA/GSV/GSA.
/// A zero count means "not reported".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SatelliteCountFields {
    pub visible: u32,
    pub used: u32,
    pub hdop: FieldValue,
}

impl SatelliteCountFields {
    /// Partial update: zero counts and unknown HDOP never overwrite
    pub fn merge(&mut self, update: &SatelliteCountFields) {
        if update.visible > 0 {
            self.visible = update.visible;
        }
        if update.used > 0 {
            self.used = update.used;
        }
        self.hdop.merge_from(&update.hdop);
    }
}

/// One state delta produced by parsing a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceUpdate {
    Location(LocationFields),
    Counts(SatelliteCountFields),
    Satellites(Vec<SatelliteRecord>),
}
