// src/gps/nmea.rs
//! NMEA sentence parsing
//!
//! Parsing is pure: a line goes in, zero or more [`SentenceUpdate`]s come out.
//! Unrecognised or truncated sentences yield nothing. Checksums are not
//! validated.

use super::{
    coord::coordinate_field,
    data::{
        Constellation, FieldValue, LocationFields, SatelliteCountFields, SatelliteRecord,
        SentenceUpdate,
    },
};

const KNOTS_TO_KMH: f64 = 1.852;
const MAX_SATELLITES_PER_GSV: usize = 4;

const GGA_MIN_FIELDS: usize = 15;
const RMC_MIN_FIELDS: usize = 12;
const GSV_MIN_FIELDS: usize = 4;
const GSA_MIN_FIELDS: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceKind {
    Gga,
    Rmc,
    Gsv(Constellation),
    Gsa,
}

/// Classify a line by its leading `$` + talker + type tag
pub fn classify(line: &str) -> Option<SentenceKind> {
    let tag = line.get(..6)?;
    let kind = match tag {
        "$GPGGA" | "$GNGGA" => SentenceKind::Gga,
        "$GPRMC" | "$GNRMC" => SentenceKind::Rmc,
        "$GPGSV" | "$GLGSV" | "$GAGSV" | "$GBGSV" | "$BDGSV" => {
            SentenceKind::Gsv(Constellation::from_talker(&tag[1..3]))
        }
        "$GPGSA" | "$GNGSA" | "$GLGSA" | "$GAGSA" | "$BDGSA" => SentenceKind::Gsa,
        _ => return None,
    };
    Some(kind)
}

/// Whether the line carries a position fix (GGA or RMC)
pub fn is_fix_sentence(line: &str) -> bool {
    matches!(classify(line), Some(SentenceKind::Gga | SentenceKind::Rmc))
}

/// Parse a single NMEA sentence into state deltas
pub fn parse_sentence(line: &str) -> Vec<SentenceUpdate> {
    let Some(kind) = classify(line) else {
        return Vec::new();
    };
    let parts: Vec<&str> = line.split(',').collect();

    match kind {
        SentenceKind::Gga => parse_gga(&parts),
        SentenceKind::Rmc => parse_rmc(&parts),
        SentenceKind::Gsv(constellation) => parse_gsv(&parts, constellation),
        SentenceKind::Gsa => parse_gsa(&parts),
    }
}

/// Parse GGA (Global Positioning System Fix Data) sentence
fn parse_gga(parts: &[&str]) -> Vec<SentenceUpdate> {
    if parts.len() < GGA_MIN_FIELDS {
        return Vec::new();
    }

    // Altitude (field 9) with its unit (field 10)
    let altitude = if parts[9].is_empty() {
        FieldValue::Unknown
    } else {
        FieldValue::Value(format!("{} {}", parts[9], parts[10]))
    };

    let location = LocationFields {
        latitude: coordinate_field(parts[2], parts[3]),
        longitude: coordinate_field(parts[4], parts[5]),
        altitude,
        speed: FieldValue::Unknown,
    };

    let counts = SatelliteCountFields {
        visible: 0,
        used: parse_count(parts[7]),
        hdop: FieldValue::from_field(parts[8]),
    };

    vec![SentenceUpdate::Location(location), SentenceUpdate::Counts(counts)]
}

/// Parse RMC (Recommended Minimum Course) sentence
fn parse_rmc(parts: &[&str]) -> Vec<SentenceUpdate> {
    if parts.len() < RMC_MIN_FIELDS {
        return Vec::new();
    }

    // Speed over ground in knots (field 7); garbage is read as 0
    let speed = if parts[7].is_empty() {
        FieldValue::Unknown
    } else {
        let knots = parts[7].trim().parse::<f64>().unwrap_or(0.0);
        FieldValue::Value(format!("{:.2} km/h", knots * KNOTS_TO_KMH))
    };

    let location = LocationFields {
        latitude: coordinate_field(parts[3], parts[4]),
        longitude: coordinate_field(parts[5], parts[6]),
        altitude: FieldValue::Unknown,
        speed,
    };

    vec![SentenceUpdate::Location(location)]
}

/// Parse GSV (Satellites in View) sentence
fn parse_gsv(parts: &[&str], constellation: Constellation) -> Vec<SentenceUpdate> {
    if parts.len() < GSV_MIN_FIELDS {
        return Vec::new();
    }

    let message_num = parse_count(parts[2]);
    let total_visible = parse_count(parts[3]);

    // Satellite blocks: PRN, elevation, azimuth, SNR
    let mut satellites = Vec::with_capacity(MAX_SATELLITES_PER_GSV);
    let mut sat_index = 4;
    while sat_index + 3 < parts.len() && satellites.len() < MAX_SATELLITES_PER_GSV {
        let prn = parts[sat_index];
        if !prn.is_empty() {
            // The last SNR carries the checksum
            let snr = parts[sat_index + 3].split('*').next().unwrap_or_default();
            satellites.push(SatelliteRecord {
                prn: prn.to_string(),
                elevation: FieldValue::from_field(parts[sat_index + 1]),
                azimuth: FieldValue::from_field(parts[sat_index + 2]),
                snr: FieldValue::from_field(snr),
                constellation,
            });
        }
        sat_index += 4;
    }

    let mut updates = Vec::with_capacity(2);
    // Only the first message of a group reports the total, so it is not counted twice
    if message_num == 1 {
        updates.push(SentenceUpdate::Counts(SatelliteCountFields {
            visible: total_visible,
            used: 0,
            hdop: FieldValue::Unknown,
        }));
    }
    if !satellites.is_empty() {
        updates.push(SentenceUpdate::Satellites(satellites));
    }
    updates
}

/// Parse GSA (DOP and Active Satellites) sentence
fn parse_gsa(parts: &[&str]) -> Vec<SentenceUpdate> {
    if parts.len() < GSA_MIN_FIELDS {
        return Vec::new();
    }

    // Fields 3..=14 are the PRN slots of satellites used in the fix
    let used = parts[3..15].iter().filter(|slot| !slot.is_empty()).count() as u32;

    vec![SentenceUpdate::Counts(SatelliteCountFields {
        visible: 0,
        used,
        hdop: FieldValue::from_field(parts[16]),
    })]
}

fn parse_count(field: &str) -> u32 {
    field.trim().parse().unwrap_or(0)
}
